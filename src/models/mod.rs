pub mod profile;
pub mod workout;

pub use profile::{FitnessLevel, TrainingProfile};
pub use workout::{Discipline, NewWorkout, Phase, Workout, WorkoutStatus, WorkoutType};
