//! Training plan generation
//!
//! Pure pipeline from race date and athlete profile to dated workouts:
//! - phases: how many weeks, and which phase each week belongs to
//! - volume: weekly hours from phase ramp curves and fitness level
//! - workouts: split weekly hours across the fixed weekly template
//!
//! Nothing here reads the clock. Callers pass the as-of date explicitly.

pub mod constants;
pub mod phases;
pub mod volume;
pub mod workouts;

use serde::Serialize;

pub use phases::{
    calculate_phases, current_week_number, phase_for_week, training_start_date, week_number_on,
    week_start_date, PhaseBreakdown,
};
pub use volume::{calculate_weekly_volume, discipline_hours, DisciplineHours};
pub use workouts::generate_week_workouts;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("Need at least {minimum} weeks to train for an Ironman. You have {weeks} weeks.")]
    InsufficientLeadTime { weeks: i64, minimum: i64 },
}

impl Serialize for PlanError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
