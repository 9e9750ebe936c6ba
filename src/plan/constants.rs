//! Fixed tables driving plan generation.
//!
//! Kept as data rather than branches so each table can be checked on its own.

use chrono::Weekday;

use crate::models::{Discipline, FitnessLevel, Phase, WorkoutType};

/// A race needs at least this many weeks of lead time.
pub const MINIMUM_TRAINING_WEEKS: i64 = 12;

/// Share of total weekly volume per discipline.
pub const DISCIPLINE_RATIOS: [(Discipline, f64); 3] = [
    (Discipline::Swim, 0.18),
    (Discipline::Bike, 0.52),
    (Discipline::Run, 0.30),
];

/// Starting fraction of target volume per fitness level.
pub const FITNESS_MULTIPLIERS: [(FitnessLevel, f64); 3] = [
    (FitnessLevel::Beginner, 0.6),
    (FitnessLevel::Intermediate, 0.7),
    (FitnessLevel::Advanced, 0.8),
];

/// Share of total plan weeks per phase, in plan order.
pub const PHASE_DISTRIBUTION: [(Phase, f64); 4] = [
    (Phase::Base, 0.40),
    (Phase::Build, 0.35),
    (Phase::Peak, 0.20),
    (Phase::Taper, 0.05),
];

// ---------------------------------------------------------------------------
/// Weekly Template: One slot per scheduled workout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutTemplate {
    pub discipline: Discipline,
    pub workout_type: WorkoutType,
    pub day: Weekday,
    /// Fraction of the discipline's weekly hours given to this slot
    pub volume_fraction: f64,
}

impl WorkoutTemplate {
    const fn new(
        discipline: Discipline,
        workout_type: WorkoutType,
        day: Weekday,
        volume_fraction: f64,
    ) -> Self {
        Self {
            discipline,
            workout_type,
            day,
            volume_fraction,
        }
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.day, Weekday::Sat | Weekday::Sun)
    }
}

/// Eight slots per week: swim 2, bike 3, run 3.
pub const WEEKLY_TEMPLATE: [WorkoutTemplate; 8] = [
    WorkoutTemplate::new(Discipline::Swim, WorkoutType::Easy, Weekday::Tue, 0.40),
    WorkoutTemplate::new(Discipline::Swim, WorkoutType::Intervals, Weekday::Thu, 0.60),
    WorkoutTemplate::new(Discipline::Bike, WorkoutType::Easy, Weekday::Mon, 0.25),
    WorkoutTemplate::new(Discipline::Bike, WorkoutType::Tempo, Weekday::Wed, 0.30),
    WorkoutTemplate::new(Discipline::Bike, WorkoutType::Long, Weekday::Sat, 0.45),
    WorkoutTemplate::new(Discipline::Run, WorkoutType::Easy, Weekday::Tue, 0.35),
    WorkoutTemplate::new(Discipline::Run, WorkoutType::Intervals, Weekday::Thu, 0.30),
    WorkoutTemplate::new(Discipline::Run, WorkoutType::Long, Weekday::Sun, 0.35),
];

pub fn discipline_ratio(discipline: Discipline) -> f64 {
    DISCIPLINE_RATIOS
        .iter()
        .find(|(d, _)| *d == discipline)
        .map(|(_, ratio)| *ratio)
        .unwrap_or(0.0)
}

pub fn fitness_multiplier(level: FitnessLevel) -> f64 {
    FITNESS_MULTIPLIERS
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, m)| *m)
        .unwrap_or(0.6)
}

pub fn phase_share(phase: Phase) -> f64 {
    PHASE_DISTRIBUTION
        .iter()
        .find(|(p, _)| *p == phase)
        .map(|(_, share)| *share)
        .unwrap_or(0.0)
}

/// Template slots for one discipline, in template order
pub fn templates_for(discipline: Discipline) -> impl Iterator<Item = &'static WorkoutTemplate> {
    WEEKLY_TEMPLATE
        .iter()
        .filter(move |t| t.discipline == discipline)
}

/// Athlete-facing description for a discipline/type pair
pub fn workout_description(discipline: Discipline, workout_type: WorkoutType) -> &'static str {
    use Discipline::*;
    use WorkoutType::*;

    match (discipline, workout_type) {
        (Swim, Easy) => "Easy swim - Focus on technique and efficiency. Keep effort conversational.",
        (Swim, Tempo) => "Tempo swim - Sustained moderate effort. Build endurance at race pace.",
        (Swim, Intervals) => "Swim intervals - Build speed and power. Alternate hard efforts with recovery.",
        (Swim, Long) => "Long swim - Build aerobic endurance. Steady, sustainable pace.",
        (Bike, Easy) => "Easy spin - Recovery pace. Keep cadence high, resistance low.",
        (Bike, Tempo) => "Tempo ride - Sustained moderate effort. Build strength and endurance.",
        (Bike, Intervals) => "Bike intervals - Build power and speed. Alternate hard efforts with recovery.",
        (Bike, Long) => "Long ride - Build aerobic endurance. Steady pace you can sustain for hours.",
        (Run, Easy) => "Easy run - Conversational pace. Focus on form and aerobic development.",
        (Run, Tempo) => "Tempo run - Comfortably hard pace. Build lactate threshold.",
        (Run, Intervals) => "Run intervals - Build speed and VO2max. Alternate hard efforts with recovery.",
        (Run, Long) => "Long run - Build endurance. Steady pace, practice race nutrition.",
    }
}
