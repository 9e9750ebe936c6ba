//! Volume Calculator
//!
//! Weekly hours = target hours x fitness multiplier x phase multiplier.
//! The phase multiplier ramps linearly with progress through the phase.

use serde::{Deserialize, Serialize};

use super::constants::{discipline_ratio, fitness_multiplier};
use super::phases::PhaseBreakdown;
use crate::models::{Discipline, FitnessLevel, Phase};

/// Fraction of the way through a phase, clamped to [0, 1]
fn phase_progress(week_number: u32, phase: Phase, breakdown: &PhaseBreakdown) -> f64 {
    let week_in_phase = week_number as i64 - breakdown.weeks_before(phase) as i64;
    let phase_weeks = breakdown.weeks_in(phase).max(1) as f64;
    ((week_in_phase - 1) as f64 / phase_weeks).clamp(0.0, 1.0)
}

/// Multiplier applied on top of the fitness multiplier for a given week
pub fn phase_multiplier(week_number: u32, phase: Phase, breakdown: &PhaseBreakdown) -> f64 {
    let progress = phase_progress(week_number, phase, breakdown);

    match phase {
        // 60% -> 80%
        Phase::Base => 0.6 + progress * 0.2,
        // 80% -> 100%
        Phase::Build => 0.8 + progress * 0.2,
        // Plateau with at most a 10% overload
        Phase::Peak => 1.0 + progress.min(0.1),
        // 100% -> 40%
        Phase::Taper => 1.0 - progress * 0.6,
    }
}

/// Total training hours for a week. Not clamped.
pub fn calculate_weekly_volume(
    week_number: u32,
    phase: Phase,
    target_hours: f64,
    fitness_level: FitnessLevel,
    breakdown: &PhaseBreakdown,
) -> f64 {
    target_hours * fitness_multiplier(fitness_level) * phase_multiplier(week_number, phase, breakdown)
}

// ---------------------------------------------------------------------------
/// Discipline Split
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisciplineHours {
    pub swim: f64,
    pub bike: f64,
    pub run: f64,
}

impl DisciplineHours {
    pub fn get(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Swim => self.swim,
            Discipline::Bike => self.bike,
            Discipline::Run => self.run,
        }
    }

    pub fn total(&self) -> f64 {
        self.swim + self.bike + self.run
    }
}

pub fn discipline_hours(weekly_hours: f64) -> DisciplineHours {
    DisciplineHours {
        swim: weekly_hours * discipline_ratio(Discipline::Swim),
        bike: weekly_hours * discipline_ratio(Discipline::Bike),
        run: weekly_hours * discipline_ratio(Discipline::Run),
    }
}
