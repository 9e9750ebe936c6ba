//! Phase Calculator
//!
//! Splits the weeks between an as-of date and race day into four sequential
//! phases and maps week numbers onto them. Week numbers are 1-indexed.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::constants::{phase_share, MINIMUM_TRAINING_WEEKS};
use super::PlanError;
use crate::models::Phase;

// ---------------------------------------------------------------------------
/// Phase Breakdown: Week counts per phase
// ---------------------------------------------------------------------------

/// Week allocation for a plan.
///
/// Base, build and peak are floored and taper is ceiled, so the four counts
/// can fall up to two weeks short of `total_weeks`. Weeks past the allocated
/// range fall into taper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBreakdown {
    pub total_weeks: u32,
    pub base_weeks: u32,
    pub build_weeks: u32,
    pub peak_weeks: u32,
    pub taper_weeks: u32,
}

impl PhaseBreakdown {
    /// Allocate `total_weeks` across phases using the fixed distribution
    pub fn allocate(total_weeks: u32) -> Self {
        let total = total_weeks as f64;
        Self {
            total_weeks,
            base_weeks: (total * phase_share(Phase::Base)).floor() as u32,
            build_weeks: (total * phase_share(Phase::Build)).floor() as u32,
            peak_weeks: (total * phase_share(Phase::Peak)).floor() as u32,
            taper_weeks: (total * phase_share(Phase::Taper)).ceil() as u32,
        }
    }

    pub fn weeks_in(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Base => self.base_weeks,
            Phase::Build => self.build_weeks,
            Phase::Peak => self.peak_weeks,
            Phase::Taper => self.taper_weeks,
        }
    }

    /// Weeks allocated to all phases before `phase`
    pub fn weeks_before(&self, phase: Phase) -> u32 {
        Phase::ALL
            .iter()
            .take_while(|p| **p != phase)
            .map(|p| self.weeks_in(*p))
            .sum()
    }

    /// Sum of the four phase counts (never more than `total_weeks`)
    pub fn allocated_weeks(&self) -> u32 {
        self.base_weeks + self.build_weeks + self.peak_weeks + self.taper_weeks
    }

    /// Inclusive week range for a phase. Taper extends to cover every week
    /// of the plan, absorbing any rounding overflow.
    pub fn phase_range(&self, phase: Phase) -> RangeInclusive<u32> {
        let start = self.weeks_before(phase) + 1;
        let end = match phase {
            Phase::Taper => self.total_weeks.max(self.allocated_weeks()),
            _ => start + self.weeks_in(phase) - 1,
        };
        start..=end
    }
}

// ---------------------------------------------------------------------------
// Phase Calculations
// ---------------------------------------------------------------------------

/// Whole weeks from `today` to `race_date`, rounded down
fn whole_weeks_until(race_date: NaiveDate, today: NaiveDate) -> i64 {
    (race_date - today).num_days().div_euclid(7)
}

/// Compute the phase breakdown for a race as of `today`.
///
/// Fails when fewer than the minimum number of weeks remain.
pub fn calculate_phases(race_date: NaiveDate, today: NaiveDate) -> Result<PhaseBreakdown, PlanError> {
    let total_weeks = whole_weeks_until(race_date, today);

    if total_weeks < MINIMUM_TRAINING_WEEKS {
        return Err(PlanError::InsufficientLeadTime {
            weeks: total_weeks,
            minimum: MINIMUM_TRAINING_WEEKS,
        });
    }

    Ok(PhaseBreakdown::allocate(total_weeks as u32))
}

/// Map a week number onto its phase. Anything past peak is taper.
pub fn phase_for_week(week_number: u32, breakdown: &PhaseBreakdown) -> Phase {
    let base_end = breakdown.base_weeks;
    let build_end = base_end + breakdown.build_weeks;
    let peak_end = build_end + breakdown.peak_weeks;

    if week_number <= base_end {
        Phase::Base
    } else if week_number <= build_end {
        Phase::Build
    } else if week_number <= peak_end {
        Phase::Peak
    } else {
        Phase::Taper
    }
}

/// First day of training: race date minus the whole weeks available as of `today`
pub fn training_start_date(race_date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, PlanError> {
    let breakdown = calculate_phases(race_date, today)?;
    Ok(race_date - Duration::weeks(breakdown.total_weeks as i64))
}

/// Current 1-indexed week of a plan computed fresh as of `today`. Never below 1.
pub fn current_week_number(race_date: NaiveDate, today: NaiveDate) -> Result<u32, PlanError> {
    let start = training_start_date(race_date, today)?;
    Ok(week_number_on(start, today))
}

/// Week number of `date` in a plan that started on `plan_start`. Never below 1.
pub fn week_number_on(plan_start: NaiveDate, date: NaiveDate) -> u32 {
    let elapsed = (date - plan_start).num_days().div_euclid(7);
    (elapsed + 1).max(1) as u32
}

/// Monday of the calendar week containing week `week_number` of the plan
pub fn week_start_date(week_number: u32, training_start: NaiveDate) -> NaiveDate {
    let offset = Duration::weeks(week_number.saturating_sub(1) as i64);
    let week_start = training_start + offset;
    let days_from_monday = week_start.weekday().num_days_from_monday() as i64;
    week_start - Duration::days(days_from_monday)
}
