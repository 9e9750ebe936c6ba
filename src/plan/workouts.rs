//! Workout Generator
//!
//! Turns one week's volume into eight dated workouts using the fixed weekly
//! template.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::constants::{workout_description, WorkoutTemplate, WEEKLY_TEMPLATE};
use super::phases::{phase_for_week, PhaseBreakdown};
use super::volume::{calculate_weekly_volume, discipline_hours};
use crate::models::{NewWorkout, TrainingProfile, WorkoutStatus};

/// First date on or after `start` that falls on `day`
pub fn next_weekday_on_or_after(start: NaiveDate, day: Weekday) -> NaiveDate {
    let current = start.weekday().num_days_from_sunday() as i64;
    let target = day.num_days_from_sunday() as i64;
    start + Duration::days((target - current).rem_euclid(7))
}

/// Generate the workouts for one plan week.
///
/// Always returns one record per template slot, each in the `scheduled`
/// state. Calling twice yields two equal but independent lists.
pub fn generate_week_workouts(
    user_id: &str,
    week_number: u32,
    week_start: NaiveDate,
    profile: &TrainingProfile,
    breakdown: &PhaseBreakdown,
) -> Vec<NewWorkout> {
    let phase = phase_for_week(week_number, breakdown);
    let weekly_hours = calculate_weekly_volume(
        week_number,
        phase,
        profile.target_hours_per_week,
        profile.fitness_level,
        breakdown,
    );
    let split = discipline_hours(weekly_hours);

    WEEKLY_TEMPLATE
        .iter()
        .map(|slot: &WorkoutTemplate| {
            let hours = split.get(slot.discipline);
            let scheduled_time = if slot.is_weekend() {
                profile.weekend_time
            } else {
                profile.weekday_time
            };

            NewWorkout {
                user_id: user_id.to_string(),
                discipline: slot.discipline,
                workout_type: slot.workout_type,
                duration_minutes: (hours * slot.volume_fraction * 60.0).round() as i64,
                scheduled_date: next_weekday_on_or_after(week_start, slot.day),
                scheduled_time,
                description: workout_description(slot.discipline, slot.workout_type).to_string(),
                status: WorkoutStatus::Scheduled,
                week_number,
                phase,
                timezone: Some(profile.timezone.clone()),
            }
        })
        .collect()
}
