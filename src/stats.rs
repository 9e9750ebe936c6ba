//! Deterministic dashboard aggregates over stored workouts
//!
//! Completed volume by discipline and intensity zone, and planned versus
//! completed totals for a week.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Discipline, Workout, WorkoutStatus, WorkoutType};

/// ---------------------------------------------------------------------------
/// Intensity Zones
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityZone {
  Zone2, // Aerobic: easy and long sessions
  Zone3, // Tempo
  Zone4, // Threshold and above: intervals
}

impl IntensityZone {
  pub fn for_workout_type(workout_type: WorkoutType) -> Self {
    match workout_type {
      WorkoutType::Easy | WorkoutType::Long => IntensityZone::Zone2,
      WorkoutType::Tempo => IntensityZone::Zone3,
      WorkoutType::Intervals => IntensityZone::Zone4,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Completed Volume
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
  pub total_minutes: i64,
  pub discipline_minutes: BTreeMap<String, i64>,
  pub zone_minutes: BTreeMap<String, i64>,
}

impl VolumeStats {
  /// Sum completed workouts only
  pub fn from_workouts(workouts: &[Workout]) -> Self {
    let mut discipline_minutes: BTreeMap<String, i64> = Discipline::ALL
      .iter()
      .map(|d| (d.to_string(), 0))
      .collect();
    let mut zone_minutes: BTreeMap<String, i64> = [
      IntensityZone::Zone2,
      IntensityZone::Zone3,
      IntensityZone::Zone4,
    ]
    .iter()
    .map(|z| (zone_key(*z).to_string(), 0))
    .collect();

    let mut total_minutes = 0;
    for workout in workouts.iter().filter(|w| w.status == WorkoutStatus::Completed) {
      total_minutes += workout.duration_minutes;
      *discipline_minutes
        .entry(workout.discipline.to_string())
        .or_insert(0) += workout.duration_minutes;
      let zone = IntensityZone::for_workout_type(workout.workout_type);
      *zone_minutes.entry(zone_key(zone).to_string()).or_insert(0) += workout.duration_minutes;
    }

    Self {
      total_minutes,
      discipline_minutes,
      zone_minutes,
    }
  }

  pub fn minutes_for(&self, discipline: Discipline) -> i64 {
    self
      .discipline_minutes
      .get(discipline.as_str())
      .copied()
      .unwrap_or(0)
  }
}

fn zone_key(zone: IntensityZone) -> &'static str {
  match zone {
    IntensityZone::Zone2 => "zone2",
    IntensityZone::Zone3 => "zone3",
    IntensityZone::Zone4 => "zone4",
  }
}

/// ---------------------------------------------------------------------------
/// Week Summary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
  pub planned_minutes: i64,
  pub completed_minutes: i64,
  /// `planned_minutes` as `H:MM`
  pub planned_display: String,
  pub completed_display: String,
  pub scheduled_count: usize,
  pub completed_count: usize,
  pub skipped_count: usize,
  /// Completed share of all workouts in the week (0-100)
  pub completion_pct: f64,
}

impl WeekSummary {
  pub fn compute(workouts: &[Workout]) -> Self {
    let count = |status: WorkoutStatus| workouts.iter().filter(|w| w.status == status).count();
    let completed_count = count(WorkoutStatus::Completed);

    let completion_pct = if workouts.is_empty() {
      0.0
    } else {
      completed_count as f64 / workouts.len() as f64 * 100.0
    };

    let planned_minutes: i64 = workouts.iter().map(|w| w.duration_minutes).sum();
    let completed_minutes: i64 = workouts
      .iter()
      .filter(|w| w.status == WorkoutStatus::Completed)
      .map(|w| w.duration_minutes)
      .sum();

    Self {
      planned_minutes,
      completed_minutes,
      planned_display: format_hours_minutes(planned_minutes),
      completed_display: format_hours_minutes(completed_minutes),
      scheduled_count: count(WorkoutStatus::Scheduled),
      completed_count,
      skipped_count: count(WorkoutStatus::Skipped),
      completion_pct,
    }
  }
}

/// Format minutes as `H:MM`
pub fn format_hours_minutes(total_minutes: i64) -> String {
  let total = total_minutes.max(0);
  format!("{}:{:02}", total / 60, total % 60)
}
