//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Helper assertions

use crate::models::{FitnessLevel, NewWorkout, TrainingProfile};
use crate::plan::{generate_week_workouts, PhaseBreakdown};
use chrono::{Duration, NaiveDate, NaiveTime};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed the database with the mock training profile
pub async fn seed_test_profile(pool: &SqlitePool) -> TrainingProfile {
  let profile = mock_training_profile();
  crate::profile::save_profile(pool, &profile)
    .await
    .expect("Failed to seed training profile");
  profile
}

/// Seed `weeks` generated weeks of a plan starting Monday 2025-01-06 and
/// record that start on the stored profile
/// Returns the IDs of created workouts in generation order
pub async fn seed_test_workouts(pool: &SqlitePool, profile: &TrainingProfile, weeks: u32) -> Vec<i64> {
  let planned = TrainingProfile {
    plan_start_date: Some(plan_start()),
    ..profile.clone()
  };
  crate::profile::save_profile(pool, &planned)
    .await
    .expect("Failed to record plan start");

  let workouts: Vec<NewWorkout> = (1..=weeks)
    .flat_map(|week| {
      let week_start = plan_start() + Duration::weeks((week - 1) as i64);
      mock_week_workouts(profile, week, week_start)
    })
    .collect();

  crate::schedule::insert_workouts(pool, plan_start(), &workouts, 100)
    .await
    .expect("Failed to insert test workouts");

  sqlx::query_scalar("SELECT id FROM workouts WHERE user_id = ? ORDER BY id")
    .bind(&profile.user_id)
    .fetch_all(pool)
    .await
    .expect("Failed to read workout ids")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Monday used as the start of mock plans
pub fn plan_start() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date")
}

/// Intermediate athlete, 12 h/week, racing 16 weeks after `plan_start`
pub fn mock_training_profile() -> TrainingProfile {
  TrainingProfile {
    user_id: "athlete-1".to_string(),
    race_date: plan_start() + Duration::weeks(16),
    fitness_level: FitnessLevel::Intermediate,
    target_hours_per_week: 12.0,
    weekday_time: NaiveTime::from_hms_opt(6, 0, 0).expect("valid time"),
    weekend_time: NaiveTime::from_hms_opt(8, 0, 0).expect("valid time"),
    timezone: "America/Denver".to_string(),
    plan_start_date: None,
    created_at: None,
    updated_at: None,
  }
}

/// One generated week for the mock 16-week plan
pub fn mock_week_workouts(profile: &TrainingProfile, week: u32, week_start: NaiveDate) -> Vec<NewWorkout> {
  generate_week_workouts(&profile.user_id, week, week_start, profile, &PhaseBreakdown::allocate(16))
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify key tables exist
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('workouts', 'training_profiles')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected 2 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_workouts_returns_correct_count() {
    let pool = setup_test_db().await;
    let profile = seed_test_profile(&pool).await;

    let ids = seed_test_workouts(&pool, &profile, 2).await;
    assert_eq!(ids.len(), 16);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
      .fetch_one(&pool)
      .await
      .expect("Failed to count workouts");

    assert_eq!(count, 16);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_profile_is_sixteen_weeks_out() {
    let profile = mock_training_profile();
    assert_eq!((profile.race_date - plan_start()).num_days(), 112);
    assert_eq!(profile.fitness_level, FitnessLevel::Intermediate);
  }
}
