//! Training profiles: onboarding validation and persistence

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite, SqlitePool};

use crate::models::{FitnessLevel, TrainingProfile};
use crate::plan::{calculate_phases, PlanError};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const MIN_TARGET_HOURS: f64 = 6.0;
pub const MAX_TARGET_HOURS: f64 = 20.0;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
  #[error("{0}")]
  InvalidInput(String),

  #[error(transparent)]
  Plan(#[from] PlanError),

  #[error("No training profile for user {0}")]
  NotFound(String),

  #[error("Database error: {0}")]
  Database(String),
}

impl Serialize for ProfileError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Onboarding Input
/// ---------------------------------------------------------------------------

/// Raw onboarding fields as submitted by the athlete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingInput {
  pub race_date: String,
  pub fitness_level: String,
  pub target_hours: String,
  pub weekday_time: String,
  pub weekend_time: String,
  pub timezone: String,
}

/// Onboarding fields after parsing and range checks
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOnboarding {
  pub race_date: NaiveDate,
  pub fitness_level: FitnessLevel,
  pub target_hours: f64,
  pub weekday_time: NaiveTime,
  pub weekend_time: NaiveTime,
  pub timezone: Tz,
}

impl OnboardingInput {
  /// Check every field and the race lead time as of `today`
  pub fn validate(&self, today: NaiveDate) -> Result<ValidatedOnboarding, ProfileError> {
    let fields = [
      ("raceDate", &self.race_date),
      ("fitnessLevel", &self.fitness_level),
      ("targetHours", &self.target_hours),
      ("weekdayTime", &self.weekday_time),
      ("weekendTime", &self.weekend_time),
      ("timezone", &self.timezone),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
      return Err(invalid(format!("Missing required field: {}", name)));
    }

    let race_date = NaiveDate::parse_from_str(self.race_date.trim(), DATE_FORMAT)
      .map_err(|_| invalid(format!("Invalid race date: {}", self.race_date)))?;

    let fitness_level: FitnessLevel = self.fitness_level.parse().map_err(invalid)?;

    let target_hours: f64 = self
      .target_hours
      .trim()
      .parse()
      .map_err(|_| invalid(format!("Invalid target hours: {}", self.target_hours)))?;
    if !(MIN_TARGET_HOURS..=MAX_TARGET_HOURS).contains(&target_hours) {
      return Err(invalid(format!(
        "Target hours must be between {} and {}",
        MIN_TARGET_HOURS, MAX_TARGET_HOURS
      )));
    }

    let weekday_time = parse_time(&self.weekday_time)?;
    let weekend_time = parse_time(&self.weekend_time)?;

    let timezone: Tz = self
      .timezone
      .trim()
      .parse()
      .map_err(|_| invalid(format!("Unknown timezone: {}", self.timezone)))?;

    // Same lead-time rule the plan generator enforces
    calculate_phases(race_date, today)?;

    Ok(ValidatedOnboarding {
      race_date,
      fitness_level,
      target_hours,
      weekday_time,
      weekend_time,
      timezone,
    })
  }
}

impl ValidatedOnboarding {
  pub fn into_profile(self, user_id: &str) -> TrainingProfile {
    TrainingProfile {
      user_id: user_id.to_string(),
      race_date: self.race_date,
      fitness_level: self.fitness_level,
      target_hours_per_week: self.target_hours,
      weekday_time: self.weekday_time,
      weekend_time: self.weekend_time,
      timezone: self.timezone.name().to_string(),
      plan_start_date: None,
      created_at: None,
      updated_at: None,
    }
  }
}

fn invalid(message: String) -> ProfileError {
  ProfileError::InvalidInput(message)
}

/// Parse a 24h `HH:MM` time of day
pub fn parse_time(value: &str) -> Result<NaiveTime, ProfileError> {
  NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
    .map_err(|_| invalid(format!("Invalid time (expected HH:MM): {}", value)))
}

/// Calendar date "now" in the athlete's timezone. Falls back to UTC for
/// names chrono-tz does not know.
pub fn today_in_timezone(timezone: &str, now: DateTime<Utc>) -> NaiveDate {
  match timezone.parse::<Tz>() {
    Ok(tz) => now.with_timezone(&tz).date_naive(),
    Err(_) => now.date_naive(),
  }
}

/// ---------------------------------------------------------------------------
/// Database Operations
/// ---------------------------------------------------------------------------

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
  value.and_then(|s| {
    DateTime::parse_from_rfc3339(&s)
      .map(|dt| dt.with_timezone(&Utc))
      .ok()
  })
}

/// Create or replace the profile for `profile.user_id`. Runs on a pool or
/// inside a caller's transaction.
pub async fn save_profile<'e, E>(executor: E, profile: &TrainingProfile) -> Result<(), ProfileError>
where
  E: sqlx::Executor<'e, Database = Sqlite>,
{
  let now = Utc::now().to_rfc3339();

  sqlx::query(
    r#"
    INSERT INTO training_profiles (
      user_id, race_date, fitness_level, target_hours_per_week,
      weekday_time, weekend_time, timezone, plan_start_date, created_at, updated_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
    ON CONFLICT(user_id) DO UPDATE SET
      race_date = excluded.race_date,
      fitness_level = excluded.fitness_level,
      target_hours_per_week = excluded.target_hours_per_week,
      weekday_time = excluded.weekday_time,
      weekend_time = excluded.weekend_time,
      timezone = excluded.timezone,
      plan_start_date = excluded.plan_start_date,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(&profile.user_id)
  .bind(profile.race_date.format(DATE_FORMAT).to_string())
  .bind(profile.fitness_level.as_str())
  .bind(profile.target_hours_per_week)
  .bind(profile.weekday_time.format(TIME_FORMAT).to_string())
  .bind(profile.weekend_time.format(TIME_FORMAT).to_string())
  .bind(&profile.timezone)
  .bind(profile.plan_start_date.map(|d| d.format(DATE_FORMAT).to_string()))
  .bind(&now)
  .execute(executor)
  .await
  .map_err(|e| ProfileError::Database(format!("Failed to save profile: {}", e)))?;

  Ok(())
}

/// Load the profile for a user
pub async fn load_profile(pool: &SqlitePool, user_id: &str) -> Result<TrainingProfile, ProfileError> {
  let row = sqlx::query(
    r#"
    SELECT
      user_id, race_date, fitness_level, target_hours_per_week,
      weekday_time, weekend_time, timezone, plan_start_date,
      created_at, updated_at
    FROM training_profiles
    WHERE user_id = ?
    "#,
  )
  .bind(user_id)
  .fetch_optional(pool)
  .await
  .map_err(|e| ProfileError::Database(format!("Failed to load profile: {}", e)))?
  .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;

  let corrupt = |field: &str, value: &str| {
    ProfileError::Database(format!("Stored {} is invalid: {}", field, value))
  };

  let race_date: String = row.get("race_date");
  let fitness_level: String = row.get("fitness_level");
  let weekday_time: String = row.get("weekday_time");
  let weekend_time: String = row.get("weekend_time");
  let plan_start_date: Option<String> = row.get("plan_start_date");

  Ok(TrainingProfile {
    user_id: row.get("user_id"),
    race_date: NaiveDate::parse_from_str(&race_date, DATE_FORMAT)
      .map_err(|_| corrupt("race_date", &race_date))?,
    fitness_level: fitness_level
      .parse()
      .map_err(|_| corrupt("fitness_level", &fitness_level))?,
    target_hours_per_week: row.get("target_hours_per_week"),
    weekday_time: NaiveTime::parse_from_str(&weekday_time, TIME_FORMAT)
      .map_err(|_| corrupt("weekday_time", &weekday_time))?,
    weekend_time: NaiveTime::parse_from_str(&weekend_time, TIME_FORMAT)
      .map_err(|_| corrupt("weekend_time", &weekend_time))?,
    timezone: row.get("timezone"),
    plan_start_date: plan_start_date.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
    created_at: parse_timestamp(row.get("created_at")),
    updated_at: parse_timestamp(row.get("updated_at")),
  })
}
