//! Workout persistence and lifecycle
//!
//! Generated workouts start as `scheduled` and belong to the plan (keyed by
//! its start date) that produced them. From there an athlete can complete or
//! skip them, or move them to another date/time while they stay scheduled.
//! Every mutation checks that the workout belongs to the caller.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnection, SqliteQueryResult, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::models::{NewWorkout, Workout, WorkoutStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
  #[error("Workout not found: {0}")]
  NotFound(i64),

  #[error("Workout belongs to another user")]
  Forbidden,

  #[error("Cannot change workout from {from} to {to}")]
  InvalidTransition { from: WorkoutStatus, to: WorkoutStatus },

  #[error("Database error: {0}")]
  Database(String),
}

impl Serialize for ScheduleError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

fn db_err(context: &str) -> impl FnOnce(sqlx::Error) -> ScheduleError + '_ {
  move |e| ScheduleError::Database(format!("{}: {}", context, e))
}

/// ---------------------------------------------------------------------------
/// Row Mapping
/// ---------------------------------------------------------------------------

const WORKOUT_COLUMNS: &str = r#"
  id, user_id, discipline, workout_type, duration_minutes,
  scheduled_date, scheduled_time, description, status, completed_at,
  plan_start_date, week_number, phase, timezone, created_at, updated_at
"#;

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
  value.and_then(|s| {
    DateTime::parse_from_rfc3339(&s)
      .map(|dt| dt.with_timezone(&Utc))
      .ok()
  })
}

fn workout_from_row(row: &SqliteRow) -> Result<Workout, ScheduleError> {
  fn field<T: std::str::FromStr>(row: &SqliteRow, name: &str) -> Result<T, ScheduleError> {
    let raw: String = row.get(name);
    raw
      .parse()
      .map_err(|_| ScheduleError::Database(format!("Stored {} is invalid: {}", name, raw)))
  }

  let scheduled_date: String = row.get("scheduled_date");
  let scheduled_time: String = row.get("scheduled_time");
  let plan_start_date: String = row.get("plan_start_date");
  let week_number: i64 = row.get("week_number");

  Ok(Workout {
    id: row.get("id"),
    user_id: row.get("user_id"),
    discipline: field(row, "discipline")?,
    workout_type: field(row, "workout_type")?,
    duration_minutes: row.get("duration_minutes"),
    scheduled_date: NaiveDate::parse_from_str(&scheduled_date, DATE_FORMAT).map_err(|_| {
      ScheduleError::Database(format!("Stored scheduled_date is invalid: {}", scheduled_date))
    })?,
    scheduled_time: NaiveTime::parse_from_str(&scheduled_time, TIME_FORMAT).map_err(|_| {
      ScheduleError::Database(format!("Stored scheduled_time is invalid: {}", scheduled_time))
    })?,
    description: row.get("description"),
    status: field(row, "status")?,
    completed_at: parse_timestamp(row.get("completed_at")),
    plan_start_date: NaiveDate::parse_from_str(&plan_start_date, DATE_FORMAT).map_err(|_| {
      ScheduleError::Database(format!("Stored plan_start_date is invalid: {}", plan_start_date))
    })?,
    week_number: week_number.max(0) as u32,
    phase: field(row, "phase")?,
    timezone: row.get("timezone"),
    created_at: parse_timestamp(row.get("created_at")),
    updated_at: parse_timestamp(row.get("updated_at")),
  })
}

fn workouts_from_rows(rows: Vec<SqliteRow>) -> Result<Vec<Workout>, ScheduleError> {
  rows.iter().map(workout_from_row).collect()
}

/// ---------------------------------------------------------------------------
/// Bulk Insert
/// ---------------------------------------------------------------------------

/// Insert rows for the plan starting on `plan_start` on an open connection
/// or transaction. Rows whose (user, plan, week, discipline, type) slot is
/// already stored are skipped. Returns the number of rows inserted.
pub async fn insert_plan_rows(
  conn: &mut SqliteConnection,
  plan_start: NaiveDate,
  workouts: &[NewWorkout],
) -> Result<u64, ScheduleError> {
  let mut inserted = 0u64;
  let now = Utc::now().to_rfc3339();
  let plan_start = plan_start.format(DATE_FORMAT).to_string();

  for workout in workouts {
    let result = sqlx::query(
      r#"
      INSERT OR IGNORE INTO workouts (
        user_id, discipline, workout_type, duration_minutes,
        scheduled_date, scheduled_time, description, status,
        plan_start_date, week_number, phase, timezone, created_at, updated_at
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
      "#,
    )
    .bind(&workout.user_id)
    .bind(workout.discipline.as_str())
    .bind(workout.workout_type.as_str())
    .bind(workout.duration_minutes)
    .bind(workout.scheduled_date.format(DATE_FORMAT).to_string())
    .bind(workout.scheduled_time.format(TIME_FORMAT).to_string())
    .bind(&workout.description)
    .bind(workout.status.as_str())
    .bind(&plan_start)
    .bind(workout.week_number as i64)
    .bind(workout.phase.as_str())
    .bind(&workout.timezone)
    .bind(&now)
    .execute(&mut *conn)
    .await
    .map_err(db_err("Failed to insert workout"))?;

    inserted += result.rows_affected();
  }

  Ok(inserted)
}

/// Persist generated workouts in chunks of `batch_size`, one transaction per
/// chunk. Returns the number of rows inserted.
pub async fn insert_workouts(
  pool: &SqlitePool,
  plan_start: NaiveDate,
  workouts: &[NewWorkout],
  batch_size: usize,
) -> Result<u64, ScheduleError> {
  let mut inserted = 0u64;

  for chunk in workouts.chunks(batch_size.max(1)) {
    let mut tx = pool
      .begin()
      .await
      .map_err(db_err("Failed to begin transaction"))?;

    inserted += insert_plan_rows(&mut tx, plan_start, chunk).await?;

    tx.commit()
      .await
      .map_err(db_err("Failed to commit workouts"))?;
    debug!("Committed batch of {} workouts", chunk.len());
  }

  Ok(inserted)
}

/// Drop workouts still in the `scheduled` state for a user. Completed and
/// skipped workouts are history and stay.
pub async fn clear_scheduled_workouts<'e, E>(executor: E, user_id: &str) -> Result<u64, ScheduleError>
where
  E: sqlx::Executor<'e, Database = Sqlite>,
{
  let result = sqlx::query("DELETE FROM workouts WHERE user_id = ? AND status = 'scheduled'")
    .bind(user_id)
    .execute(executor)
    .await
    .map_err(db_err("Failed to clear workouts"))?;

  Ok(result.rows_affected())
}

/// ---------------------------------------------------------------------------
/// Queries
/// ---------------------------------------------------------------------------

pub async fn load_workout(pool: &SqlitePool, workout_id: i64) -> Result<Workout, ScheduleError> {
  let row = sqlx::query(&format!("SELECT {} FROM workouts WHERE id = ?", WORKOUT_COLUMNS))
    .bind(workout_id)
    .fetch_optional(pool)
    .await
    .map_err(db_err("Failed to load workout"))?
    .ok_or(ScheduleError::NotFound(workout_id))?;

  workout_from_row(&row)
}

/// All workouts for one week of the plan starting on `plan_start`, in
/// calendar order
pub async fn workouts_for_week(
  pool: &SqlitePool,
  user_id: &str,
  plan_start: NaiveDate,
  week_number: u32,
) -> Result<Vec<Workout>, ScheduleError> {
  let rows = sqlx::query(&format!(
    r#"
    SELECT {} FROM workouts
    WHERE user_id = ? AND plan_start_date = ? AND week_number = ?
    ORDER BY scheduled_date, scheduled_time, id
    "#,
    WORKOUT_COLUMNS
  ))
  .bind(user_id)
  .bind(plan_start.format(DATE_FORMAT).to_string())
  .bind(week_number as i64)
  .fetch_all(pool)
  .await
  .map_err(db_err("Failed to load week"))?;

  workouts_from_rows(rows)
}

/// Workouts scheduled between two dates, inclusive, across all plans
pub async fn workouts_between(
  pool: &SqlitePool,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<Workout>, ScheduleError> {
  let rows = sqlx::query(&format!(
    "SELECT {} FROM workouts WHERE user_id = ? AND scheduled_date BETWEEN ? AND ? ORDER BY scheduled_date, scheduled_time, id",
    WORKOUT_COLUMNS
  ))
  .bind(user_id)
  .bind(from.format(DATE_FORMAT).to_string())
  .bind(to.format(DATE_FORMAT).to_string())
  .fetch_all(pool)
  .await
  .map_err(db_err("Failed to load workouts"))?;

  workouts_from_rows(rows)
}

/// Next scheduled workouts on or after `today`
pub async fn upcoming_workouts(
  pool: &SqlitePool,
  user_id: &str,
  today: NaiveDate,
  limit: u32,
) -> Result<Vec<Workout>, ScheduleError> {
  let rows = sqlx::query(&format!(
    r#"
    SELECT {} FROM workouts
    WHERE user_id = ? AND status = 'scheduled' AND scheduled_date >= ?
    ORDER BY scheduled_date, scheduled_time, id
    LIMIT ?
    "#,
    WORKOUT_COLUMNS
  ))
  .bind(user_id)
  .bind(today.format(DATE_FORMAT).to_string())
  .bind(limit as i64)
  .fetch_all(pool)
  .await
  .map_err(db_err("Failed to load upcoming workouts"))?;

  workouts_from_rows(rows)
}

/// Highest week number generated for the plan starting on `plan_start`
pub async fn latest_week_number(
  pool: &SqlitePool,
  user_id: &str,
  plan_start: NaiveDate,
) -> Result<Option<u32>, ScheduleError> {
  let latest: Option<i64> = sqlx::query_scalar(
    "SELECT MAX(week_number) FROM workouts WHERE user_id = ? AND plan_start_date = ?",
  )
  .bind(user_id)
  .bind(plan_start.format(DATE_FORMAT).to_string())
  .fetch_one(pool)
  .await
  .map_err(db_err("Failed to read latest week"))?;

  Ok(latest.map(|w| w.max(0) as u32))
}

/// ---------------------------------------------------------------------------
/// Lifecycle Transitions
/// ---------------------------------------------------------------------------

/// Load a workout and check it belongs to `user_id` and is still scheduled
async fn load_for_update(
  pool: &SqlitePool,
  user_id: &str,
  workout_id: i64,
  target: WorkoutStatus,
) -> Result<Workout, ScheduleError> {
  let workout = load_workout(pool, workout_id).await?;

  if workout.user_id != user_id {
    return Err(ScheduleError::Forbidden);
  }
  if workout.status != WorkoutStatus::Scheduled {
    return Err(ScheduleError::InvalidTransition {
      from: workout.status,
      to: target,
    });
  }

  Ok(workout)
}

/// Report the outcome of an UPDATE guarded on owner and `scheduled` status.
/// No affected row means another writer moved the workout first.
async fn finish_update(
  pool: &SqlitePool,
  workout_id: i64,
  target: WorkoutStatus,
  result: SqliteQueryResult,
) -> Result<Workout, ScheduleError> {
  let workout = load_workout(pool, workout_id).await?;
  if result.rows_affected() == 0 {
    return Err(ScheduleError::InvalidTransition {
      from: workout.status,
      to: target,
    });
  }
  Ok(workout)
}

/// Move a scheduled workout to `target`, stamping `completed_at` when given.
/// The status check is part of the UPDATE itself.
async fn set_status(
  pool: &SqlitePool,
  user_id: &str,
  workout_id: i64,
  target: WorkoutStatus,
  completed_at: Option<DateTime<Utc>>,
) -> Result<Workout, ScheduleError> {
  let result = sqlx::query(
    r#"
    UPDATE workouts SET status = ?, completed_at = ?, updated_at = ?
    WHERE id = ? AND user_id = ? AND status = 'scheduled'
    "#,
  )
  .bind(target.as_str())
  .bind(completed_at.map(|at| at.to_rfc3339()))
  .bind(Utc::now().to_rfc3339())
  .bind(workout_id)
  .bind(user_id)
  .execute(pool)
  .await
  .map_err(db_err("Failed to update workout status"))?;

  finish_update(pool, workout_id, target, result).await
}

/// Mark a scheduled workout completed
pub async fn complete_workout(
  pool: &SqlitePool,
  user_id: &str,
  workout_id: i64,
  completed_at: DateTime<Utc>,
) -> Result<Workout, ScheduleError> {
  load_for_update(pool, user_id, workout_id, WorkoutStatus::Completed).await?;
  let workout = set_status(pool, user_id, workout_id, WorkoutStatus::Completed, Some(completed_at)).await?;

  info!("Workout {} completed by {}", workout_id, user_id);
  Ok(workout)
}

/// Mark a scheduled workout skipped
pub async fn skip_workout(pool: &SqlitePool, user_id: &str, workout_id: i64) -> Result<Workout, ScheduleError> {
  load_for_update(pool, user_id, workout_id, WorkoutStatus::Skipped).await?;
  let workout = set_status(pool, user_id, workout_id, WorkoutStatus::Skipped, None).await?;

  info!("Workout {} skipped by {}", workout_id, user_id);
  Ok(workout)
}

/// Move a scheduled workout to a new date and time. It stays scheduled and
/// keeps its plan week.
pub async fn reschedule_workout(
  pool: &SqlitePool,
  user_id: &str,
  workout_id: i64,
  date: NaiveDate,
  time: NaiveTime,
) -> Result<Workout, ScheduleError> {
  load_for_update(pool, user_id, workout_id, WorkoutStatus::Scheduled).await?;

  let result = sqlx::query(
    r#"
    UPDATE workouts SET scheduled_date = ?, scheduled_time = ?, updated_at = ?
    WHERE id = ? AND user_id = ? AND status = 'scheduled'
    "#,
  )
  .bind(date.format(DATE_FORMAT).to_string())
  .bind(time.format(TIME_FORMAT).to_string())
  .bind(Utc::now().to_rfc3339())
  .bind(workout_id)
  .bind(user_id)
  .execute(pool)
  .await
  .map_err(db_err("Failed to reschedule workout"))?;

  let workout = finish_update(pool, workout_id, WorkoutStatus::Scheduled, result).await?;
  info!("Workout {} moved to {} {}", workout_id, date, time.format(TIME_FORMAT));
  Ok(workout)
}
