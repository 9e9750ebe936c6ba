use chrono::{NaiveDate, Utc};

use crate::commands::profile_and_today;
use crate::db::AppState;
use crate::models::Workout;
use crate::planner;
use crate::profile::parse_time;
use crate::schedule;

const DEFAULT_UPCOMING_LIMIT: u32 = 10;

/// Workouts for one plan week
pub async fn get_week_workouts(
  state: &AppState,
  user_id: &str,
  week_number: u32,
) -> Result<Vec<Workout>, String> {
  planner::week_workouts(&state.db, user_id, week_number)
    .await
    .map_err(|e| format!("Failed to fetch workouts: {}", e))
}

/// Next scheduled workouts from the athlete's today
pub async fn get_upcoming_workouts(
  state: &AppState,
  user_id: &str,
  limit: Option<u32>,
) -> Result<Vec<Workout>, String> {
  let (_, today) = profile_and_today(state, user_id).await?;
  schedule::upcoming_workouts(&state.db, user_id, today, limit.unwrap_or(DEFAULT_UPCOMING_LIMIT))
    .await
    .map_err(|e| format!("Failed to fetch upcoming workouts: {}", e))
}

pub async fn complete_workout(state: &AppState, user_id: &str, workout_id: i64) -> Result<Workout, String> {
  schedule::complete_workout(&state.db, user_id, workout_id, Utc::now())
    .await
    .map_err(|e| format!("Failed to complete workout: {}", e))
}

pub async fn skip_workout(state: &AppState, user_id: &str, workout_id: i64) -> Result<Workout, String> {
  schedule::skip_workout(&state.db, user_id, workout_id)
    .await
    .map_err(|e| format!("Failed to skip workout: {}", e))
}

/// Move a workout; `scheduled_date` is `YYYY-MM-DD`, `scheduled_time` is `HH:MM`
pub async fn reschedule_workout(
  state: &AppState,
  user_id: &str,
  workout_id: i64,
  scheduled_date: &str,
  scheduled_time: &str,
) -> Result<Workout, String> {
  let date = NaiveDate::parse_from_str(scheduled_date.trim(), "%Y-%m-%d")
    .map_err(|_| format!("Invalid date: {}", scheduled_date))?;
  let time = parse_time(scheduled_time).map_err(|e| e.to_string())?;

  schedule::reschedule_workout(&state.db, user_id, workout_id, date, time)
    .await
    .map_err(|e| format!("Failed to reschedule workout: {}", e))
}
