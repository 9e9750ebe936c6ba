use chrono::{Datelike, Duration, NaiveDate};

use crate::commands::profile_and_today;
use crate::db::AppState;
use crate::planner::{plan_overview, week_workouts, PlanOverview};
use crate::schedule;
use crate::stats::{VolumeStats, WeekSummary};

pub async fn get_plan_overview(state: &AppState, user_id: &str) -> Result<PlanOverview, String> {
  let (profile, today) = profile_and_today(state, user_id).await?;
  plan_overview(&profile, today).map_err(|e| e.to_string())
}

/// Completed volume between two dates (defaults to the current Monday-Sunday week)
pub async fn get_volume_stats(
  state: &AppState,
  user_id: &str,
  from: Option<NaiveDate>,
  to: Option<NaiveDate>,
) -> Result<VolumeStats, String> {
  let (_, today) = profile_and_today(state, user_id).await?;
  let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
  let from = from.unwrap_or(monday);
  let to = to.unwrap_or(monday + Duration::days(6));

  let workouts = schedule::workouts_between(&state.db, user_id, from, to)
    .await
    .map_err(|e| format!("Failed to fetch workouts: {}", e))?;

  Ok(VolumeStats::from_workouts(&workouts))
}

/// Planned versus completed for a plan week (defaults to the current week)
pub async fn get_week_summary(
  state: &AppState,
  user_id: &str,
  week_number: Option<u32>,
) -> Result<WeekSummary, String> {
  let week_number = match week_number {
    Some(week) => week,
    None => get_plan_overview(state, user_id).await?.current_week,
  };

  let workouts = week_workouts(&state.db, user_id, week_number)
    .await
    .map_err(|e| format!("Failed to fetch workouts: {}", e))?;

  Ok(WeekSummary::compute(&workouts))
}
