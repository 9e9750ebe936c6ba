//! Command layer
//!
//! Thin entry points over `AppState` used by the CLI. Errors are flattened to
//! display strings at this boundary. This is also the only layer that reads
//! the clock: "today" is the current date in the athlete's timezone.

pub mod dashboard;
pub mod onboarding;
pub mod workouts;

use chrono::{NaiveDate, Utc};

use crate::db::AppState;
use crate::models::TrainingProfile;
use crate::profile::{load_profile, today_in_timezone};

/// Load a profile together with the athlete's current local date
pub(crate) async fn profile_and_today(
  state: &AppState,
  user_id: &str,
) -> Result<(TrainingProfile, NaiveDate), String> {
  let profile = load_profile(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to load profile: {}", e))?;
  let today = today_in_timezone(&profile.timezone, Utc::now());
  Ok((profile, today))
}
