use chrono::Utc;

use crate::db::AppState;
use crate::planner::{self, ExtensionResult, OnboardingResult};
use crate::profile::{today_in_timezone, OnboardingInput};

/// Validate onboarding input, save the profile and generate the opening weeks
pub async fn complete_onboarding(
  state: &AppState,
  user_id: &str,
  input: OnboardingInput,
) -> Result<OnboardingResult, String> {
  let today = today_in_timezone(input.timezone.trim(), Utc::now());
  let validated = input.validate(today).map_err(|e| e.to_string())?;

  planner::onboard(&state.db, &state.config, user_id, validated, today)
    .await
    .map_err(|e| format!("Failed to create training plan: {}", e))
}

/// Generate the next week of an existing plan (run on a weekly schedule)
pub async fn extend_training_plan(
  state: &AppState,
  user_id: &str,
) -> Result<Option<ExtensionResult>, String> {
  planner::extend_plan(&state.db, &state.config, user_id)
    .await
    .map_err(|e| format!("Failed to extend training plan: {}", e))
}
