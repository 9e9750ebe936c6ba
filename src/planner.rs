//! Plan orchestration
//!
//! Ties plan generation to storage:
//! - onboarding saves the profile and eagerly generates the first weeks
//! - extension adds the next week on a recurring cadence (driven externally)
//! - overview reports where the athlete is in the plan

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::{NewWorkout, Phase, TrainingProfile, Workout};
use crate::plan::{
  calculate_phases, generate_week_workouts, phase_for_week, training_start_date, week_number_on,
  week_start_date, PhaseBreakdown, PlanError,
};
use crate::profile::{self, ProfileError, ValidatedOnboarding};
use crate::schedule::{self, ScheduleError};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
  #[error(transparent)]
  Plan(#[from] PlanError),

  #[error(transparent)]
  Profile(#[from] ProfileError),

  #[error(transparent)]
  Schedule(#[from] ScheduleError),

  #[error("No plan has been generated for user {0}")]
  NoPlan(String),
}

impl Serialize for PlannerError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Results
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResult {
  pub profile: TrainingProfile,
  pub phases: PhaseBreakdown,
  pub plan_start: NaiveDate,
  pub workouts_generated: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtensionResult {
  pub week_number: u32,
  pub phase: Phase,
  pub workouts_generated: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseWindow {
  pub phase: Phase,
  pub first_week: u32,
  pub last_week: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanOverview {
  pub race_date: NaiveDate,
  pub plan_start: NaiveDate,
  pub phases: PhaseBreakdown,
  pub current_week: u32,
  pub current_phase: Phase,
  pub weeks_until_race: i64,
  pub windows: Vec<PhaseWindow>,
}

/// ---------------------------------------------------------------------------
/// Plan Generation
/// ---------------------------------------------------------------------------

/// Generate weeks `first..=last` of a plan, without touching storage
pub fn generate_weeks(
  profile: &TrainingProfile,
  phases: &PhaseBreakdown,
  plan_start: NaiveDate,
  first: u32,
  last: u32,
) -> Vec<NewWorkout> {
  (first..=last)
    .flat_map(|week| {
      let week_start = week_start_date(week, plan_start);
      generate_week_workouts(&profile.user_id, week, week_start, profile, phases)
    })
    .collect()
}

/// Create or replace an athlete's profile and generate the opening weeks.
///
/// The lead-time check runs before anything is written. Saving the profile,
/// clearing the previous schedule and inserting the new weeks share one
/// transaction.
pub async fn onboard(
  pool: &SqlitePool,
  config: &AppConfig,
  user_id: &str,
  input: ValidatedOnboarding,
  today: NaiveDate,
) -> Result<OnboardingResult, PlannerError> {
  let mut profile = input.into_profile(user_id);
  let phases = calculate_phases(profile.race_date, today)?;
  let plan_start = training_start_date(profile.race_date, today)?;
  profile.plan_start_date = Some(plan_start);

  let last_week = config.initial_weeks.min(phases.total_weeks);
  let workouts = generate_weeks(&profile, &phases, plan_start, 1, last_week);

  let mut tx = pool.begin().await.map_err(tx_err("begin"))?;

  profile::save_profile(&mut *tx, &profile).await?;

  let cleared = schedule::clear_scheduled_workouts(&mut *tx, user_id).await?;
  if cleared > 0 {
    warn!("Replacing {} scheduled workouts from a previous plan for {}", cleared, user_id);
  }

  let workouts_generated = schedule::insert_plan_rows(&mut tx, plan_start, &workouts).await?;

  tx.commit().await.map_err(tx_err("commit"))?;

  info!(
    "Created {}-week plan for {} starting {} ({} workouts)",
    phases.total_weeks, user_id, plan_start, workouts_generated
  );

  Ok(OnboardingResult {
    profile,
    phases,
    plan_start,
    workouts_generated,
  })
}

fn tx_err(action: &'static str) -> impl FnOnce(sqlx::Error) -> PlannerError {
  move |e| ScheduleError::Database(format!("Failed to {} onboarding: {}", action, e)).into()
}

/// Phase breakdown fixed at the plan's start date
fn plan_phases(profile: &TrainingProfile) -> Result<(NaiveDate, PhaseBreakdown), PlannerError> {
  let plan_start = profile
    .plan_start_date
    .ok_or_else(|| PlannerError::NoPlan(profile.user_id.clone()))?;
  let phases = calculate_phases(profile.race_date, plan_start)?;
  Ok((plan_start, phases))
}

/// Generate the week after the latest stored one.
///
/// Returns `None` once every week up to the race has been generated.
pub async fn extend_plan(
  pool: &SqlitePool,
  config: &AppConfig,
  user_id: &str,
) -> Result<Option<ExtensionResult>, PlannerError> {
  let profile = profile::load_profile(pool, user_id).await?;
  let (plan_start, phases) = plan_phases(&profile)?;

  let latest = schedule::latest_week_number(pool, user_id, plan_start)
    .await?
    .unwrap_or(0);
  let week_number = latest + 1;

  if week_number > phases.total_weeks {
    info!("Plan for {} already covers all {} weeks", user_id, phases.total_weeks);
    return Ok(None);
  }

  let workouts = generate_weeks(&profile, &phases, plan_start, week_number, week_number);
  let workouts_generated =
    schedule::insert_workouts(pool, plan_start, &workouts, config.insert_batch_size).await?;
  let phase = phase_for_week(week_number, &phases);

  info!(
    "Generated week {} ({}) for {}: {} workouts",
    week_number, phase, user_id, workouts_generated
  );

  Ok(Some(ExtensionResult {
    week_number,
    phase,
    workouts_generated,
  }))
}

/// Workouts for one week of the athlete's current plan
pub async fn week_workouts(
  pool: &SqlitePool,
  user_id: &str,
  week_number: u32,
) -> Result<Vec<Workout>, PlannerError> {
  let profile = profile::load_profile(pool, user_id).await?;
  let plan_start = profile
    .plan_start_date
    .ok_or_else(|| PlannerError::NoPlan(profile.user_id.clone()))?;

  Ok(schedule::workouts_for_week(pool, user_id, plan_start, week_number).await?)
}

/// Where the athlete stands in their plan as of `today`
pub fn plan_overview(profile: &TrainingProfile, today: NaiveDate) -> Result<PlanOverview, PlannerError> {
  let (plan_start, phases) = plan_phases(profile)?;
  let current_week = week_number_on(plan_start, today);

  let windows = Phase::ALL
    .iter()
    .map(|phase| {
      let range = phases.phase_range(*phase);
      PhaseWindow {
        phase: *phase,
        first_week: *range.start(),
        last_week: *range.end(),
      }
    })
    .collect();

  Ok(PlanOverview {
    race_date: profile.race_date,
    plan_start,
    phases,
    current_week,
    current_phase: phase_for_week(current_week, &phases),
    weeks_until_race: (profile.race_date - today).num_days().div_euclid(7),
    windows,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::WorkoutStatus;
  use crate::profile::OnboardingInput;
  use crate::test_utils::*;
  use chrono::{Datelike, Duration, Weekday};

  // Wednesday
  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
  }

  fn onboarding(race_date: NaiveDate) -> ValidatedOnboarding {
    OnboardingInput {
      race_date: race_date.format("%Y-%m-%d").to_string(),
      fitness_level: "beginner".to_string(),
      target_hours: "10".to_string(),
      weekday_time: "05:45".to_string(),
      weekend_time: "07:00".to_string(),
      timezone: "Europe/Berlin".to_string(),
    }
    .validate(today())
    .expect("valid onboarding")
  }

  fn test_config() -> AppConfig {
    AppConfig {
      database_url: "sqlite::memory:".to_string(),
      initial_weeks: 3,
      insert_batch_size: 5,
    }
  }

  #[test]
  fn test_generate_weeks_spans_consecutive_weeks() {
    let profile = mock_training_profile();
    let phases = PhaseBreakdown::allocate(16);
    let workouts = generate_weeks(&profile, &phases, plan_start(), 1, 3);

    assert_eq!(workouts.len(), 24);
    let mondays: Vec<_> = workouts
      .iter()
      .filter(|w| w.scheduled_date.weekday() == Weekday::Mon)
      .map(|w| w.scheduled_date)
      .collect();
    assert_eq!(
      mondays,
      vec![plan_start(), plan_start() + Duration::weeks(1), plan_start() + Duration::weeks(2)]
    );
  }

  #[tokio::test]
  async fn test_onboard_generates_first_three_weeks() {
    let pool = setup_test_db().await;
    let race = today() + Duration::weeks(20);

    let result = onboard(&pool, &test_config(), "athlete-7", onboarding(race), today())
      .await
      .expect("Should onboard");

    assert_eq!(result.phases.total_weeks, 20);
    assert_eq!(result.plan_start, today());
    assert_eq!(result.workouts_generated, 24);

    let stored = profile::load_profile(&pool, "athlete-7").await.unwrap();
    assert_eq!(stored.plan_start_date, Some(today()));
    assert_eq!(stored.timezone, "Europe/Berlin");

    // Week 1 is pulled back to the Monday of the start week
    let week1 = week_workouts(&pool, "athlete-7", 1).await.unwrap();
    assert_eq!(week1.len(), 8);
    assert_eq!(week1[0].scheduled_date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    assert!(week1.iter().all(|w| w.phase == Phase::Base));

    let week3 = week_workouts(&pool, "athlete-7", 3).await.unwrap();
    assert_eq!(week3.len(), 8);
    assert!(week_workouts(&pool, "athlete-7", 4).await.unwrap().is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_onboard_rejects_short_lead_time_without_writing() {
    let pool = setup_test_db().await;
    let mut input = onboarding(today() + Duration::weeks(20));
    input.race_date = today() + Duration::weeks(8);

    let err = onboard(&pool, &test_config(), "athlete-8", input, today())
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      PlannerError::Plan(PlanError::InsufficientLeadTime { weeks: 8, .. })
    ));

    assert!(matches!(
      profile::load_profile(&pool, "athlete-8").await,
      Err(ProfileError::NotFound(_))
    ));
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(count, 0);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_extend_plan_adds_weeks_until_race() {
    let pool = setup_test_db().await;
    let race = today() + Duration::weeks(12);
    let config = AppConfig {
      initial_weeks: 10,
      ..test_config()
    };
    onboard(&pool, &config, "athlete-9", onboarding(race), today())
      .await
      .unwrap();

    let week11 = extend_plan(&pool, &config, "athlete-9").await.unwrap().unwrap();
    assert_eq!(week11.week_number, 11);
    assert_eq!(week11.workouts_generated, 8);

    let week12 = extend_plan(&pool, &config, "athlete-9").await.unwrap().unwrap();
    assert_eq!(week12.week_number, 12);
    assert_eq!(week12.phase, Phase::Taper);

    assert!(extend_plan(&pool, &config, "athlete-9").await.unwrap().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_extend_requires_a_plan() {
    let pool = setup_test_db().await;
    let profile = seed_test_profile(&pool).await;

    let err = extend_plan(&pool, &test_config(), &profile.user_id)
      .await
      .unwrap_err();
    assert!(matches!(err, PlannerError::NoPlan(_)));

    let err = extend_plan(&pool, &test_config(), "unknown").await.unwrap_err();
    assert!(matches!(err, PlannerError::Profile(ProfileError::NotFound(_))));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_reonboarding_keeps_history_and_replaces_schedule() {
    let pool = setup_test_db().await;
    let race = today() + Duration::weeks(20);
    onboard(&pool, &test_config(), "athlete-3", onboarding(race), today())
      .await
      .unwrap();

    let week1 = week_workouts(&pool, "athlete-3", 1).await.unwrap();
    schedule::complete_workout(&pool, "athlete-3", week1[0].id, chrono::Utc::now())
      .await
      .unwrap();

    let later = today() + Duration::weeks(2);
    let mut input = onboarding(race);
    input.target_hours = 14.0;
    let result = onboard(&pool, &test_config(), "athlete-3", input, later)
      .await
      .unwrap();
    assert_eq!(result.phases.total_weeks, 18);

    let all = schedule::workouts_between(
      &pool,
      "athlete-3",
      today() - Duration::weeks(1),
      race,
    )
    .await
    .unwrap();
    let completed: Vec<_> = all
      .iter()
      .filter(|w| w.status == WorkoutStatus::Completed)
      .collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(all.len(), 1 + 24);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_plan_overview() {
    let mut profile = mock_training_profile();
    assert!(matches!(
      plan_overview(&profile, plan_start()),
      Err(PlannerError::NoPlan(_))
    ));

    profile.plan_start_date = Some(plan_start());
    let overview = plan_overview(&profile, plan_start() + Duration::days(50)).unwrap();

    assert_eq!(overview.phases.total_weeks, 16);
    assert_eq!(overview.current_week, 8);
    assert_eq!(overview.current_phase, Phase::Build);
    assert_eq!(overview.weeks_until_race, 8);
    assert_eq!(overview.windows.len(), 4);
    assert_eq!(overview.windows[3].first_week, 15);
    assert_eq!(overview.windows[3].last_week, 16);
  }

  #[tokio::test]
  async fn test_reonboarding_over_skipped_weeks_starts_a_clean_plan() {
    let pool = setup_test_db().await;
    let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let race = monday + Duration::weeks(20);
    onboard(&pool, &test_config(), "athlete-4", onboarding(race), monday)
      .await
      .unwrap();

    for workout in week_workouts(&pool, "athlete-4", 3).await.unwrap() {
      schedule::skip_workout(&pool, "athlete-4", workout.id).await.unwrap();
    }

    let restart = monday + Duration::weeks(2);
    let result = onboard(&pool, &test_config(), "athlete-4", onboarding(race), restart)
      .await
      .unwrap();
    assert_eq!(result.plan_start, restart);
    assert_eq!(result.workouts_generated, 24);

    let week1 = week_workouts(&pool, "athlete-4", 1).await.unwrap();
    assert_eq!(week1.len(), 8);
    assert!(week1.iter().all(|w| w.plan_start_date == restart));
    assert_eq!(week1[0].scheduled_date, restart);

    let week3 = week_workouts(&pool, "athlete-4", 3).await.unwrap();
    assert_eq!(week3.len(), 8);
    assert!(week3.iter().all(|w| w.status == WorkoutStatus::Scheduled));

    // Old skipped rows stay as history on their own plan
    let skipped = schedule::workouts_for_week(&pool, "athlete-4", monday, 3).await.unwrap();
    assert_eq!(skipped.len(), 8);
    assert!(skipped.iter().all(|w| w.status == WorkoutStatus::Skipped));

    let next = extend_plan(&pool, &test_config(), "athlete-4").await.unwrap().unwrap();
    assert_eq!(next.week_number, 4);
    assert_eq!(next.workouts_generated, 8);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_failed_onboarding_leaves_previous_plan_intact() {
    let pool = setup_test_db().await;
    let race = today() + Duration::weeks(20);
    onboard(&pool, &test_config(), "athlete-5", onboarding(race), today())
      .await
      .unwrap();

    sqlx::query(
      r#"
      CREATE TRIGGER reject_second_week BEFORE INSERT ON workouts
      WHEN NEW.week_number = 2
      BEGIN
        SELECT RAISE(ABORT, 'week two rejected');
      END
      "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut input = onboarding(race);
    input.target_hours = 18.0;
    let err = onboard(&pool, &test_config(), "athlete-5", input, today() + Duration::weeks(1))
      .await
      .unwrap_err();
    assert!(matches!(err, PlannerError::Schedule(ScheduleError::Database(_))));

    let stored = profile::load_profile(&pool, "athlete-5").await.unwrap();
    assert_eq!(stored.plan_start_date, Some(today()));
    assert_eq!(stored.target_hours_per_week, 10.0);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts WHERE status = 'scheduled'")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(count, 24);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_week_workouts_requires_a_plan() {
    let pool = setup_test_db().await;
    let profile = seed_test_profile(&pool).await;

    let err = week_workouts(&pool, &profile.user_id, 1).await.unwrap_err();
    assert!(matches!(err, PlannerError::NoPlan(_)));

    teardown_test_db(pool).await;
  }
}
