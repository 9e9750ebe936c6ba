use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
  Beginner,
  Intermediate,
  Advanced,
}

impl FitnessLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      FitnessLevel::Beginner => "beginner",
      FitnessLevel::Intermediate => "intermediate",
      FitnessLevel::Advanced => "advanced",
    }
  }
}

impl std::fmt::Display for FitnessLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for FitnessLevel {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "beginner" => Ok(Self::Beginner),
      "intermediate" => Ok(Self::Intermediate),
      "advanced" => Ok(Self::Advanced),
      _ => Err(format!("Unknown fitness level: {}", s)),
    }
  }
}

/// Athlete inputs the plan is generated from.
///
/// `plan_start_date` is recorded when the first weeks of a plan are generated,
/// so later weeks can be numbered against a fixed start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingProfile {
  pub user_id: String,
  pub race_date: NaiveDate,
  pub fitness_level: FitnessLevel,
  pub target_hours_per_week: f64,
  pub weekday_time: NaiveTime,
  pub weekend_time: NaiveTime,
  pub timezone: String,
  pub plan_start_date: Option<NaiveDate>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}
