use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Enumerations
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
  Swim,
  Bike,
  Run,
}

impl Discipline {
  pub const ALL: [Discipline; 3] = [Discipline::Swim, Discipline::Bike, Discipline::Run];

  pub fn as_str(&self) -> &'static str {
    match self {
      Discipline::Swim => "swim",
      Discipline::Bike => "bike",
      Discipline::Run => "run",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
  Easy,
  Tempo,
  Intervals,
  Long,
}

impl WorkoutType {
  pub fn as_str(&self) -> &'static str {
    match self {
      WorkoutType::Easy => "easy",
      WorkoutType::Tempo => "tempo",
      WorkoutType::Intervals => "intervals",
      WorkoutType::Long => "long",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
  #[default]
  Scheduled,
  Completed,
  Skipped,
}

impl WorkoutStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      WorkoutStatus::Scheduled => "scheduled",
      WorkoutStatus::Completed => "completed",
      WorkoutStatus::Skipped => "skipped",
    }
  }
}

/// Periodization phase. Variant order is the order phases occur in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Base,
  Build,
  Peak,
  Taper,
}

impl Phase {
  pub const ALL: [Phase; 4] = [Phase::Base, Phase::Build, Phase::Peak, Phase::Taper];

  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Base => "base",
      Phase::Build => "build",
      Phase::Peak => "peak",
      Phase::Taper => "taper",
    }
  }
}

macro_rules! text_enum {
  ($ty:ident, $label:literal, [$($variant:ident),+]) => {
    impl std::fmt::Display for $ty {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl std::str::FromStr for $ty {
      type Err = String;
      fn from_str(s: &str) -> Result<Self, Self::Err> {
        $(
          if s.eq_ignore_ascii_case($ty::$variant.as_str()) {
            return Ok($ty::$variant);
          }
        )+
        Err(format!("Unknown {}: {}", $label, s))
      }
    }
  };
}

text_enum!(Discipline, "discipline", [Swim, Bike, Run]);
text_enum!(WorkoutType, "workout type", [Easy, Tempo, Intervals, Long]);
text_enum!(WorkoutStatus, "workout status", [Scheduled, Completed, Skipped]);
text_enum!(Phase, "phase", [Base, Build, Peak, Taper]);

/// ---------------------------------------------------------------------------
/// Workout Records
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
  pub id: i64,
  pub user_id: String,
  pub discipline: Discipline,
  pub workout_type: WorkoutType,
  pub duration_minutes: i64,
  pub scheduled_date: NaiveDate,
  pub scheduled_time: NaiveTime,
  pub description: String,
  pub status: WorkoutStatus,
  pub completed_at: Option<DateTime<Utc>>,
  /// Start date of the plan this workout was generated for
  pub plan_start_date: NaiveDate,
  pub week_number: u32,
  pub phase: Phase,
  pub timezone: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// For inserting new workouts (without id, timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
  pub user_id: String,
  pub discipline: Discipline,
  pub workout_type: WorkoutType,
  pub duration_minutes: i64,
  pub scheduled_date: NaiveDate,
  pub scheduled_time: NaiveTime,
  pub description: String,
  pub status: WorkoutStatus,
  pub week_number: u32,
  pub phase: Phase,
  pub timezone: Option<String>,
}
