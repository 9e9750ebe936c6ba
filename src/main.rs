//! tri-planner command-line entry point
//!
//! Every subcommand prints its result as pretty JSON on stdout. Logs go to
//! stderr and are filtered with `RUST_LOG` (default `tri_planner=info`).

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tri_planner::commands::{dashboard, onboarding, workouts};
use tri_planner::config::AppConfig;
use tri_planner::profile::OnboardingInput;

/// Command-line arguments for tri-planner
#[derive(Parser, Debug)]
#[command(name = "tri-planner")]
#[command(about = "Periodized Ironman training plans")]
#[command(version)]
struct Args {
  /// Athlete identifier
  #[arg(short, long, env = "TRI_PLANNER_USER")]
  user: String,

  /// SQLite database URL (overrides TRI_PLANNER_DATABASE_URL)
  #[arg(long)]
  database_url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Save a training profile and generate the opening weeks
  Onboard {
    /// Race date (YYYY-MM-DD)
    #[arg(long)]
    race_date: String,
    /// beginner, intermediate or advanced
    #[arg(long)]
    fitness_level: String,
    /// Weekly training hours (6-20)
    #[arg(long)]
    target_hours: String,
    /// Weekday session time (HH:MM)
    #[arg(long, default_value = "06:00")]
    weekday_time: String,
    /// Weekend session time (HH:MM)
    #[arg(long, default_value = "08:00")]
    weekend_time: String,
    /// IANA timezone name
    #[arg(long, default_value = "UTC")]
    timezone: String,
  },
  /// Generate the next week of the plan
  Extend,
  /// Phase windows and current position in the plan
  Overview,
  /// Workouts in a plan week
  Week { week: u32 },
  /// Next scheduled workouts
  Upcoming {
    #[arg(short, long)]
    limit: Option<u32>,
  },
  /// Mark a workout as completed
  Complete { workout_id: i64 },
  /// Mark a workout as skipped
  Skip { workout_id: i64 },
  /// Move a workout to another date and time
  Reschedule {
    workout_id: i64,
    /// New date (YYYY-MM-DD)
    date: String,
    /// New time (HH:MM)
    time: String,
  },
  /// Completed volume by discipline and zone (defaults to this week)
  Volume {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
  },
  /// Planned versus completed for a plan week (defaults to the current week)
  Summary { week: Option<u32> },
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();

  // Initialize tracing
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tri_planner=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let args = Args::parse();

  let mut config = AppConfig::from_env().context("Invalid configuration")?;
  if let Some(url) = args.database_url {
    config.database_url = url;
  }
  debug!("Using config: {:?}", config);

  let state = tri_planner::connect(config)
    .await
    .context("Failed to initialize database")?;
  let user = args.user.as_str();

  match args.command {
    Command::Onboard {
      race_date,
      fitness_level,
      target_hours,
      weekday_time,
      weekend_time,
      timezone,
    } => {
      let input = OnboardingInput {
        race_date,
        fitness_level,
        target_hours,
        weekday_time,
        weekend_time,
        timezone,
      };
      print_json(onboarding::complete_onboarding(&state, user, input).await)
    }
    Command::Extend => print_json(onboarding::extend_training_plan(&state, user).await),
    Command::Overview => print_json(dashboard::get_plan_overview(&state, user).await),
    Command::Week { week } => print_json(workouts::get_week_workouts(&state, user, week).await),
    Command::Upcoming { limit } => print_json(workouts::get_upcoming_workouts(&state, user, limit).await),
    Command::Complete { workout_id } => print_json(workouts::complete_workout(&state, user, workout_id).await),
    Command::Skip { workout_id } => print_json(workouts::skip_workout(&state, user, workout_id).await),
    Command::Reschedule { workout_id, date, time } => {
      print_json(workouts::reschedule_workout(&state, user, workout_id, &date, &time).await)
    }
    Command::Volume { from, to } => print_json(dashboard::get_volume_stats(&state, user, from, to).await),
    Command::Summary { week } => print_json(dashboard::get_week_summary(&state, user, week).await),
  }
}

fn print_json<T: Serialize>(result: std::result::Result<T, String>) -> Result<()> {
  let value = result.map_err(|e| anyhow!(e))?;
  let json = serde_json::to_string_pretty(&value).context("Failed to serialize output")?;
  println!("{}", json);
  Ok(())
}
