//! Ironman training planner
//!
//! Periodized plan generation (`plan`), storage (`db`, `profile`, `schedule`),
//! orchestration (`planner`) and dashboard aggregates (`stats`), exposed
//! through the `commands` layer.

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod plan;
pub mod planner;
pub mod profile;
pub mod schedule;
pub mod stats;

#[cfg(test)]
mod test_utils;

use config::AppConfig;
use db::AppState;

/// Open the database named by `config` and build the shared application state
pub async fn connect(config: AppConfig) -> Result<AppState, sqlx::Error> {
  let pool = db::initialize_db(&config.database_url).await?;
  Ok(AppState::new(pool, config))
}
