//! Environment-driven configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by the binary before `AppConfig::from_env` is called.

use std::env;
use std::str::FromStr;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DATABASE_URL_VAR: &str = "TRI_PLANNER_DATABASE_URL";
pub const INITIAL_WEEKS_VAR: &str = "TRI_PLANNER_INITIAL_WEEKS";
pub const INSERT_BATCH_VAR: &str = "TRI_PLANNER_INSERT_BATCH";

const DEFAULT_DATABASE_URL: &str = "sqlite://tri-planner.db?mode=rwc";
const DEFAULT_INITIAL_WEEKS: u32 = 3;
const DEFAULT_INSERT_BATCH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  pub database_url: String,
  /// Weeks generated eagerly when a plan is created
  pub initial_weeks: u32,
  /// Rows per insert transaction when extending a plan
  pub insert_batch_size: usize,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      initial_weeks: DEFAULT_INITIAL_WEEKS,
      insert_batch_size: DEFAULT_INSERT_BATCH,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    Ok(Self {
      database_url: env::var(DATABASE_URL_VAR).unwrap_or(defaults.database_url),
      initial_weeks: positive_var(INITIAL_WEEKS_VAR, defaults.initial_weeks)?,
      insert_batch_size: positive_var(INSERT_BATCH_VAR, defaults.insert_batch_size)?,
    })
  }
}

/// Read a positive integer from the environment, falling back when unset
fn positive_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
  T: FromStr + PartialOrd + Default,
{
  let Ok(raw) = env::var(key) else {
    return Ok(default);
  };

  match raw.trim().parse::<T>() {
    Ok(value) if value > T::default() => Ok(value),
    _ => Err(ConfigError::Invalid {
      key: key.to_string(),
      value: raw,
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_defaults_when_unset() {
    temp_env::with_vars_unset([DATABASE_URL_VAR, INITIAL_WEEKS_VAR, INSERT_BATCH_VAR], || {
      let config = AppConfig::from_env().unwrap();
      assert_eq!(config, AppConfig::default());
      assert_eq!(config.initial_weeks, 3);
    });
  }

  #[test]
  #[serial]
  fn test_reads_overrides() {
    temp_env::with_vars(
      [
        (DATABASE_URL_VAR, Some("sqlite::memory:")),
        (INITIAL_WEEKS_VAR, Some("4")),
        (INSERT_BATCH_VAR, Some(" 25 ")),
      ],
      || {
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.initial_weeks, 4);
        assert_eq!(config.insert_batch_size, 25);
      },
    );
  }

  #[test]
  #[serial]
  fn test_rejects_zero_and_garbage() {
    temp_env::with_var(INITIAL_WEEKS_VAR, Some("0"), || {
      let err = AppConfig::from_env().unwrap_err();
      assert_eq!(
        err,
        ConfigError::Invalid {
          key: INITIAL_WEEKS_VAR.to_string(),
          value: "0".to_string()
        }
      );
    });

    temp_env::with_var(INSERT_BATCH_VAR, Some("lots"), || {
      assert!(AppConfig::from_env().is_err());
    });
  }
}
