//! Environment-driven log initialization
//!
//! The crate logs through the `log` facade. Applications that don't install
//! their own logger can call [`init_logging`], which installs `env_logger`
//! at the level named by `PARQUET_DATASOURCE_LOG_LEVEL`.

use crate::error::DatasourceError;
use log::LevelFilter;
use std::io::Write;
use std::str::FromStr;

pub const LOG_LEVEL_ENV: &str = "PARQUET_DATASOURCE_LOG_LEVEL";

/// Severity threshold accepted in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl FromStr for LogLevel {
    type Err = DatasourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "off" => LogLevel::Off,
            _ => {
                return Err(DatasourceError::configuration(format!(
                    "Invalid log level: {}",
                    s
                )))
            }
        })
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

/// Level named by the environment, `Warn` when unset or unparsable
pub fn environment_level() -> LogLevel {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogLevel::Warn)
}

/// Install `env_logger` at the environment level
///
/// Returns false if a logger was already installed; calling this more than
/// once is harmless.
pub fn init_logging() -> bool {
    env_logger::Builder::new()
        .filter_level(environment_level().into())
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{} {style}{}{style:#} {}] {}",
                buf.timestamp(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" off ".parse::<LogLevel>().unwrap(), LogLevel::Off);

        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Invalid log level: verbose");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Warn);
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::Info);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging();
        assert!(!init_logging());
    }
}
