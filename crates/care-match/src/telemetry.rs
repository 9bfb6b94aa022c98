//! Tracing setup for the service binary.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directives: String, source: ParseError },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directives, .. } => {
                write!(f, "invalid log directives '{directives}'")
            }
            TelemetryError::Init(err) => write!(f, "tracing init failed: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

/// Filter from the configured level, with the HTTP stack pinned to `warn`
/// to keep request noise out of the default output.
fn filter_from_level(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = format!("{level},hyper=warn,tower=warn");
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter { directives, source })
}

/// Install the global tracing subscriber. `RUST_LOG` wins wholesale when
/// set; otherwise the configured level applies.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_from_level(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_log_level_is_rejected_with_the_offending_directives() {
        match filter_from_level("not=a=level") {
            Err(TelemetryError::Filter { directives, .. }) => {
                assert!(directives.starts_with("not=a=level"));
            }
            other => panic!("expected a filter error, got {other:?}"),
        }
    }

    #[test]
    fn configured_level_produces_a_filter() {
        assert!(filter_from_level("debug").is_ok());
    }
}
