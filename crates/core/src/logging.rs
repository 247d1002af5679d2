//! Tracing setup for the lexguide binaries.
//!
//! Diagnostics go to stderr; the CLI prints answers and `--json` payloads on
//! stdout, so the two streams can be piped separately.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Filter used when neither a level nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "info";

/// Set to `json` to emit one JSON object per event.
pub const LOG_FORMAT_ENV: &str = "LEXGUIDE_LOG_FORMAT";

/// Install the global subscriber.
///
/// `log_level` takes precedence over `RUST_LOG`. Pipeline queries are logged
/// at `info`; retrieval and prompt details at `debug`.
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let env_level = std::env::var("RUST_LOG").ok();
    let filter = build_filter(log_level.or(env_level.as_deref()))?;
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(!no_color && std::env::var_os("NO_COLOR").is_none()),
            )
            .try_init()
    };

    result.map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))
}

/// Parse a filter directive such as `debug` or `lexguide_engine=trace`.
pub fn build_filter(directive: Option<&str>) -> AppResult<EnvFilter> {
    let directive = directive.map(str::trim).filter(|d| !d.is_empty());
    EnvFilter::try_new(directive.unwrap_or(DEFAULT_FILTER))
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_config_error() {
        let result = build_filter(Some("lexguide=notalevel"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_filter_defaults_to_info() {
        assert!(build_filter(None).unwrap().to_string().contains("info"));
        assert!(build_filter(Some("  ")).unwrap().to_string().contains("info"));
    }

    #[test]
    fn test_per_crate_directive() {
        let filter = build_filter(Some("warn,lexguide_engine=debug")).unwrap();
        assert!(filter.to_string().contains("lexguide_engine=debug"));
    }
}
