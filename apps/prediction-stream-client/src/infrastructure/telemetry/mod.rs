//! Tracing Subscriber Setup
//!
//! Installs a `fmt` subscriber filtered by `RUST_LOG`, with quiet defaults
//! for the HTTP stack.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Standard filter directives (e.g. `prediction_stream_client=debug`)
//! - `LOG_FORMAT`: Set to "compact" for single-line output (default: full)
//!
//! # Usage
//!
//! ```ignore
//! use prediction_stream_client::infrastructure::telemetry;
//!
//! telemetry::init();
//! tracing::info!("Client started");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default directive for this crate.
const DEFAULT_DIRECTIVE: &str = "prediction_stream_client=info";

/// Log output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-field output with targets.
    #[default]
    Full,
    /// Single-line output.
    Compact,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Output layout.
    pub format: LogFormat,
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let format = match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("compact") => LogFormat::Compact,
            _ => LogFormat::Full,
        };
        Self { format }
    }
}

/// Initialize telemetry with configuration from environment.
pub fn init() {
    init_with_config(&TelemetryConfig::from_env());
}

/// Build the log filter from a `RUST_LOG` value.
///
/// The crate default applies only when `rust_log` is unset, blank or
/// invalid. The HTTP stack is always capped at `warn`.
#[allow(clippy::expect_used)]
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    let base = rust_log
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| match EnvFilter::try_new(v) {
            Ok(filter) => Some(filter),
            Err(e) => {
                eprintln!("Ignoring invalid RUST_LOG '{v}': {e}");
                None
            }
        })
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE));

    base.add_directive(
        "reqwest=warn"
            .parse()
            .expect("static directive 'reqwest=warn' is valid"),
    )
    .add_directive(
        "hyper=warn"
            .parse()
            .expect("static directive 'hyper=warn' is valid"),
    )
}

/// Initialize telemetry with custom configuration.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_with_config(config: &TelemetryConfig) {
    let env_filter = env_filter(std::env::var("RUST_LOG").ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Full => registry.with(fmt_layer).try_init(),
        LogFormat::Compact => registry.with(fmt_layer.compact()).try_init(),
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {e}");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.format, LogFormat::Full);
    }

    #[test]
    fn default_directive_parses() {
        assert!(DEFAULT_DIRECTIVE.parse::<tracing_subscriber::filter::Directive>().is_ok());
    }

    #[test]
    fn rust_log_can_raise_crate_level() {
        let filter = env_filter(Some("prediction_stream_client=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        let rendered = filter.to_string().to_lowercase();
        assert!(rendered.contains("prediction_stream_client=debug"));
        assert!(!rendered.contains("prediction_stream_client=info"));
    }

    #[test]
    fn crate_default_without_rust_log() {
        for rust_log in [None, Some(""), Some("   ")] {
            let filter = env_filter(rust_log);
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
            assert!(filter.to_string().to_lowercase().contains(DEFAULT_DIRECTIVE));
        }
    }

    #[test]
    fn invalid_rust_log_falls_back_to_default() {
        let filter = env_filter(Some("prediction_stream_client=loud"));
        assert!(filter.to_string().to_lowercase().contains(DEFAULT_DIRECTIVE));
    }

    #[test]
    fn http_stack_stays_quiet() {
        let rendered = env_filter(Some("debug")).to_string().to_lowercase();
        assert!(rendered.contains("reqwest=warn"));
        assert!(rendered.contains("hyper=warn"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_with_config(&TelemetryConfig::default());
        init_with_config(&TelemetryConfig {
            format: LogFormat::Compact,
        });
    }
}
