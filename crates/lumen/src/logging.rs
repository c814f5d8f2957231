//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem at `level` for Lumen's own crates.
///
/// Logs go to stderr so the verdict on stdout stays machine-readable.
/// `RUST_LOG` overrides the computed filter.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section, with CLI flags taking precedence.
pub fn init_from_config(config: &lumen_core::Config, verbose: bool, json_logs: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.to_ascii_lowercase()
    };
    let json_format = json_logs || config.logging.format.eq_ignore_ascii_case("json");
    init(&level, json_format);
}

/// Dependencies stay at `warn`; only Lumen's crates follow `level`.
fn default_directive(level: &str) -> String {
    let level = match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => "info",
    };
    format!("warn,lumen={level},lumen_core={level}")
}
