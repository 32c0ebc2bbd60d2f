//! Tracing setup for the replay binary.
//!
//! Logs go to stderr so stdout stays reserved for overlay JSON lines.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Whether `LOG_FORMAT=json` is set.
pub fn json_requested() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false)
}

/// Install the global subscriber: colored text for dev, JSON for production.
pub fn init_tracing(use_json: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("overlay_replay=info".parse()?)
        .add_directive("overlay_mapper=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()?;
    }
    Ok(())
}
