//! Overlay replay binary.
//!
//! Reads a recorded session and prints one JSON line per frame:
//! `{"frame": n, "items": [...]}`.

use std::io::{self, BufWriter, Write};

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info};

use overlay_replay::{logging, ReplayConfig, ReplayError, ReplayScript, Replayer};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    if let Err(e) = logging::init_tracing(logging::json_requested()) {
        eprintln!("Failed to initialize tracing: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        error!("Replay failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ReplayConfig::from_env(std::env::args().skip(1))?;
    info!(input = %config.input.display(), "Starting overlay-replay");
    info!("Mapper config: {:?}", config.mapper);

    let metrics_handle = if config.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let script = ReplayScript::load(&config.input)
        .await
        .with_context(|| format!("loading {}", config.input.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = Replayer::new(config.mapper).run_with(&script, |output| {
        serde_json::to_writer(&mut out, &output)
            .map_err(|e| ReplayError::io("<stdout>", e.into()))?;
        writeln!(out).map_err(|e| ReplayError::io("<stdout>", e))?;
        Ok(())
    })?;
    out.flush().context("flushing stdout")?;

    if let Some(handle) = metrics_handle {
        eprint!("{}", handle.render());
    }

    info!(frames, "Replay finished");
    Ok(())
}

/// Install the Prometheus recorder so mapper counters can be rendered.
fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}
