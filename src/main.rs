//! Pod Race Engine - series runner
//!
//! Plays a batch of seeded matches between the configured built-in
//! strategies and prints the aggregated summary as JSON on stdout.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pod_race_engine::config::{Config, LogFormat};
use pod_race_engine::series::run_series;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level, config.log_format);

    info!(
        seed = config.match_seed,
        matches = config.match_count,
        max_turns = config.max_turns,
        "Starting Pod Race Engine"
    );

    let summary = run_series(&config).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
