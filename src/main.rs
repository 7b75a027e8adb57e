use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use usage_rollup::app_state::build_app_state;
use usage_rollup::core::config::app_config::AppConfig;
use usage_rollup::logging::init_tracing;
use usage_rollup::tasks::usage_run::{render, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = init_tracing(config.log_dir.as_deref())?;

    info!("Starting usage-rollup v{}", env!("CARGO_PKG_VERSION"));
    info!("Config: {:?}", config);

    let model_breakdown = config.model_breakdown;
    let state = build_app_state(config)?;

    match run(&state, Utc::now()).await {
        Ok(output) => {
            println!("{}", render(&output, model_breakdown)?);
            Ok(())
        }
        Err(e) => {
            error!("Usage run failed: {:#}", e);
            Err(e)
        }
    }
}
