use std::sync::Arc;

use anyhow::Result;

use crate::core::client::usage_api_client::{HttpUsageApiClient, UsageApi};
use crate::core::config::app_config::AppConfig;
use crate::core::persistence::fetch_status::fetch_status_fs_adapter::FetchStatusFsAdapter;
use crate::core::persistence::raw_log::raw_log_fs_adapter::RawLogFsAdapter;
use crate::core::persistence::raw_log::raw_log_fs_adapter_trait::RawLogFsAdapterTrait;

/// Everything a run needs, wired once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub usage_api: Arc<dyn UsageApi>,
    pub raw_log: Arc<dyn RawLogFsAdapterTrait>,
    pub fetch_status: Arc<FetchStatusFsAdapter>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        usage_api: Arc<dyn UsageApi>,
        raw_log: Arc<dyn RawLogFsAdapterTrait>,
        fetch_status: FetchStatusFsAdapter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            usage_api,
            raw_log,
            fetch_status: Arc::new(fetch_status),
        }
    }
}

/// Production wiring: reqwest client plus file-backed raw log and status.
pub fn build_app_state(config: AppConfig) -> Result<AppState> {
    let usage_api = Arc::new(HttpUsageApiClient::from_config(&config)?);
    let raw_log = Arc::new(RawLogFsAdapter::new(config.out_file.clone()));
    let fetch_status = FetchStatusFsAdapter::new(config.status_file.clone());

    Ok(AppState::new(config, usage_api, raw_log, fetch_status))
}
