use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::core::client::usage_api_client::UsageApi;
use crate::core::client::usage_endpoint::UsageEndpoint;
use crate::core::config::app_config::{AppConfig, WalkSettings};
use crate::core::persistence::raw_log::raw_log_fs_adapter_trait::RawLogFsAdapterTrait;
use crate::domain::usage::model::collection_report::{
    CollectionReport, EndpointOutcome, EndpointReport,
};
use crate::domain::usage::service::window_walker::WindowWalker;
use crate::errors::UsageError;

/// Which endpoints to collect and how.
#[derive(Debug, Clone)]
pub struct CollectPlan {
    pub endpoints: Vec<UsageEndpoint>,
    pub walk: WalkSettings,
    /// Record API failures per endpoint instead of aborting the run.
    pub isolate_endpoint_failures: bool,
}

impl CollectPlan {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            endpoints: cfg.endpoints.clone(),
            walk: cfg.walk_settings(),
            isolate_endpoint_failures: cfg.isolate_endpoint_failures,
        }
    }
}

/// Truncates the raw log and refills it from every planned endpoint, in order.
///
/// Unsupported endpoints are skipped. Any other API failure aborts the run
/// unless the plan isolates failures; raw log write errors always abort.
/// Records already written for a failing endpoint are left in the log.
pub async fn collect_all(
    api: &dyn UsageApi,
    log: &dyn RawLogFsAdapterTrait,
    plan: &CollectPlan,
    run_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CollectionReport> {
    let started_at = Utc::now();
    log.truncate()?;

    let mut endpoints = Vec::with_capacity(plan.endpoints.len());

    for &endpoint in &plan.endpoints {
        info!("⏳ Collecting {} …", endpoint);

        let mut records = 0usize;
        let result = collect_endpoint(api, log, endpoint, &plan.walk, now, &mut records).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) if plan.isolate_endpoint_failures && e.downcast_ref::<UsageError>().is_some() => {
                error!("❌ {} failed after {} record(s): {:#}", endpoint, records, e);
                EndpointOutcome::Failed {
                    records,
                    error: format!("{:#}", e),
                }
            }
            Err(e) => {
                return Err(e.context(format!(
                    "Collection aborted at endpoint {} after {} record(s)",
                    endpoint, records
                )))
            }
        };

        endpoints.push(EndpointReport { endpoint, outcome });
    }

    Ok(CollectionReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        days_back: plan.walk.days_back,
        endpoints,
    })
}

async fn collect_endpoint(
    api: &dyn UsageApi,
    log: &dyn RawLogFsAdapterTrait,
    endpoint: UsageEndpoint,
    walk: &WalkSettings,
    now: DateTime<Utc>,
    records: &mut usize,
) -> Result<EndpointOutcome> {
    let mut walker = WindowWalker::new(api, endpoint, walk, now);

    loop {
        match walker.next().await {
            Ok(Some(record)) => {
                log.append(&record)
                    .with_context(|| format!("Failed to append {} record to raw log", endpoint))?;
                *records += 1;
            }
            Ok(None) => break,
            Err(UsageError::EndpointUnsupported(_)) => {
                info!("{} endpoint not available for this organization, skipped", endpoint);
                return Ok(EndpointOutcome::Unsupported { records: *records });
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        "✅ {}: {} record(s) from {} page(s)",
        endpoint,
        records,
        walker.pages_fetched()
    );
    Ok(EndpointOutcome::Collected {
        records: *records,
        pages: walker.pages_fetched(),
    })
}
