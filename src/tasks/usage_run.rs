use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::domain::usage::model::collection_report::CollectionReport;
use crate::domain::usage::service::collector_service::{collect_all, CollectPlan};
use crate::domain::usage::service::fetch_status_service::{decide_fetch, status_from_report};
use crate::domain::usage::service::rollup_service::{rollup_log, UsageRollup};

/// Result of one full run: optional collection followed by the rollup.
#[derive(Debug)]
pub struct RunOutput {
    pub run_id: Uuid,
    /// `None` when a recent fetch made collection unnecessary.
    pub collection: Option<CollectionReport>,
    pub skip_reason: Option<String>,
    pub rollup: UsageRollup,
}

/// Collects every configured endpoint into the raw log, then rolls it up.
pub async fn run(state: &AppState, now: DateTime<Utc>) -> Result<RunOutput> {
    let run_id = Uuid::new_v4();
    run_with_id(state, now, run_id)
        .instrument(info_span!("usage_run", %run_id))
        .await
}

async fn run_with_id(state: &AppState, now: DateTime<Utc>, run_id: Uuid) -> Result<RunOutput> {
    let cfg = &state.config;

    let previous = match state.fetch_status.read() {
        Ok(status) => status,
        Err(e) => {
            warn!("Ignoring unreadable fetch status {:?}: {:#}", state.fetch_status.path(), e);
            None
        }
    };
    let decision = decide_fetch(
        previous.as_ref(),
        now,
        cfg.refresh_interval_hours,
        cfg.force_refresh,
    );

    let (collection, skip_reason) = if decision.should_fetch() {
        info!(
            "Collecting {} endpoint(s) over the last {} day(s): {}",
            cfg.endpoints.len(),
            cfg.days_back,
            decision.reason()
        );
        // status only describes a complete raw log
        state
            .fetch_status
            .clear()
            .context("Failed to invalidate previous fetch status")?;
        let plan = CollectPlan::from_config(cfg);
        let report = collect_all(
            state.usage_api.as_ref(),
            state.raw_log.as_ref(),
            &plan,
            run_id,
            now,
        )
        .await?;

        info!(
            "Collected {} record(s); skipped {:?}; failed {:?}",
            report.total_records(),
            report.unsupported(),
            report.failed()
        );
        if let Err(e) = state.fetch_status.write(&status_from_report(&report)) {
            warn!("Failed to record fetch status: {:#}", e);
        }
        (Some(report), None)
    } else {
        info!("Skipping collection: {}", decision.reason());
        (None, Some(decision.reason().to_string()))
    };

    let rollup = rollup_log(state.raw_log.as_ref()).context("Rollup of raw usage log failed")?;
    info!("Rolled up {} record(s)", rollup.records);

    Ok(RunOutput {
        run_id,
        collection,
        skip_reason,
        rollup,
    })
}

/// Pretty JSON for stdout. With the breakdown requested, both maps go into a
/// single `{"summary": .., "by_model": ..}` document.
pub fn render(output: &RunOutput, with_model_breakdown: bool) -> Result<String> {
    let rendered = if with_model_breakdown {
        serde_json::to_string_pretty(&json!({
            "summary": output.rollup.summary,
            "by_model": output.rollup.by_model,
        }))?
    } else {
        serde_json::to_string_pretty(&output.rollup.summary)?
    };
    Ok(rendered)
}
