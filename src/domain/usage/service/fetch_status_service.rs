use chrono::{DateTime, Duration, Utc};

use crate::core::client::usage_endpoint::UsageEndpoint;
use crate::core::persistence::fetch_status::fetch_status_entity::FetchStatusEntity;
use crate::domain::usage::model::collection_report::CollectionReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    Fetch { reason: String },
    Skip { reason: String },
}

impl FetchDecision {
    pub fn should_fetch(&self) -> bool {
        matches!(self, FetchDecision::Fetch { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            FetchDecision::Fetch { reason } | FetchDecision::Skip { reason } => reason,
        }
    }
}

/// Decides whether a new collection run is needed.
///
/// Without a refresh interval every run collects. With one, a status younger
/// than the interval skips collection unless `force` is set.
pub fn decide_fetch(
    status: Option<&FetchStatusEntity>,
    now: DateTime<Utc>,
    refresh_interval_hours: Option<u64>,
    force: bool,
) -> FetchDecision {
    let fetch = |reason: &str| FetchDecision::Fetch {
        reason: reason.to_string(),
    };

    if force {
        return fetch("Forced refresh");
    }
    let Some(hours) = refresh_interval_hours else {
        return fetch("No refresh interval configured");
    };
    let Some(status) = status else {
        return fetch("No previous fetch recorded");
    };

    let interval = i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .unwrap_or(Duration::MAX);
    let age = now - status.last_fetched;
    if age >= interval {
        FetchDecision::Fetch {
            reason: format!("Data is more than {}h old", hours),
        }
    } else {
        FetchDecision::Skip {
            reason: format!(
                "Data is recent (fetched {} min ago, interval {}h)",
                age.num_minutes(),
                hours
            ),
        }
    }
}

pub fn status_from_report(report: &CollectionReport) -> FetchStatusEntity {
    FetchStatusEntity {
        run_id: report.run_id,
        last_fetched: report.finished_at,
        days_back: report.days_back,
        endpoints_fetched: endpoint_names(report.fetched()),
        endpoints_unsupported: endpoint_names(report.unsupported()),
        endpoints_failed: endpoint_names(report.failed()),
        total_records: report.total_records(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn endpoint_names(endpoints: Vec<UsageEndpoint>) -> Vec<String> {
    endpoints.iter().map(|ep| ep.as_str().to_string()).collect()
}
