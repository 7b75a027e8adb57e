use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::client::usage_endpoint::UsageEndpoint;

/// What happened to one endpoint during collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EndpointOutcome {
    Collected { records: usize, pages: usize },
    /// 404 from the API; anything written before it stays in the log.
    Unsupported { records: usize },
    /// Only produced when endpoint failures are isolated.
    Failed { records: usize, error: String },
}

impl EndpointOutcome {
    pub fn records(&self) -> usize {
        match self {
            EndpointOutcome::Collected { records, .. }
            | EndpointOutcome::Unsupported { records }
            | EndpointOutcome::Failed { records, .. } => *records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointReport {
    pub endpoint: UsageEndpoint,
    #[serde(flatten)]
    pub outcome: EndpointOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub days_back: u32,
    pub endpoints: Vec<EndpointReport>,
}

impl CollectionReport {
    pub fn total_records(&self) -> usize {
        self.endpoints.iter().map(|r| r.outcome.records()).sum()
    }

    pub fn fetched(&self) -> Vec<UsageEndpoint> {
        self.filter(|o| matches!(o, EndpointOutcome::Collected { .. }))
    }

    pub fn unsupported(&self) -> Vec<UsageEndpoint> {
        self.filter(|o| matches!(o, EndpointOutcome::Unsupported { .. }))
    }

    pub fn failed(&self) -> Vec<UsageEndpoint> {
        self.filter(|o| matches!(o, EndpointOutcome::Failed { .. }))
    }

    pub fn outcome_for(&self, endpoint: UsageEndpoint) -> Option<&EndpointOutcome> {
        self.endpoints
            .iter()
            .find(|r| r.endpoint == endpoint)
            .map(|r| &r.outcome)
    }

    fn filter(&self, pred: impl Fn(&EndpointOutcome) -> bool) -> Vec<UsageEndpoint> {
        self.endpoints
            .iter()
            .filter(|r| pred(&r.outcome))
            .map(|r| r.endpoint)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn totals_and_groupings() {
        let now = Utc::now();
        let report = CollectionReport {
            run_id: Uuid::nil(),
            started_at: now,
            finished_at: now,
            days_back: 7,
            endpoints: vec![
                EndpointReport {
                    endpoint: UsageEndpoint::Completions,
                    outcome: EndpointOutcome::Collected { records: 4, pages: 2 },
                },
                EndpointReport {
                    endpoint: UsageEndpoint::VectorStores,
                    outcome: EndpointOutcome::Unsupported { records: 0 },
                },
                EndpointReport {
                    endpoint: UsageEndpoint::Images,
                    outcome: EndpointOutcome::Failed {
                        records: 1,
                        error: "500".into(),
                    },
                },
            ],
        };

        assert_eq!(report.total_records(), 5);
        assert_eq!(report.fetched(), vec![UsageEndpoint::Completions]);
        assert_eq!(report.unsupported(), vec![UsageEndpoint::VectorStores]);
        assert_eq!(report.failed(), vec![UsageEndpoint::Images]);
        assert_eq!(
            serde_json::to_value(&report.endpoints[1]).unwrap(),
            json!({"endpoint": "vector_stores", "status": "unsupported", "records": 0})
        );
    }
}
