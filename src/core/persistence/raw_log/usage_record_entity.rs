use serde::{Deserialize, Serialize};

use crate::core::client::dto::usage_page_dto::UsageBucket;
use crate::core::client::usage_endpoint::UsageEndpoint;

/// One raw log line: a usage bucket tagged with the endpoint it came from.
///
/// The endpoint is kept as a plain string so logs written with a different
/// endpoint set still roll up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub endpoint: String,
    #[serde(flatten)]
    pub bucket: UsageBucket,
}

impl UsageRecord {
    pub fn new(endpoint: UsageEndpoint, bucket: UsageBucket) -> Self {
        Self {
            endpoint: endpoint.as_str().to_string(),
            bucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_single_flat_object() {
        let bucket: UsageBucket = serde_json::from_value(json!({
            "object": "bucket",
            "start_time": 1704067200,
            "end_time": 1704153600,
            "results": [{"input_tokens": 100}]
        }))
        .unwrap();
        let record = UsageRecord::new(UsageEndpoint::Completions, bucket);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "endpoint": "completions",
                "object": "bucket",
                "start_time": 1704067200,
                "end_time": 1704153600,
                "results": [{"input_tokens": 100}]
            })
        );

        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains('\n'));
        let back: UsageRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);
    }
}
