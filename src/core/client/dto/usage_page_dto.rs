use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One usage bucket as returned in the `data` array of a usage page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageBucket {
    /// Window start, epoch seconds.
    pub start_time: i64,
    /// Window end, epoch seconds.
    pub end_time: i64,
    /// Rows of metric name → numeric value or dimension value.
    pub results: Vec<Map<String, Value>>,
    /// Any other field the API sends (`object`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UsageBucket {
    pub fn new(start_time: i64, end_time: i64, results: Vec<Map<String, Value>>) -> Self {
        Self {
            start_time,
            end_time,
            results,
            extra: Map::new(),
        }
    }
}

/// A single page of a usage listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse {
    #[serde(default)]
    pub data: Vec<UsageBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

impl PaginatedResponse {
    /// Cursor for the following page; an empty token ends pagination too.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|p| !p.is_empty())
    }
}
