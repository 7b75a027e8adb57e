//! Shared fakes for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::core::client::dto::usage_page_dto::{PaginatedResponse, UsageBucket};
use crate::core::client::dto::usage_page_query::PageQuery;
use crate::core::client::usage_api_client::{FetchOutcome, UsageApi};
use crate::core::client::usage_endpoint::UsageEndpoint;
use crate::errors::UsageError;

/// Canned reply for one call to [`ScriptedUsageApi::fetch_page`].
#[derive(Debug, Clone)]
pub enum Reply {
    Outcome(FetchOutcome),
    Status(StatusCode),
}

impl Reply {
    pub fn page(data: Vec<UsageBucket>, next_page: Option<&str>) -> Self {
        Reply::Outcome(FetchOutcome::Page(PaginatedResponse {
            data,
            next_page: next_page.map(str::to_string),
        }))
    }

    pub fn unsupported() -> Self {
        Reply::Outcome(FetchOutcome::Unsupported)
    }

    pub fn bad_request() -> Self {
        Reply::Outcome(FetchOutcome::BadRequest {
            body: "invalid group_by".into(),
        })
    }
}

/// Replays scripted replies per endpoint and records every query it sees.
/// Once an endpoint's script runs out it answers with empty last pages.
#[derive(Default)]
pub struct ScriptedUsageApi {
    replies: Mutex<HashMap<UsageEndpoint, VecDeque<Reply>>>,
    calls: Mutex<Vec<(UsageEndpoint, PageQuery)>>,
}

impl ScriptedUsageApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, endpoint: UsageEndpoint, replies: Vec<Reply>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .extend(replies);
        self
    }

    pub fn calls(&self) -> Vec<(UsageEndpoint, PageQuery)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, endpoint: UsageEndpoint) -> Vec<PageQuery> {
        self.calls()
            .into_iter()
            .filter(|(ep, _)| *ep == endpoint)
            .map(|(_, q)| q)
            .collect()
    }
}

#[async_trait]
impl UsageApi for ScriptedUsageApi {
    async fn fetch_page(
        &self,
        endpoint: UsageEndpoint,
        query: &PageQuery,
    ) -> Result<FetchOutcome, UsageError> {
        self.calls.lock().unwrap().push((endpoint, query.clone()));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Reply::page(vec![], None));

        match reply {
            Reply::Outcome(outcome) => Ok(outcome),
            Reply::Status(status) => Err(UsageError::RequestRejected {
                endpoint,
                status,
                body: String::new(),
            }),
        }
    }
}

/// Bucket with a single result row built from a JSON object literal.
pub fn bucket(start_time: i64, row: Value) -> UsageBucket {
    let row: Map<String, Value> = row.as_object().cloned().unwrap_or_default();
    UsageBucket::new(start_time, start_time + 86_400, vec![row])
}
