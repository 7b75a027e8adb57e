use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::core::client::dto::usage_page_dto::{PaginatedResponse, UsageBucket};
use crate::core::client::dto::usage_page_query::PageQuery;
use crate::core::client::usage_api_client::{FetchOutcome, UsageApi};
use crate::core::client::usage_endpoint::UsageEndpoint;
use crate::core::config::app_config::WalkSettings;
use crate::core::persistence::raw_log::usage_record_entity::UsageRecord;
use crate::core::util::time_util::{BackwardWindows, TimeWindow};
use crate::errors::UsageError;

/// Pull cursor over every usage bucket of one endpoint.
///
/// Windows are walked newest first; inside a window the `next_page` cursor is
/// followed until the API stops returning one. Network calls only happen inside
/// [`WindowWalker::next`]. After it returns `Ok(None)` or an error the walker
/// stays exhausted.
pub struct WindowWalker<'a> {
    api: &'a dyn UsageApi,
    endpoint: UsageEndpoint,
    settings: &'a WalkSettings,
    windows: BackwardWindows,
    current: Option<TimeWindow>,
    cursor: Option<String>,
    buffered: VecDeque<UsageBucket>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> WindowWalker<'a> {
    pub fn new(
        api: &'a dyn UsageApi,
        endpoint: UsageEndpoint,
        settings: &'a WalkSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            api,
            endpoint,
            settings,
            windows: BackwardWindows::days(now, settings.days_back, settings.window_days),
            current: None,
            cursor: None,
            buffered: VecDeque::new(),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Next record in arrival order, or `Ok(None)` once every window is drained.
    pub async fn next(&mut self) -> Result<Option<UsageRecord>, UsageError> {
        loop {
            if let Some(bucket) = self.buffered.pop_front() {
                return Ok(Some(UsageRecord::new(self.endpoint, bucket)));
            }
            if self.exhausted {
                return Ok(None);
            }

            let window = match self.current {
                Some(window) => window,
                None => match self.windows.next() {
                    Some(window) => {
                        debug!(
                            endpoint = %self.endpoint,
                            "Fetching window {} → {}",
                            window.start,
                            window.end
                        );
                        self.current = Some(window);
                        self.cursor = None;
                        window
                    }
                    None => {
                        self.exhausted = true;
                        return Ok(None);
                    }
                },
            };

            let query = PageQuery::for_window(
                self.endpoint,
                window.start_ts(),
                window.end_ts(),
                self.settings.page_limit,
                &self.settings.project_ids,
            )
            .with_page(self.cursor.take());

            let page = match self.fetch_with_fallback(&query).await {
                Ok(page) => page,
                Err(e) => {
                    self.exhausted = true;
                    self.current = None;
                    return Err(e);
                }
            };
            self.pages_fetched += 1;

            match page.next_cursor() {
                Some(token) => self.cursor = Some(token.to_string()),
                None => self.current = None,
            }
            self.buffered.extend(page.data);
        }
    }

    /// Drains the walker into a vector. Mostly useful for small horizons and tests.
    pub async fn collect_remaining(&mut self) -> Result<Vec<UsageRecord>, UsageError> {
        let mut out = Vec::new();
        while let Some(record) = self.next().await? {
            out.push(record);
        }
        Ok(out)
    }

    async fn fetch_with_fallback(&self, query: &PageQuery) -> Result<PaginatedResponse, UsageError> {
        match self.api.fetch_page(self.endpoint, query).await? {
            FetchOutcome::Page(page) => Ok(page),
            FetchOutcome::Unsupported => Err(UsageError::EndpointUnsupported(self.endpoint)),
            FetchOutcome::BadRequest { body } if query.has_model_grouping() => {
                warn!(
                    endpoint = %self.endpoint,
                    "Model grouping rejected ({}), retrying without bucket_width/group_by",
                    body
                );
                let retry = query.without_model_grouping();
                match self.api.fetch_page(self.endpoint, &retry).await? {
                    FetchOutcome::Page(page) => Ok(page),
                    FetchOutcome::Unsupported => Err(self.rejected(StatusCode::NOT_FOUND, String::new())),
                    FetchOutcome::BadRequest { body } => Err(self.rejected(StatusCode::BAD_REQUEST, body)),
                }
            }
            FetchOutcome::BadRequest { body } => Err(self.rejected(StatusCode::BAD_REQUEST, body)),
        }
    }

    fn rejected(&self, status: StatusCode, body: String) -> UsageError {
        UsageError::RequestRejected {
            endpoint: self.endpoint,
            status,
            body,
        }
    }
}
