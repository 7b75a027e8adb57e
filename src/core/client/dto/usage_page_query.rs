use crate::core::client::usage_endpoint::UsageEndpoint;

const MODEL_BUCKET_WIDTH: &str = "1d";
const MODEL_GROUP_BY: &str = "model";

/// Query parameters for one page request against a usage endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub start_time: i64,
    pub end_time: i64,
    pub limit: u32,
    pub page: Option<String>,
    pub project_ids: Vec<String>,
    pub bucket_width: Option<String>,
    pub group_by: Vec<String>,
}

impl PageQuery {
    pub fn for_window(
        endpoint: UsageEndpoint,
        start_time: i64,
        end_time: i64,
        limit: u32,
        project_ids: &[String],
    ) -> Self {
        let (bucket_width, group_by) = if endpoint.is_model_bucketed() {
            (
                Some(MODEL_BUCKET_WIDTH.to_string()),
                vec![MODEL_GROUP_BY.to_string()],
            )
        } else {
            (None, Vec::new())
        };

        Self {
            start_time,
            end_time,
            limit,
            page: None,
            project_ids: project_ids.to_vec(),
            bucket_width,
            group_by,
        }
    }

    pub fn with_page(mut self, page: Option<String>) -> Self {
        self.page = page;
        self
    }

    pub fn has_model_grouping(&self) -> bool {
        !self.group_by.is_empty()
    }

    /// Same query with `bucket_width` and `group_by` removed.
    pub fn without_model_grouping(&self) -> Self {
        Self {
            bucket_width: None,
            group_by: Vec::new(),
            ..self.clone()
        }
    }

    /// Flattened `(name, value)` pairs; list parameters repeat their key.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start_time", self.start_time.to_string()),
            ("end_time", self.end_time.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(page) = &self.page {
            pairs.push(("page", page.clone()));
        }
        for id in &self.project_ids {
            pairs.push(("project_ids", id.clone()));
        }
        if let Some(width) = &self.bucket_width {
            pairs.push(("bucket_width", width.clone()));
        }
        for group in &self.group_by {
            pairs.push(("group_by", group.clone()));
        }
        pairs
    }
}
