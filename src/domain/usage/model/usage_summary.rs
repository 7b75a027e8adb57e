use std::collections::BTreeMap;

use serde::Serialize;

use super::metric_total::MetricTotal;

pub type MetricTotals = BTreeMap<String, MetricTotal>;

/// `endpoint → date (YYYY-MM-DD) → metric → total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UsageSummary(BTreeMap<String, BTreeMap<String, MetricTotals>>);

impl UsageSummary {
    pub fn add(&mut self, endpoint: &str, date: &str, metric: &str, value: MetricTotal) {
        let slot = self
            .0
            .entry(endpoint.to_string())
            .or_default()
            .entry(date.to_string())
            .or_default()
            .entry(metric.to_string())
            .or_default();
        *slot += value;
    }

    pub fn get(&self, endpoint: &str, date: &str, metric: &str) -> Option<MetricTotal> {
        self.0.get(endpoint)?.get(date)?.get(metric).copied()
    }

    pub fn day(&self, endpoint: &str, date: &str) -> Option<&MetricTotals> {
        self.0.get(endpoint)?.get(date)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `endpoint → date → model → metric → total`, for rows that name a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModelBreakdown(BTreeMap<String, BTreeMap<String, BTreeMap<String, MetricTotals>>>);

impl ModelBreakdown {
    pub fn add(&mut self, endpoint: &str, date: &str, model: &str, metric: &str, value: MetricTotal) {
        let slot = self
            .0
            .entry(endpoint.to_string())
            .or_default()
            .entry(date.to_string())
            .or_default()
            .entry(model.to_string())
            .or_default()
            .entry(metric.to_string())
            .or_default();
        *slot += value;
    }

    pub fn get(&self, endpoint: &str, date: &str, model: &str, metric: &str) -> Option<MetricTotal> {
        self.0.get(endpoint)?.get(date)?.get(model)?.get(metric).copied()
    }
}
