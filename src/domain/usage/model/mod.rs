pub mod metric_total;
pub mod usage_summary;
pub mod collection_report;
