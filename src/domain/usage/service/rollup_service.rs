use std::io::BufRead;

use anyhow::Result;
use chrono::DateTime;
use serde_json::Value;
use tracing::debug;

use crate::core::persistence::raw_log::raw_log_fs_adapter_trait::RawLogFsAdapterTrait;
use crate::core::persistence::raw_log::usage_record_entity::UsageRecord;
use crate::domain::usage::model::metric_total::MetricTotal;
use crate::domain::usage::model::usage_summary::{ModelBreakdown, UsageSummary};
use crate::errors::UsageError;

const MODEL_DIMENSION: &str = "model";

/// Aggregates built from one pass over the raw log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageRollup {
    pub summary: UsageSummary,
    pub by_model: ModelBreakdown,
    pub records: usize,
}

impl UsageRollup {
    /// Folds every numeric field of every result row into the totals.
    /// Returns `None` when `start_time` cannot be mapped to a calendar date.
    pub fn fold(&mut self, record: &UsageRecord) -> Option<()> {
        let date = record_date(record.bucket.start_time)?;

        for row in &record.bucket.results {
            let model = row.get(MODEL_DIMENSION).and_then(Value::as_str);

            for (metric, value) in row {
                let Some(amount) = MetricTotal::from_json(value) else {
                    continue;
                };
                self.summary.add(&record.endpoint, &date, metric, amount);
                if let Some(model) = model {
                    self.by_model.add(&record.endpoint, &date, model, metric, amount);
                }
            }
        }

        self.records += 1;
        Some(())
    }
}

/// UTC calendar day (`YYYY-MM-DD`) of an epoch-seconds timestamp.
pub fn record_date(start_time: i64) -> Option<String> {
    DateTime::from_timestamp(start_time, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Reads JSON lines until EOF and folds them. Any unparsable line aborts the rollup.
pub fn rollup_reader<R: BufRead>(reader: R) -> Result<UsageRollup, UsageError> {
    let mut rollup = UsageRollup::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: UsageRecord =
            serde_json::from_str(&line).map_err(|e| UsageError::MalformedLogRecord {
                line: line_no,
                reason: e.to_string(),
            })?;

        rollup
            .fold(&record)
            .ok_or_else(|| UsageError::MalformedLogRecord {
                line: line_no,
                reason: format!("start_time {} is out of range", record.bucket.start_time),
            })?;
    }

    debug!("Rolled up {} raw usage record(s)", rollup.records);
    Ok(rollup)
}

/// Rolls up the whole raw log behind `log`.
pub fn rollup_log(log: &dyn RawLogFsAdapterTrait) -> Result<UsageRollup> {
    let reader = log.open_reader()?;
    Ok(rollup_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persistence::raw_log::raw_log_fs_adapter::RawLogFsAdapter;
    use serde_json::json;
    use std::io::Cursor;

    // 2024-01-01T00:00:00Z
    const JAN_1: i64 = 1_704_067_200;

    fn line(endpoint: &str, start_time: i64, results: Value) -> String {
        json!({
            "endpoint": endpoint,
            "object": "bucket",
            "start_time": start_time,
            "end_time": start_time + 86_400,
            "results": results,
        })
        .to_string()
    }

    fn rollup_lines(lines: &[String]) -> Result<UsageRollup, UsageError> {
        rollup_reader(Cursor::new(lines.join("\n")))
    }

    #[test]
    fn sums_numeric_fields_per_endpoint_date_and_metric() {
        let lines = vec![
            line("completions", JAN_1, json!([{"input_tokens": 100, "output_tokens": 4}])),
            line("completions", JAN_1 + 3600, json!([{"input_tokens": 50}])),
            line("completions", JAN_1 + 86_400, json!([{"input_tokens": 1}])),
            line("images", JAN_1, json!([{"images": 2}, {"images": 3}])),
        ];
        let rollup = rollup_lines(&lines).unwrap();

        assert_eq!(rollup.records, 4);
        assert_eq!(
            serde_json::to_value(&rollup.summary).unwrap(),
            json!({
                "completions": {
                    "2024-01-01": {"input_tokens": 150, "output_tokens": 4},
                    "2024-01-02": {"input_tokens": 1}
                },
                "images": {"2024-01-01": {"images": 5}}
            })
        );
    }

    #[test]
    fn categorical_fields_are_ignored() {
        let lines = vec![line(
            "ep",
            JAN_1,
            json!([{"model": "gpt-x", "requests": 5, "batch": false, "project_id": null}]),
        )];
        let rollup = rollup_lines(&lines).unwrap();

        let day = rollup.summary.day("ep", "2024-01-01").unwrap();
        assert_eq!(day.get("requests"), Some(&MetricTotal::Int(5)));
        assert!(!day.contains_key("model"));
        assert!(!day.contains_key("batch"));
        assert!(!day.contains_key("project_id"));
        assert_eq!(day.len(), 1);
    }

    #[test]
    fn empty_results_create_no_entries() {
        let rollup = rollup_lines(&[line("ep", JAN_1, json!([]))]).unwrap();
        assert!(rollup.summary.is_empty());
        assert_eq!(rollup.records, 1);
    }

    #[test]
    fn shuffled_log_gives_identical_summary() {
        let lines: Vec<String> = (0..12)
            .map(|i| {
                line(
                    if i % 3 == 0 { "embeddings" } else { "completions" },
                    JAN_1 + (i % 4) * 86_400,
                    json!([{"input_tokens": i * 7 + 1, "num_model_requests": 1}]),
                )
            })
            .collect();

        let forward = rollup_lines(&lines).unwrap();

        let mut reversed = lines.clone();
        reversed.reverse();
        let mut interleaved: Vec<String> = lines.iter().step_by(2).cloned().collect();
        interleaved.extend(lines.iter().skip(1).step_by(2).cloned());

        assert_eq!(rollup_lines(&reversed).unwrap().summary, forward.summary);
        assert_eq!(rollup_lines(&interleaved).unwrap().summary, forward.summary);
    }

    #[test]
    fn model_breakdown_only_covers_rows_with_a_model() {
        let lines = vec![line(
            "completions",
            JAN_1,
            json!([
                {"model": "gpt-4o", "input_tokens": 10},
                {"model": "gpt-4o-mini", "input_tokens": 3},
                {"input_tokens": 1}
            ]),
        )];
        let rollup = rollup_lines(&lines).unwrap();

        assert_eq!(
            rollup.summary.get("completions", "2024-01-01", "input_tokens"),
            Some(MetricTotal::Int(14))
        );
        assert_eq!(
            rollup.by_model.get("completions", "2024-01-01", "gpt-4o", "input_tokens"),
            Some(MetricTotal::Int(10))
        );
        assert_eq!(
            rollup.by_model.get("completions", "2024-01-01", "gpt-4o-mini", "input_tokens"),
            Some(MetricTotal::Int(3))
        );
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let lines = vec![
            line("ep", JAN_1, json!([{"requests": 1}])),
            "{\"endpoint\": \"ep\", \"start_time\": 1}".to_string(),
        ];
        let err = rollup_lines(&lines).unwrap_err();
        assert!(matches!(err, UsageError::MalformedLogRecord { line: 2, .. }));

        let err = rollup_lines(&["not json".to_string()]).unwrap_err();
        assert!(matches!(err, UsageError::MalformedLogRecord { line: 1, .. }));
    }

    #[test]
    fn out_of_range_start_time_is_malformed() {
        let huge = json!({
            "endpoint": "ep",
            "start_time": i64::MAX - 1,
            "end_time": i64::MAX,
            "results": []
        })
        .to_string();
        let err = rollup_lines(&[huge]).unwrap_err();
        assert!(matches!(err, UsageError::MalformedLogRecord { line: 1, .. }));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = format!("\n{}\n\n", line("ep", JAN_1, json!([{"requests": 2}])));
        let rollup = rollup_reader(Cursor::new(text)).unwrap();
        assert_eq!(rollup.summary.get("ep", "2024-01-01", "requests"), Some(MetricTotal::Int(2)));
    }

    #[test]
    fn record_date_is_utc() {
        assert_eq!(record_date(JAN_1).as_deref(), Some("2024-01-01"));
        assert_eq!(record_date(JAN_1 - 1).as_deref(), Some("2023-12-31"));
    }

    #[test]
    fn rolls_up_file_backed_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");
        std::fs::write(
            &path,
            format!("{}\n", line("ep", JAN_1, json!([{"input_tokens": 9}]))),
        )
        .unwrap();

        let rollup = rollup_log(&RawLogFsAdapter::new(path)).unwrap();
        assert_eq!(rollup.summary.get("ep", "2024-01-01", "input_tokens"), Some(MetricTotal::Int(9)));
    }
}
