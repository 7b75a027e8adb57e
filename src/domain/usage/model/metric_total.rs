use std::ops::{Add, AddAssign};

use serde::Serialize;
use serde_json::{Number, Value};

/// Running total for one metric.
///
/// Stays an integer while every contribution is integral and falls back to
/// floating point as soon as a fractional value (or an overflow) appears.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricTotal {
    Int(i64),
    Float(f64),
}

impl Default for MetricTotal {
    fn default() -> Self {
        MetricTotal::Int(0)
    }
}

impl MetricTotal {
    /// Numeric JSON values only; booleans, strings and containers are not metrics.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::from_number(n)),
            _ => None,
        }
    }

    pub fn from_number(n: &Number) -> Self {
        match n.as_i64() {
            Some(i) => MetricTotal::Int(i),
            None => MetricTotal::Float(n.as_f64().unwrap_or(0.0)),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricTotal::Int(i) => i as f64,
            MetricTotal::Float(f) => f,
        }
    }
}

impl Add for MetricTotal {
    type Output = MetricTotal;

    fn add(self, rhs: MetricTotal) -> MetricTotal {
        match (self, rhs) {
            (MetricTotal::Int(a), MetricTotal::Int(b)) => match a.checked_add(b) {
                Some(sum) => MetricTotal::Int(sum),
                None => MetricTotal::Float(a as f64 + b as f64),
            },
            (a, b) => MetricTotal::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl AddAssign for MetricTotal {
    fn add_assign(&mut self, rhs: MetricTotal) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_stay_integers() {
        let mut total = MetricTotal::default();
        total += MetricTotal::from_json(&json!(100)).unwrap();
        total += MetricTotal::from_json(&json!(23)).unwrap();
        assert_eq!(total, MetricTotal::Int(123));
        assert_eq!(serde_json::to_string(&total).unwrap(), "123");
    }

    #[test]
    fn fraction_promotes_to_float() {
        let total = MetricTotal::Int(1) + MetricTotal::from_json(&json!(0.5)).unwrap();
        assert_eq!(total, MetricTotal::Float(1.5));
        assert_eq!(serde_json::to_string(&total).unwrap(), "1.5");
    }

    #[test]
    fn overflow_promotes_to_float() {
        let total = MetricTotal::Int(i64::MAX) + MetricTotal::Int(1);
        assert!(matches!(total, MetricTotal::Float(_)));
    }

    #[test]
    fn non_numbers_are_not_metrics() {
        assert_eq!(MetricTotal::from_json(&json!("gpt-4o")), None);
        assert_eq!(MetricTotal::from_json(&json!(true)), None);
        assert_eq!(MetricTotal::from_json(&json!(null)), None);
        assert_eq!(MetricTotal::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn large_unsigned_values_are_kept_as_float() {
        let v = MetricTotal::from_json(&json!(u64::MAX)).unwrap();
        assert!(matches!(v, MetricTotal::Float(_)));
    }
}
