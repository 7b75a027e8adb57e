use reqwest::StatusCode;
use thiserror::Error;

use crate::core::client::usage_endpoint::UsageEndpoint;

/// Failures raised while walking the usage API or rolling up the raw log.
#[derive(Debug, Error)]
pub enum UsageError {
    /// The organization has no access to this endpoint (HTTP 404).
    #[error("endpoint {0} is not available for this organization")]
    EndpointUnsupported(UsageEndpoint),

    #[error("{endpoint} request failed with {status}: {body}")]
    RequestRejected {
        endpoint: UsageEndpoint,
        status: StatusCode,
        body: String,
    },

    #[error("{endpoint} request could not be sent: {source}")]
    Transport {
        endpoint: UsageEndpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} response could not be decoded: {source}")]
    Decode {
        endpoint: UsageEndpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed raw log record at line {line}: {reason}")]
    MalformedLogRecord { line: usize, reason: String },

    #[error("raw log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UsageError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, UsageError::EndpointUnsupported(_))
    }

    /// Endpoint the failure belongs to, when it came from the remote API.
    pub fn endpoint(&self) -> Option<UsageEndpoint> {
        match self {
            UsageError::EndpointUnsupported(ep) => Some(*ep),
            UsageError::RequestRejected { endpoint, .. }
            | UsageError::Transport { endpoint, .. }
            | UsageError::Decode { endpoint, .. } => Some(*endpoint),
            UsageError::MalformedLogRecord { .. } | UsageError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_names_endpoint_and_status() {
        let err = UsageError::RequestRejected {
            endpoint: UsageEndpoint::Images,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("images"));
        assert!(msg.contains("500"));
        assert_eq!(err.endpoint(), Some(UsageEndpoint::Images));
        assert!(!err.is_unsupported());
    }

    #[test]
    fn malformed_record_has_no_endpoint() {
        let err = UsageError::MalformedLogRecord {
            line: 3,
            reason: "missing field `results`".into(),
        };
        assert_eq!(err.endpoint(), None);
        assert!(err.to_string().contains("line 3"));
    }
}
