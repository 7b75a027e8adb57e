use std::fmt;

use serde::{Deserialize, Serialize};

/// Usage API endpoint categories under `/organization/usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEndpoint {
    Completions,
    Embeddings,
    Images,
    Moderations,
    AudioTranscriptions,
    AudioSpeeches,
    CodeInterpreterSessions,
    VectorStores,
}

impl UsageEndpoint {
    pub const ALL: [UsageEndpoint; 8] = [
        UsageEndpoint::Completions,
        UsageEndpoint::Embeddings,
        UsageEndpoint::Images,
        UsageEndpoint::Moderations,
        UsageEndpoint::AudioTranscriptions,
        UsageEndpoint::AudioSpeeches,
        UsageEndpoint::CodeInterpreterSessions,
        UsageEndpoint::VectorStores,
    ];

    /// Path segment used both in the request URL and as the raw log tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageEndpoint::Completions => "completions",
            UsageEndpoint::Embeddings => "embeddings",
            UsageEndpoint::Images => "images",
            UsageEndpoint::Moderations => "moderations",
            UsageEndpoint::AudioTranscriptions => "audio_transcriptions",
            UsageEndpoint::AudioSpeeches => "audio_speeches",
            UsageEndpoint::CodeInterpreterSessions => "code_interpreter_sessions",
            UsageEndpoint::VectorStores => "vector_stores",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|ep| ep.as_str() == code)
    }

    /// Endpoints that accept `bucket_width` and `group_by=model`.
    pub fn is_model_bucketed(&self) -> bool {
        matches!(
            self,
            UsageEndpoint::Completions
                | UsageEndpoint::Embeddings
                | UsageEndpoint::Images
                | UsageEndpoint::Moderations
        )
    }
}

impl fmt::Display for UsageEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
