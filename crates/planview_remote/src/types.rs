use std::fmt;

use serde::{Deserialize, Serialize};

/// Which endpoint produced a diagram response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramCall {
    Process,
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireNotification {
    pub severity: String,
    pub message: String,
}

/// Success body of `/process` and `/clear-last-selected`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiagramPayload {
    pub image: String,
    #[serde(default)]
    pub notifications: Vec<WireNotification>,
}

/// Error body of `/process` and `/clear-last-selected`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RejectionPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub notifications: Vec<WireNotification>,
}

/// A node token as the server encodes it: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeToken {
    Number(i64),
    Text(String),
}

impl fmt::Display for NodeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeToken::Number(value) => write!(f, "{value}"),
            NodeToken::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescendantsPayload {
    pub descendants: Vec<NodeToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CopyTextPayload {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Non-2xx status; the body was parsed as far as possible.
    #[error("http status {status}")]
    Rejected {
        status: u16,
        payload: RejectionPayload,
    },
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// Completion of one remote call, posted back to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    Diagram {
        call: DiagramCall,
        result: Result<DiagramPayload, RemoteError>,
    },
    Descendants {
        generation: u64,
        node: String,
        result: Result<Vec<String>, RemoteError>,
    },
    CopyText {
        result: Result<String, RemoteError>,
    },
}
