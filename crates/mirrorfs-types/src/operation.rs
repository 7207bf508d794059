//! Tracked asynchronous operations.

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointId;
use crate::path::VfsPath;
use crate::time::Timestamp;

/// Unique identifier of a refresh or content-update operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an operation asks the collection agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Re-list a subtree's metadata down to a depth limit.
    Refresh,
    /// Re-collect one file's content.
    ContentUpdate,
}

/// Lifecycle state of an operation.
///
/// Operations start `Running` and transition exactly once to
/// `Finished`, on an external completion signal. There is no timeout
/// state: an operation whose agent never answers stays `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    Running,
    Finished,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Finished)
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationState::Running => write!(f, "RUNNING"),
            OperationState::Finished => write!(f, "FINISHED"),
        }
    }
}

/// The tracked record of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInfo {
    pub id: OperationId,
    pub kind: OperationKind,
    pub endpoint: EndpointId,
    /// Target path of the collection request.
    pub path: VfsPath,
    /// Recursion depth limit for refreshes; 0 for content updates.
    pub max_depth: u32,
    /// Whether the requesting user asked to be notified on completion.
    pub notify_user: bool,
    pub state: OperationState,
    pub started_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_matches_api_names() {
        assert_eq!(OperationState::Running.to_string(), "RUNNING");
        assert_eq!(OperationState::Finished.to_string(), "FINISHED");
    }

    #[test]
    fn only_finished_is_terminal() {
        assert!(!OperationState::Running.is_terminal());
        assert!(OperationState::Finished.is_terminal());
    }
}
