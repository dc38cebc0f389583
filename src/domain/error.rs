//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::hierarchy::NodeKey;

/// Domain errors represent violations of the visualization model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("malformed hierarchy at {path}: {message}")]
    MalformedHierarchy { path: String, message: String },

    #[error("unknown hierarchy node: {0}")]
    UnknownNode(NodeKey),

    #[error("no node labelled: {0}")]
    UnknownLabel(String),

    #[error("empty scale domain: {0}")]
    EmptyDomain(String),

    #[error("invalid boundary data: {message}")]
    InvalidBoundary { message: String },

    #[error("invalid dataset {name}: {message}")]
    InvalidDataset { name: String, message: String },

    #[error("unknown graph node: {0}")]
    UnknownGraphNode(String),
}

impl DomainError {
    pub(crate) fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedHierarchy {
            path: path.into(),
            message: message.into(),
        }
    }
}
