use thiserror::Error;

/// Errors returned by tree operations.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("value {0} is already in the tree")]
    DuplicateKey(String),
    #[error("value {0} could not be found in the tree")]
    NotFound(String),
    #[error("the tree is empty")]
    EmptyTree,
    /// A balancing step left the tree in a state that breaks its invariants.
    /// The tree must not be used after this.
    #[error("{variant} invariant violated at node {value} ({meta}): {reason}\ntree:\n{rendering}")]
    InvariantViolation {
        variant: &'static str,
        value: String,
        meta: String,
        reason: String,
        rendering: String,
    },
    #[error("failed to export tree: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeError {
    /// Returns `true` for errors that mean the tree is structurally unsound.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}
