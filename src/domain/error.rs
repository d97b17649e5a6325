//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Violations of the tree's structural invariants.
///
/// These are independent of any view or observer concern; only tree
/// mutations can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected: {node} is the prospective parent or one of its ancestors")]
    ChildCycle { node: String },

    #[error("{child} is already attached to {parent}")]
    AlreadyAttached { child: String, parent: String },

    #[error("{child} is not a child of {parent}")]
    NotAChild { child: String, parent: String },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
