//! Domain error types

use thiserror::Error;

use crate::collection::NodeId;

/// Domain-level errors raised by structural operations on a collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A sibling with the same name already exists under the parent.
    #[error("duplicate name under the same parent: {0}")]
    DuplicateName(String),

    /// The node handle does not refer to a live node.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The node exists but is not a directory.
    #[error("node is not a directory: {0}")]
    NotADirectory(NodeId),

    /// The node exists but is not a request template.
    #[error("node is not a request: {0}")]
    NotARequest(NodeId),

    /// The node exists but is not an auth template.
    #[error("node is not an auth: {0}")]
    NotAnAuth(NodeId),

    /// The node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// The expected parent.
        parent: NodeId,
        /// The node that was looked up.
        child: NodeId,
    },

    /// The node is already listed under a parent; remove it first.
    #[error("node is already attached: {0}")]
    AlreadyAttached(NodeId),

    /// Attaching the directory would make it its own ancestor.
    #[error("directory {0} cannot be moved into its own subtree")]
    WouldCreateCycle(NodeId),

    /// The root directory cannot be moved or removed.
    #[error("operation not allowed on the collection root")]
    RootNode,

    /// A node name is empty or contains a path separator.
    #[error("invalid node name: {0:?}")]
    InvalidName(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
