//! Error types for hbmesh.
//!
//! Traversal never fails: a null link simply ends a walk. The variants here
//! are reserved for bulk operations (building, rotation edits, welding,
//! export) that find the graph in a state they cannot work with.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A link that the operation structurally requires is null.
    ///
    /// Usually the sign of malformed builder input (a face without a boundary,
    /// an edge without a vertex) or of a face that is not a closed cycle.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// An operation's own bookkeeping turned out to be inconsistent.
    #[error("unreachable invariant: {0}")]
    UnreachableInvariant(String),

    /// A flat index supplied by a producer is outside its collection.
    #[error("{kind} index {index} out of range (len {len})")]
    InvalidIndex {
        /// Which collection was indexed.
        kind: &'static str,
        /// The offending index.
        index: usize,
        /// Length of the collection.
        len: usize,
    },

    /// The builder was used before a mesh was pushed, or after it was popped.
    #[error("no mesh in progress: call push_face_mesh or push_edge_mesh first")]
    NoMeshInProgress,

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Shorthand for [`MeshError::InvalidTopology`].
    pub(crate) fn topology(message: impl Into<String>) -> Self {
        MeshError::InvalidTopology(message.into())
    }

    /// Check `index < len`, naming the collection on failure.
    pub(crate) fn check_index(kind: &'static str, index: usize, len: usize) -> Result<usize> {
        if index < len {
            Ok(index)
        } else {
            Err(MeshError::InvalidIndex { kind, index, len })
        }
    }
}
