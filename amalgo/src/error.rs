//! Construction errors.
//!
//! Runtime commands never fail; anything issued in the wrong state is a
//! no-op. Only mounting a widget into a document can go wrong.

use thiserror::Error;

use crate::document::NodeId;

/// Errors that can occur when mounting a combobox.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An element with a generated id already exists in the document.
    #[error("Element id '{0}' is already in use")]
    DuplicateId(String),

    /// The requested parent is not part of the document.
    #[error("Parent {0} does not exist in the document")]
    UnknownParent(NodeId),

    /// The base id is empty or contains whitespace.
    #[error("Invalid widget id '{0}'")]
    InvalidId(String),

    /// The document's element tree can no longer be written to.
    #[error("Document is unavailable")]
    DocumentUnavailable,
}
