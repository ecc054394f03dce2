use std::result::Result as StdResult;

use thiserror::Error;
use toolbar_ids::ContainerId;

/// Convenient result type for the toolbar-widget crate.
pub type Result<T> = StdResult<T, Error>;

/// Failure reported by the persistence collaborator when an order cannot be stored.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct PersistError(pub String);

impl PersistError {
    /// Build a persistence error from an arbitrary message.
    pub fn new<M: Into<String>>(msg: M) -> Self {
        Self(msg.into())
    }
}

/// Unified error type for widget placement and sizing.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A numeric option was negative, NaN, infinite, or not a number at all.
    #[error("ToolbarWidget.{field} should be a non-negative number. Got {value}")]
    InvalidArgument {
        /// Option name as spelled by callers (`height`, `aspectRatio`).
        field: &'static str,
        /// Rendered offending value.
        value: String,
    },

    /// No element with the target toolbar id exists in a window.
    #[error("No toolbar found with ID \"{0}\"")]
    ContainerNotFound(ContainerId),

    /// The target id resolved to an element that is not a toolbar.
    #[error("Element with ID \"{id}\" is not a <toolbar> (found <{tag}>)")]
    ContainerWrongType {
        /// The configured toolbar id.
        id: ContainerId,
        /// Tag name of the element that was found instead.
        tag: String,
    },

    /// Writing a toolbar order failed.
    #[error("Failed to persist toolbar order: {0}")]
    Persist(#[from] PersistError),

    /// Widget options could not be decoded.
    #[error("Invalid widget options: {0}")]
    Options(String),
}

impl Error {
    /// Helper to build an `InvalidArgument` for a numeric option.
    pub(crate) fn invalid(field: &'static str, value: f64) -> Self {
        Self::InvalidArgument {
            field,
            value: value.to_string(),
        }
    }
}
