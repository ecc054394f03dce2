//! Error handling for the toolbar-sim crate.

use std::{io, result};

use ron::error::SpannedError;
use thiserror::Error;

/// Convenient result type for toolbar-sim operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while replaying a scenario.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The scenario file is not valid RON for a scenario.
    #[error("Failed to parse scenario: {0}")]
    Scenario(#[from] SpannedError),
    /// The widget rejected its options or a setter argument.
    #[error("Widget error: {0}")]
    Widget(#[from] toolbar_widget::Error),
    /// A step referred to a window index that was never opened.
    #[error("Step {step} refers to unknown window #{index}")]
    UnknownWindow {
        /// Zero-based step number.
        step: usize,
        /// Window index used by the step.
        index: usize,
    },
}
