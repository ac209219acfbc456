//! Errors that end up in the page error log.

use chemcalc_scene::ScopeId;
use thiserror::Error;

use crate::module::{ModuleRef, Operation};

/// Failure to bring the computation module up. Never cached: the next request
/// starts a fresh load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// Fetching or compiling the module failed.
    #[error("failed to load module `{module_ref}`: {message}")]
    Load { module_ref: ModuleRef, message: String },
    /// The module was fetched but could not be initialized, or lacks an export.
    #[error("failed to instantiate module `{module_ref}`: {message}")]
    Instantiate { module_ref: ModuleRef, message: String },
}

/// Rejection of an operation call by the computation module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The module rejected the input with a message.
    #[error("{message}")]
    Rejected { operation: Operation, message: String },
    /// Any other rejection shape, kept as its string form.
    #[error("{0}")]
    Unknown(String),
}

/// Everything that can make one submission fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    InvalidNode(#[from] chemcalc_scene::InvalidNodeError),
    /// The result arrived for a form whose subtree was never materialized.
    #[error("form {scope} has no output to render into")]
    NotMounted { scope: ScopeId },
}
