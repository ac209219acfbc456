//! The computation module seen from the front end: its operations, the
//! records they return and the loader that brings it up once per page.

use std::fmt;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::OperationError;

mod loader;
mod output;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use loader::{LoadState, ModuleLoader, ModuleTransport, RawModule};
pub use output::{BalanceOutput, CellStyle, EvaluateOutput, OperationOutput, ResultRow};

/// Reference (URL or specifier) of a computation module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleRef(String);

impl ModuleRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModuleRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two operations a form can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Evaluate a chemical expression.
    Evaluate,
    /// Balance a chemical reaction.
    Balance,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Evaluate => "evaluate",
            Self::Balance => "balance",
        }
    }

    /// Header of the page section that groups forms of this kind.
    pub fn section_title(&self) -> &'static str {
        match self {
            Self::Evaluate => "Chemical Functions",
            Self::Balance => "Chemical Reaction",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation set of a loaded computation module.
///
/// Either call may reject; the rejection is reported, never retried.
pub trait ComputationModule {
    fn evaluate(&self, source: &str) -> LocalBoxFuture<'static, Result<EvaluateOutput, OperationError>>;

    fn balance(&self, source: &str) -> LocalBoxFuture<'static, Result<BalanceOutput, OperationError>>;
}

/// Shared, read-only reference to the loaded module.
#[derive(Clone)]
pub struct ModuleHandle(Rc<dyn ComputationModule>);

impl ModuleHandle {
    pub fn new(module: impl ComputationModule + 'static) -> Self {
        Self(Rc::new(module))
    }

    /// Whether both handles point at the same loaded module.
    pub fn ptr_eq(&self, other: &ModuleHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Calls `operation` with the source text, unmodified.
    pub async fn invoke(
        &self,
        operation: Operation,
        source: &str,
    ) -> Result<OperationOutput, OperationError> {
        match operation {
            Operation::Evaluate => self.0.evaluate(source).await.map(OperationOutput::Evaluate),
            Operation::Balance => self.0.balance(source).await.map(OperationOutput::Balance),
        }
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleHandle({:p})", Rc::as_ptr(&self.0))
    }
}
