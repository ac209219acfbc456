//! Chemcalc browser front end.
//!
//! The page is a list of calculator forms. Each form lazily loads the
//! computation module through a shared [`ModuleLoader`], submits the text the
//! user typed to one of its operations and renders the result as a table.
//! Failures go to the page-wide [`ErrorSink`].
//!
//! All host access goes through [`platform::Surface`] and
//! [`platform::Spawner`], so the whole page runs the same way in the browser
//! and on the in-memory platform used by the tests.

pub mod app;
pub mod config;
pub mod error;
pub mod error_sink;
pub mod form;
pub mod logging;
pub mod module;
pub mod platform;
pub mod render;

pub use chemcalc_scene as scene;
#[cfg(target_arch = "wasm32")]
pub use zoon;

pub use app::{App, BootstrapError};
pub use config::{AppConfig, ConfigError, ScenarioDescriptor};
pub use error::{ModuleError, OperationError, SubmitError};
pub use error_sink::{ErrorEntry, ErrorReporter, ErrorSink};
pub use form::{FormController, FormContext, SubmissionState, SubmitOutcome};
pub use module::{
    BalanceOutput, ComputationModule, EvaluateOutput, LoadState, ModuleHandle, ModuleLoader,
    ModuleRef, ModuleTransport, Operation, OperationOutput, RawModule,
};
pub use render::Renderer;
