//! Host capabilities injected into the renderer, loader and forms.
//!
//! - `memory`: in-memory node tree and a deterministic local executor.
//! - `browser`: web-sys DOM and zoon tasks (wasm32 only).

use std::rc::Rc;

use chemcalc_scene::InvalidNodeError;
use futures_util::future::LocalBoxFuture;

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod browser;

/// Handler run when a form is submitted. The surface suppresses the default
/// navigation before calling it.
pub type SubmitHandler = Rc<dyn Fn()>;

/// A rendering surface able to create, attach and replace native nodes.
///
/// Implementations are single-threaded; nodes are cheap handles.
pub trait Surface: 'static {
    type Node: Clone + 'static;

    fn create_element(&self, tag: &str) -> Result<Self::Node, InvalidNodeError>;

    fn create_text(&self, content: &str) -> Self::Node;

    fn set_attribute(
        &self,
        node: &Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), InvalidNodeError>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node);

    /// Swaps `old_child` for `new_child` in one step.
    fn replace_child(&self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node);

    /// Page body, `None` before the document has one.
    fn body(&self) -> Option<Self::Node>;

    /// Current value of a text input. Empty for anything that is not an input.
    fn input_value(&self, input: &Self::Node) -> String;

    fn set_input_value(&self, input: &Self::Node, value: &str);

    fn on_submit(&self, form: &Self::Node, handler: SubmitHandler);
}

/// Schedules futures on the single event-processing thread.
pub trait Spawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}
