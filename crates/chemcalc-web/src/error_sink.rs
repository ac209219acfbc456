//! Page-wide, append-only error log.

use std::cell::RefCell;
use std::rc::Rc;

use chemcalc_scene::{InvalidNodeError, element};
use log::error;

use crate::platform::Surface;
use crate::render::Renderer;

const ERROR_ENTRY_STYLE: &str =
    "color: #131313; background-color: #ff57574a; padding: 12px; font-family: monospace;";

/// Something forms can report failures to.
pub trait ErrorReporter {
    fn report(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: String,
}

/// Visible error log. One per page; entries are never removed or merged.
pub struct ErrorSink<S: Surface> {
    renderer: Renderer<S>,
    container: S::Node,
    entries: RefCell<Vec<ErrorEntry>>,
}

impl<S: Surface> ErrorSink<S> {
    /// Creates the `div[app-errors]` container and appends it to `parent`.
    pub fn attach(renderer: Renderer<S>, parent: &S::Node) -> Result<Rc<Self>, InvalidNodeError> {
        let container = renderer.materialize(element("div").attr("app-errors", "").into())?;
        renderer.surface().append_child(parent, &container);
        Ok(Rc::new(Self {
            renderer,
            container,
            entries: RefCell::new(Vec::new()),
        }))
    }

    pub fn container(&self) -> &S::Node {
        &self.container
    }

    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<S: Surface> ErrorReporter for ErrorSink<S> {
    fn report(&self, message: &str) {
        error!("{message}");
        self.entries.borrow_mut().push(ErrorEntry {
            message: message.to_string(),
        });
        let entry = element("p")
            .attr("style", ERROR_ENTRY_STYLE)
            .attr("error", "")
            .child(message);
        match self.renderer.materialize(entry.into()) {
            Ok(node) => self.renderer.surface().append_child(&self.container, &node),
            Err(invalid) => error!("[ErrorSink] cannot render entry: {invalid}"),
        }
    }
}
