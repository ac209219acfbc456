//! Browser platform: the real DOM through web-sys, tasks through zoon.

use std::cell::RefCell;
use std::rc::Rc;

use chemcalc_scene::{InvalidNodeError, validate_attribute_name, validate_tag_name};
use futures_util::future::LocalBoxFuture;
use log::{error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, Event, HtmlInputElement, Node};
use zoon::Task;

use super::{Spawner, SubmitHandler, Surface};
use crate::app::App;
use crate::config::AppConfig;
use crate::module::browser::JsModuleTransport;

thread_local! {
    static APP: RefCell<Option<App<BrowserSurface>>> = const { RefCell::new(None) };
}

pub struct BrowserSurface {
    document: Document,
}

impl BrowserSurface {
    /// Surface over the current window's document.
    pub fn from_window() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn element_tag(element: &Element) -> String {
    element.tag_name().to_ascii_lowercase()
}

impl Surface for BrowserSurface {
    type Node = Node;

    fn create_element(&self, tag: &str) -> Result<Node, InvalidNodeError> {
        validate_tag_name(tag)?;
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(|_| InvalidNodeError::InvalidTagName {
                tag: tag.to_string(),
            })
    }

    fn create_text(&self, content: &str) -> Node {
        self.document.create_text_node(content).into()
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), InvalidNodeError> {
        let Some(element) = node.dyn_ref::<Element>() else {
            error!("[BrowserSurface] set_attribute `{name}` on a non-element node");
            return Ok(());
        };
        validate_attribute_name(&element_tag(element), name)?;
        element
            .set_attribute(name, value)
            .map_err(|_| InvalidNodeError::InvalidAttributeName {
                tag: element_tag(element),
                name: name.to_string(),
            })
    }

    fn append_child(&self, parent: &Node, child: &Node) {
        if let Err(dom_error) = parent.append_child(child) {
            error!("[BrowserSurface] append_child failed: {dom_error:?}");
        }
    }

    fn replace_child(&self, parent: &Node, new_child: &Node, old_child: &Node) {
        if let Err(dom_error) = parent.replace_child(new_child, old_child) {
            error!("[BrowserSurface] replace_child failed: {dom_error:?}");
        }
    }

    fn body(&self) -> Option<Node> {
        self.document.body().map(Node::from)
    }

    fn input_value(&self, input: &Node) -> String {
        input
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }

    fn set_input_value(&self, input: &Node, value: &str) {
        match input.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_value(value),
            None => error!("[BrowserSurface] set_input_value on a non-input node"),
        }
    }

    fn on_submit(&self, form: &Node, handler: SubmitHandler) {
        let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            handler();
        });
        match form.add_event_listener_with_callback("submit", listener.as_ref().unchecked_ref()) {
            // Forms live as long as the page.
            Ok(()) => listener.forget(),
            Err(dom_error) => error!("[BrowserSurface] cannot listen for submit: {dom_error:?}"),
        }
    }
}

/// Runs futures as zoon tasks on the browser event loop.
pub struct ZoonSpawner;

impl Spawner for ZoonSpawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        Task::start(future);
    }
}

fn bootstrap(config: &AppConfig) {
    let Some(surface) = BrowserSurface::from_window() else {
        error!("[App] no window document");
        return;
    };
    match App::start(
        Rc::new(surface),
        Rc::new(ZoonSpawner),
        Rc::new(JsModuleTransport::new()),
        config,
    ) {
        Ok(app) => APP.with(|slot| *slot.borrow_mut() = Some(app)),
        Err(bootstrap_error) => error!("[App] bootstrap failed: {bootstrap_error}"),
    }
}

/// Builds the page once the document is parsed. Safe to call from `main`
/// before or after `DOMContentLoaded`.
pub fn start(config: AppConfig) {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        error!("[App] no window document");
        return;
    };
    if document.ready_state() != "loading" {
        bootstrap(&config);
        return;
    }
    info!("[App] waiting for DOMContentLoaded");
    let on_ready = Closure::once(move || bootstrap(&config));
    match document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
    {
        Ok(()) => on_ready.forget(),
        Err(dom_error) => error!("[App] cannot wait for DOMContentLoaded: {dom_error:?}"),
    }
}

/// Runs `f` with the started page, if there is one.
pub fn with_app<T>(f: impl FnOnce(&App<BrowserSurface>) -> T) -> Option<T> {
    APP.with(|slot| slot.borrow().as_ref().map(f))
}
