//! Page bootstrap: error log first, then the forms in configuration order,
//! with a section header before each run of forms of the same kind.

use std::rc::Rc;

use chemcalc_scene::{InvalidNodeError, element};
use log::info;
use thiserror::Error;

use crate::config::AppConfig;
use crate::error_sink::{ErrorReporter, ErrorSink};
use crate::form::{FormContext, FormController};
use crate::module::{ModuleLoader, ModuleTransport, Operation};
use crate::platform::{Spawner, Surface};
use crate::render::Renderer;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("the page has no body to render into")]
    MissingBody,
    #[error(transparent)]
    InvalidNode(#[from] InvalidNodeError),
}

/// The running page. Dropping it drops the forms; event handlers registered
/// on the surface then do nothing.
pub struct App<S: Surface> {
    sink: Rc<ErrorSink<S>>,
    loader: Rc<ModuleLoader>,
    forms: Vec<Rc<FormController<S>>>,
}

impl<S: Surface> App<S> {
    /// Builds the page into the surface body. Called once per page load.
    pub fn start(
        surface: Rc<S>,
        spawner: Rc<dyn Spawner>,
        transport: Rc<dyn ModuleTransport>,
        config: &AppConfig,
    ) -> Result<Self, BootstrapError> {
        let body = surface.body().ok_or(BootstrapError::MissingBody)?;
        let renderer = Renderer::new(surface);
        let sink = ErrorSink::attach(renderer.clone(), &body)?;
        let loader = Rc::new(ModuleLoader::new(transport));
        let errors: Rc<dyn ErrorReporter> = sink.clone();
        let context = FormContext {
            renderer: renderer.clone(),
            spawner,
            loader: Rc::clone(&loader),
            module_ref: config.module_ref.clone(),
            errors,
        };

        let mut forms = Vec::with_capacity(config.scenarios.len());
        let mut section: Option<Operation> = None;
        for scenario in &config.scenarios {
            // A new header whenever the operation kind changes.
            if section != Some(scenario.operation) {
                let title = scenario.operation.section_title();
                let header = renderer.materialize(element("h1").child(title).into())?;
                renderer.surface().append_child(&body, &header);
                section = Some(scenario.operation);
            }
            let form = FormController::new(context.clone(), scenario);
            let root = form.mount()?;
            renderer.surface().append_child(&body, &root);
            forms.push(form);
        }

        info!(
            "[App] started with {} forms, module `{}`",
            forms.len(),
            config.module_ref
        );
        Ok(Self {
            sink,
            loader,
            forms,
        })
    }

    /// Forms in page order.
    pub fn forms(&self) -> &[Rc<FormController<S>>] {
        &self.forms
    }

    pub fn sink(&self) -> &Rc<ErrorSink<S>> {
        &self.sink
    }

    pub fn loader(&self) -> &Rc<ModuleLoader> {
        &self.loader
    }
}
