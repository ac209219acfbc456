//! One calculator form: its subtree, its submissions and its output.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ (Success) ──▶ Idle
//!                      │
//!                      └──err──▶ (Failed) ──▶ Idle
//! ```
//!
//! Success and failure are not resting states: the form goes straight back
//! to `Idle` and keeps the result as [`FormController::last_outcome`].
//!
//! The submit control is never disabled, so several submissions of the same
//! form can be in flight at once. They are not serialized: whichever resolves
//! last owns the output (last-resolved-wins), and the form only reports `Idle`
//! once none is left in flight.

use std::cell::RefCell;
use std::rc::Rc;

use chemcalc_scene::{ElementNode, InvalidNodeError, ScopeId, UiNode, element};
use futures_util::future::{FutureExt, LocalBoxFuture};
use log::{debug, warn};

use crate::config::ScenarioDescriptor;
use crate::error::SubmitError;
use crate::error_sink::ErrorReporter;
use crate::module::{ModuleLoader, ModuleRef, Operation, OperationOutput};
use crate::platform::{Spawner, Surface};
use crate::render::Renderer;

/// Page-wide collaborators handed to every form.
pub struct FormContext<S: Surface> {
    pub renderer: Renderer<S>,
    pub spawner: Rc<dyn Spawner>,
    pub loader: Rc<ModuleLoader>,
    pub module_ref: ModuleRef,
    pub errors: Rc<dyn ErrorReporter>,
}

impl<S: Surface> Clone for FormContext<S> {
    fn clone(&self) -> Self {
        Self {
            renderer: self.renderer.clone(),
            spawner: Rc::clone(&self.spawner),
            loader: Rc::clone(&self.loader),
            module_ref: self.module_ref.clone(),
            errors: Rc::clone(&self.errors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Success,
    Failed,
}

struct FormSession<N> {
    state: SubmissionState,
    in_flight: usize,
    last_outcome: Option<SubmitOutcome>,
    root: Option<N>,
    input: Option<N>,
    output: Option<N>,
}

/// Controller of one scenario form.
///
/// Owns everything the form needs after mounting as plain fields: the scope
/// id, the bound operation and the input and output nodes. Mount hooks and the
/// submit handler only hold weak references back to it.
pub struct FormController<S: Surface> {
    scope: ScopeId,
    operation: Operation,
    description: String,
    sample_input: String,
    context: FormContext<S>,
    session: RefCell<FormSession<S::Node>>,
}

impl<S: Surface> FormController<S> {
    pub fn new(context: FormContext<S>, scenario: &ScenarioDescriptor) -> Rc<Self> {
        Rc::new(Self {
            scope: ScopeId::generate(),
            operation: scenario.operation,
            description: scenario.description.clone(),
            sample_input: scenario.sample_input.clone(),
            context,
            session: RefCell::new(FormSession {
                state: SubmissionState::Idle,
                in_flight: 0,
                last_outcome: None,
                root: None,
                input: None,
                output: None,
            }),
        })
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn state(&self) -> SubmissionState {
        self.session.borrow().state
    }

    pub fn in_flight(&self) -> usize {
        self.session.borrow().in_flight
    }

    pub fn last_outcome(&self) -> Option<SubmitOutcome> {
        self.session.borrow().last_outcome
    }

    pub fn root_node(&self) -> Option<S::Node> {
        self.session.borrow().root.clone()
    }

    pub fn input_node(&self) -> Option<S::Node> {
        self.session.borrow().input.clone()
    }

    /// Node currently holding the output: the empty placeholder until the
    /// first success, the latest result table afterwards.
    pub fn output_node(&self) -> Option<S::Node> {
        self.session.borrow().output.clone()
    }

    fn surface(&self) -> &Rc<S> {
        self.context.renderer.surface()
    }

    /// Describes the form subtree.
    pub fn view(self: &Rc<Self>) -> UiNode<S::Node> {
        let scope = self.scope.to_string();
        let for_root = Rc::downgrade(self);
        let for_input = Rc::downgrade(self);
        let for_form = Rc::downgrade(self);
        let for_output = Rc::downgrade(self);

        element("div")
            .attr("form-wrapper", "")
            .attr("id", scope.as_str())
            .child(element("p").child(self.description.as_str()))
            .child(
                element("form")
                    .attr("id", scope.as_str())
                    .child(element("input").attr("type", "text").on_mount(
                        move |input: &S::Node| {
                            if let Some(this) = for_input.upgrade() {
                                this.attach_input(input);
                            }
                        },
                    ))
                    .child(element("input").attr("type", "submit"))
                    .on_mount(move |form: &S::Node| {
                        if let Some(this) = for_form.upgrade() {
                            this.attach_form(form);
                        }
                    }),
            )
            .child(element("div").attr("output", "").on_mount(
                move |output: &S::Node| {
                    if let Some(this) = for_output.upgrade() {
                        this.session.borrow_mut().output = Some(output.clone());
                    }
                },
            ))
            .on_mount(move |root: &S::Node| {
                if let Some(this) = for_root.upgrade() {
                    this.session.borrow_mut().root = Some(root.clone());
                }
            })
            .into()
    }

    /// Materializes the form subtree. The caller attaches the returned node.
    pub fn mount(self: &Rc<Self>) -> Result<S::Node, InvalidNodeError> {
        self.context.renderer.materialize(self.view())
    }

    fn attach_input(&self, input: &S::Node) {
        self.surface().set_input_value(input, &self.sample_input);
        self.session.borrow_mut().input = Some(input.clone());
    }

    fn attach_form(self: &Rc<Self>, form: &S::Node) {
        let this = Rc::downgrade(self);
        self.surface().on_submit(
            form,
            Rc::new(move || {
                if let Some(this) = this.upgrade() {
                    this.submit();
                }
            }),
        );
    }

    /// Handles activation of the submit control: reads the input as it is
    /// right now and runs the submission in the background.
    pub fn submit(self: &Rc<Self>) {
        let Some(input) = self.input_node() else {
            warn!("[Form {}] submitted before mount", self.scope);
            return;
        };
        let source = self.surface().input_value(&input);
        let submission = self.submit_text(source);
        self.context.spawner.spawn_local(submission.map(|_| ()).boxed_local());
    }

    /// Starts a submission of `source`, exactly as given.
    ///
    /// The state switches to `Submitting` immediately; the returned future
    /// loads the module, runs the operation and renders the result or reports
    /// the failure. It never fails itself.
    pub fn submit_text(
        self: &Rc<Self>,
        source: impl Into<String>,
    ) -> LocalBoxFuture<'static, SubmitOutcome> {
        let source = source.into();
        {
            let mut session = self.session.borrow_mut();
            session.in_flight += 1;
            session.state = SubmissionState::Submitting;
        }
        debug!(
            "[Form {}] {} submitting {source:?}",
            self.scope, self.operation
        );

        let this = Rc::clone(self);
        async move {
            let outcome = match this.run(&source).await {
                Ok(()) => SubmitOutcome::Success,
                Err(error) => {
                    this.context.errors.report(&error.to_string());
                    SubmitOutcome::Failed
                }
            };
            this.finish(outcome);
            outcome
        }
        .boxed_local()
    }

    async fn run(&self, source: &str) -> Result<(), SubmitError> {
        let module = self.context.loader.request(&self.context.module_ref).await?;
        let output = module.invoke(self.operation, source).await?;
        self.show_output(&output)?;
        Ok(())
    }

    /// Swaps the current output node for a freshly rendered result table.
    fn show_output(&self, output: &OperationOutput) -> Result<(), SubmitError> {
        let (Some(root), Some(previous)) = (self.root_node(), self.output_node()) else {
            return Err(SubmitError::NotMounted { scope: self.scope });
        };
        let table = self.context.renderer.materialize(result_table(output))?;
        self.surface().replace_child(&root, &table, &previous);
        self.session.borrow_mut().output = Some(table);
        Ok(())
    }

    fn finish(&self, outcome: SubmitOutcome) {
        let mut session = self.session.borrow_mut();
        session.in_flight = session.in_flight.saturating_sub(1);
        session.last_outcome = Some(outcome);
        debug!(
            "[Form {}] Submitting -> {outcome:?}, {} still in flight",
            self.scope, session.in_flight
        );
        session.state = if session.in_flight == 0 {
            SubmissionState::Idle
        } else {
            SubmissionState::Submitting
        };
    }
}

/// Result table: one row per field of the record, label cell then value cell.
///
/// The table carries the `output` marker so the form's output stays
/// addressable as `#<scope> > [output]` after the swap.
pub fn result_table<N>(output: &OperationOutput) -> UiNode<N> {
    element("table")
        .attr("output", "")
        .children(output.rows().into_iter().map(|row| -> ElementNode<N> {
            element("tr")
                .child(element::<N>("td").child(row.label))
                .child(element::<N>("td").child(element::<N>(row.style.tag()).child(row.text)))
        }))
        .into()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures_executor::block_on;
    use futures_util::future;

    use super::*;
    use crate::error::{ModuleError, OperationError};
    use crate::module::{
        BalanceOutput, ComputationModule, EvaluateOutput, ModuleHandle, ModuleTransport, RawModule,
    };
    use crate::platform::memory::{MemoryNode, MemoryScheduler, MemorySurface};

    #[derive(Default)]
    struct RecordingReporter {
        messages: RefCell<Vec<String>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    struct EchoModule;

    impl ComputationModule for EchoModule {
        fn evaluate(
            &self,
            source: &str,
        ) -> LocalBoxFuture<'static, Result<EvaluateOutput, OperationError>> {
            let result = if source.is_empty() {
                Err(OperationError::Rejected {
                    operation: Operation::Evaluate,
                    message: "empty expression".to_string(),
                })
            } else {
                Ok(EvaluateOutput {
                    ast: format!("Ast({source})"),
                    value: source.to_uppercase(),
                })
            };
            future::ready(result).boxed_local()
        }

        fn balance(
            &self,
            source: &str,
        ) -> LocalBoxFuture<'static, Result<BalanceOutput, OperationError>> {
            future::ready(Ok(BalanceOutput {
                input_ast: format!("In({source})"),
                input_expr: source.to_string(),
                output_ast: format!("Out({source})"),
                output_expr: format!("balanced {source}"),
            }))
            .boxed_local()
        }
    }

    struct EchoTransport;

    struct EchoRaw;

    impl RawModule for EchoRaw {
        fn instantiate(
            self: Box<Self>,
        ) -> LocalBoxFuture<'static, Result<ModuleHandle, ModuleError>> {
            future::ready(Ok(ModuleHandle::new(EchoModule))).boxed_local()
        }
    }

    impl ModuleTransport for EchoTransport {
        fn load(
            &self,
            _module_ref: &ModuleRef,
        ) -> LocalBoxFuture<'static, Result<Box<dyn RawModule>, ModuleError>> {
            future::ready(Ok(Box::new(EchoRaw) as Box<dyn RawModule>)).boxed_local()
        }
    }

    struct Fixture {
        surface: Rc<MemorySurface>,
        scheduler: Rc<MemoryScheduler>,
        reporter: Rc<RecordingReporter>,
        form: Rc<FormController<MemorySurface>>,
        root: MemoryNode,
    }

    fn fixture(operation: Operation, sample_input: &str) -> Fixture {
        let surface = Rc::new(MemorySurface::new());
        let scheduler = Rc::new(MemoryScheduler::new());
        let reporter = Rc::new(RecordingReporter::default());
        let context = FormContext {
            renderer: Renderer::new(Rc::clone(&surface)),
            spawner: scheduler.clone(),
            loader: Rc::new(ModuleLoader::new(Rc::new(EchoTransport))),
            module_ref: ModuleRef::from("./pkg/index.js"),
            errors: reporter.clone(),
        };
        let form = FormController::new(
            context,
            &ScenarioDescriptor {
                operation,
                sample_input: sample_input.to_string(),
                description: "test scenario".to_string(),
            },
        );
        let root = form.mount().unwrap();
        Fixture {
            surface,
            scheduler,
            reporter,
            form,
            root,
        }
    }

    #[test]
    fn mount_builds_the_scoped_subtree() {
        let fixture = fixture(Operation::Evaluate, "frequency(wavelength = nm(325))");
        let scope = fixture.form.scope().to_string();

        assert_eq!(
            fixture.root.outer_html(),
            format!(
                concat!(
                    r#"<div form-wrapper id="{scope}"><p>test scenario</p>"#,
                    r#"<form id="{scope}"><input type="text"><input type="submit"></form>"#,
                    "<div output></div></div>"
                ),
                scope = scope
            )
        );
        let input = fixture.form.input_node().unwrap();
        assert_eq!(
            fixture.surface.input_value(&input),
            "frequency(wavelength = nm(325))"
        );
        assert_eq!(fixture.form.state(), SubmissionState::Idle);
    }

    #[test]
    fn submit_text_renders_the_result_table() {
        let fixture = fixture(Operation::Evaluate, "x");

        let outcome = block_on(fixture.form.submit_text("nm(325)"));

        assert_eq!(outcome, SubmitOutcome::Success);
        assert_eq!(fixture.form.state(), SubmissionState::Idle);
        assert_eq!(fixture.form.last_outcome(), Some(SubmitOutcome::Success));
        let output = fixture.form.output_node().unwrap();
        assert_eq!(
            output.outer_html(),
            concat!(
                "<table output>",
                "<tr><td>AST TREE</td><td><pre>Ast(nm(325))</pre></td></tr>",
                "<tr><td>VALUE</td><td><code>NM(325)</code></td></tr>",
                "</table>"
            )
        );
        assert!(fixture.root.children()[2].ptr_eq(&output));
        assert!(fixture.reporter.messages.borrow().is_empty());
    }

    #[test]
    fn rejection_goes_to_the_reporter_and_keeps_output() {
        let fixture = fixture(Operation::Evaluate, "x");
        block_on(fixture.form.submit_text("first"));
        let before = fixture.root.outer_html();

        let outcome = block_on(fixture.form.submit_text(""));

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(*fixture.reporter.messages.borrow(), ["empty expression"]);
        assert_eq!(fixture.root.outer_html(), before);
        assert_eq!(fixture.form.state(), SubmissionState::Idle);
    }

    #[test]
    fn submit_event_reads_the_current_input_value() {
        let fixture = fixture(Operation::Balance, "Al + O2 -> Al2O3");
        let input = fixture.form.input_node().unwrap();
        fixture.surface.set_input_value(&input, "  PCl5 + H2O -> H3PO4 + HCl");
        let form = fixture.root.find_by_tag("form").remove(0);

        assert!(fixture.surface.submit(&form));
        assert_eq!(fixture.form.state(), SubmissionState::Submitting);
        // Editing after activation does not change the submitted text.
        fixture.surface.set_input_value(&input, "changed");
        fixture.scheduler.run_until_stalled();

        let output = fixture.form.output_node().unwrap();
        let code = output.find_by_tag("code");
        assert_eq!(code[0].text_content(), "  PCl5 + H2O -> H3PO4 + HCl");
        assert_eq!(code[1].text_content(), "balanced   PCl5 + H2O -> H3PO4 + HCl");
        assert_eq!(fixture.form.state(), SubmissionState::Idle);
    }

    #[test]
    fn unmounted_form_fails_instead_of_reporting_success() {
        let surface = Rc::new(MemorySurface::new());
        let reporter = Rc::new(RecordingReporter::default());
        let context = FormContext {
            renderer: Renderer::new(Rc::clone(&surface)),
            spawner: Rc::new(MemoryScheduler::new()),
            loader: Rc::new(ModuleLoader::new(Rc::new(EchoTransport))),
            module_ref: ModuleRef::from("./pkg/index.js"),
            errors: reporter.clone(),
        };
        let form = FormController::new(
            context,
            &ScenarioDescriptor {
                operation: Operation::Evaluate,
                sample_input: "nm(325)".to_string(),
                description: "never mounted".to_string(),
            },
        );

        let outcome = block_on(form.submit_text("nm(325)"));

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(form.last_outcome(), Some(SubmitOutcome::Failed));
        assert_eq!(
            *reporter.messages.borrow(),
            [format!("form {} has no output to render into", form.scope())]
        );
        assert_eq!(surface.created_count(), 0);
    }

    #[test]
    fn result_table_rows_match_the_record() {
        let output = OperationOutput::Balance(BalanceOutput {
            input_ast: "a".to_string(),
            input_expr: "b".to_string(),
            output_ast: "c".to_string(),
            output_expr: "d".to_string(),
        });
        let table: UiNode<()> = result_table(&output);
        let table = table.as_element().unwrap();
        assert_eq!(table.children.len(), 4);
        assert_eq!(table.attributes.keys().collect::<Vec<_>>(), ["output"]);
    }
}
