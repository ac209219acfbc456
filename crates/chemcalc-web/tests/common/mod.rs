#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chemcalc_web::platform::memory::{MemoryNode, MemoryScheduler, MemorySurface};
use chemcalc_web::platform::Surface;
use chemcalc_web::{
    App, AppConfig, BalanceOutput, ComputationModule, EvaluateOutput, FormController, ModuleError,
    ModuleHandle, ModuleRef, ModuleTransport, Operation, OperationError, RawModule,
};
use futures_channel::oneshot;
use futures_util::future::{self, FutureExt, LocalBoxFuture};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Operation calls that wait until the test releases them, in call order.
#[derive(Default)]
pub struct Gates {
    pending: RefCell<Vec<Option<oneshot::Sender<()>>>>,
}

impl Gates {
    pub fn release(&self, index: usize) {
        let gate = self.pending.borrow_mut()[index].take();
        if let Some(gate) = gate {
            let _ = gate.send(());
        }
    }

    pub fn calls(&self) -> usize {
        self.pending.borrow().len()
    }
}

/// Stand-in for the chemistry module with predictable answers.
///
/// `evaluate` rejects sources mentioning `undefined_fn` with a message and
/// sources mentioning `opaque` with an unstructured value; `balance` rejects
/// sources without an arrow.
#[derive(Clone, Default)]
pub struct ScriptedModule {
    gates: Option<Rc<Gates>>,
}

impl ScriptedModule {
    pub fn immediate() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, Rc<Gates>) {
        let gates = Rc::new(Gates::default());
        let module = Self {
            gates: Some(Rc::clone(&gates)),
        };
        (module, gates)
    }

    fn answer<T: 'static>(
        &self,
        result: Result<T, OperationError>,
    ) -> LocalBoxFuture<'static, Result<T, OperationError>> {
        match &self.gates {
            None => future::ready(result).boxed_local(),
            Some(gates) => {
                let (sender, receiver) = oneshot::channel();
                gates.pending.borrow_mut().push(Some(sender));
                async move {
                    let _ = receiver.await;
                    result
                }
                .boxed_local()
            }
        }
    }
}

impl ComputationModule for ScriptedModule {
    fn evaluate(
        &self,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<EvaluateOutput, OperationError>> {
        let result = if source.contains("opaque") {
            Err(OperationError::Unknown("[object Object]".to_string()))
        } else if source.contains("undefined_fn") {
            Err(OperationError::Rejected {
                operation: Operation::Evaluate,
                message: format!("unknown function in `{source}`"),
            })
        } else {
            Ok(EvaluateOutput {
                ast: format!("Call {{\n    source: {source:?},\n}}"),
                value: format!("value of {source}"),
            })
        };
        self.answer(result)
    }

    fn balance(
        &self,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<BalanceOutput, OperationError>> {
        let result = if source.contains("->") {
            Ok(BalanceOutput {
                input_ast: format!("Reaction({source})"),
                input_expr: source.to_string(),
                output_ast: format!("Balanced({source})"),
                output_expr: format!("balanced: {source}"),
            })
        } else {
            Err(OperationError::Rejected {
                operation: Operation::Balance,
                message: format!("expected `->` in `{source}`"),
            })
        };
        self.answer(result)
    }
}

struct ScriptedRaw(ScriptedModule);

impl RawModule for ScriptedRaw {
    fn instantiate(self: Box<Self>) -> LocalBoxFuture<'static, Result<ModuleHandle, ModuleError>> {
        future::ready(Ok(ModuleHandle::new(self.0))).boxed_local()
    }
}

/// Transport that answers immediately, optionally failing the first loads.
pub struct ScriptedTransport {
    module: ScriptedModule,
    failures_left: Cell<usize>,
    loads: Cell<usize>,
}

impl ScriptedTransport {
    pub fn new(module: ScriptedModule) -> Self {
        Self::failing_first(module, 0)
    }

    pub fn failing_first(module: ScriptedModule, failures: usize) -> Self {
        Self {
            module,
            failures_left: Cell::new(failures),
            loads: Cell::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }
}

impl ModuleTransport for ScriptedTransport {
    fn load(
        &self,
        module_ref: &ModuleRef,
    ) -> LocalBoxFuture<'static, Result<Box<dyn RawModule>, ModuleError>> {
        self.loads.set(self.loads.get() + 1);
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return future::ready(Err(ModuleError::Load {
                module_ref: module_ref.clone(),
                message: "network error".to_string(),
            }))
            .boxed_local();
        }
        let raw: Box<dyn RawModule> = Box::new(ScriptedRaw(self.module.clone()));
        future::ready(Ok(raw)).boxed_local()
    }
}

/// The default page running on the memory platform.
pub struct Page {
    pub surface: Rc<MemorySurface>,
    pub scheduler: Rc<MemoryScheduler>,
    pub transport: Rc<ScriptedTransport>,
    pub app: App<MemorySurface>,
}

impl Page {
    pub fn start(transport: ScriptedTransport) -> Self {
        init_logging();
        let surface = Rc::new(MemorySurface::new());
        let scheduler = Rc::new(MemoryScheduler::new());
        let transport = Rc::new(transport);
        let config = AppConfig::default_config().expect("default config parses");
        let app = App::start(
            Rc::clone(&surface),
            scheduler.clone(),
            transport.clone(),
            &config,
        )
        .expect("page starts");
        Self {
            surface,
            scheduler,
            transport,
            app,
        }
    }

    pub fn body(&self) -> MemoryNode {
        self.surface.body_node()
    }

    pub fn form(&self, index: usize) -> &Rc<FormController<MemorySurface>> {
        &self.app.forms()[index]
    }

    pub fn root(&self, index: usize) -> MemoryNode {
        self.form(index).root_node().expect("form is mounted")
    }

    pub fn output(&self, index: usize) -> MemoryNode {
        self.form(index).output_node().expect("form is mounted")
    }

    /// Replaces the input text and activates the submit control. Returns
    /// whether the default navigation was suppressed.
    pub fn submit(&self, index: usize, text: &str) -> bool {
        let input = self.form(index).input_node().expect("form is mounted");
        self.surface.set_input_value(&input, text);
        let form = self.root(index).find_by_tag("form").remove(0);
        self.surface.submit(&form)
    }

    pub fn settle(&self) {
        self.scheduler.run_until_stalled();
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.app
            .sink()
            .container()
            .children()
            .iter()
            .map(MemoryNode::text_content)
            .collect()
    }
}

/// `(label, value tag, value text)` for each row of a result table.
pub fn table_rows(table: &MemoryNode) -> Vec<(String, String, String)> {
    table
        .find_by_tag("tr")
        .iter()
        .map(|row| {
            let cells = row.children();
            let value = cells[1].children().remove(0);
            (
                cells[0].text_content(),
                value.tag().unwrap_or_default().to_string(),
                value.text_content(),
            )
        })
        .collect()
}
