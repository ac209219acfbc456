//! Computation module backed by the wasm-bindgen build of the chemistry
//! crate, loaded with a dynamic `import()`.

use futures_util::future::{FutureExt, LocalBoxFuture};
use js_sys::{Function, Promise, Reflect};
use log::debug;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::{
    BalanceOutput, ComputationModule, EvaluateOutput, ModuleHandle, ModuleRef, ModuleTransport,
    Operation, RawModule,
};
use crate::error::{ModuleError, OperationError};

const EVALUATE_EXPORT: &str = "chem_eval";
const BALANCE_EXPORT: &str = "balance_reaction";

#[wasm_bindgen(inline_js = "export function import_module(url) { return import(url); }")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(url: &str) -> Result<Promise, JsValue>;
}

/// Message of a JS error value: the string itself, `Error.message`, or the
/// debug form of anything else.
pub fn rejection_message(error: &JsValue) -> String {
    if let Some(message) = error.as_string() {
        return message;
    }
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{error:?}")
}

fn rejection(operation: Operation, error: JsValue) -> OperationError {
    if error.as_string().is_some() || error.is_instance_of::<js_sys::Error>() {
        OperationError::Rejected {
            operation,
            message: rejection_message(&error),
        }
    } else {
        OperationError::Unknown(rejection_message(&error))
    }
}

/// Module specifiers are resolved against the page URL, not against the
/// location of the import helper.
fn resolve_url(module_ref: &ModuleRef) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let base = window.location().href()?;
    Ok(web_sys::Url::new_with_base(module_ref.as_str(), &base)?.href())
}

async fn settle(value: JsValue) -> Result<JsValue, JsValue> {
    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await,
        Err(value) => Ok(value),
    }
}

pub struct JsModuleTransport;

impl JsModuleTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsModuleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleTransport for JsModuleTransport {
    fn load(
        &self,
        module_ref: &ModuleRef,
    ) -> LocalBoxFuture<'static, Result<Box<dyn RawModule>, ModuleError>> {
        let module_ref = module_ref.clone();
        async move {
            let load_error = |error: JsValue| ModuleError::Load {
                module_ref: module_ref.clone(),
                message: rejection_message(&error),
            };
            let url = resolve_url(&module_ref).map_err(load_error)?;
            debug!("[JsModuleTransport] importing {url}");
            let promise = import_module(&url).map_err(load_error)?;
            let namespace = JsFuture::from(promise).await.map_err(load_error)?;
            Ok(Box::new(JsRawModule {
                module_ref,
                namespace,
            }) as Box<dyn RawModule>)
        }
        .boxed_local()
    }
}

/// Namespace object of an imported, not yet initialized module.
struct JsRawModule {
    module_ref: ModuleRef,
    namespace: JsValue,
}

impl JsRawModule {
    fn instantiate_error(&self, message: String) -> ModuleError {
        ModuleError::Instantiate {
            module_ref: self.module_ref.clone(),
            message,
        }
    }

    fn export(&self, name: &str) -> Result<Function, ModuleError> {
        Reflect::get(&self.namespace, &JsValue::from_str(name))
            .ok()
            .and_then(|export| export.dyn_into::<Function>().ok())
            .ok_or_else(|| self.instantiate_error(format!("missing export `{name}`")))
    }
}

impl RawModule for JsRawModule {
    fn instantiate(self: Box<Self>) -> LocalBoxFuture<'static, Result<ModuleHandle, ModuleError>> {
        async move {
            // wasm-pack `web` builds export an init function as default.
            let init = Reflect::get(&self.namespace, &JsValue::from_str("default"))
                .map_err(|error| self.instantiate_error(rejection_message(&error)))?;
            if let Some(init) = init.dyn_ref::<Function>() {
                let started = init
                    .call0(&JsValue::UNDEFINED)
                    .map_err(|error| self.instantiate_error(rejection_message(&error)))?;
                settle(started)
                    .await
                    .map_err(|error| self.instantiate_error(rejection_message(&error)))?;
            }
            let module = JsComputationModule {
                evaluate: self.export(EVALUATE_EXPORT)?,
                balance: self.export(BALANCE_EXPORT)?,
            };
            debug!("[JsModuleTransport] `{}` instantiated", self.module_ref);
            Ok(ModuleHandle::new(module))
        }
        .boxed_local()
    }
}

struct JsComputationModule {
    evaluate: Function,
    balance: Function,
}

fn call<T: DeserializeOwned>(
    function: &Function,
    operation: Operation,
    source: &str,
) -> LocalBoxFuture<'static, Result<T, OperationError>> {
    let returned = function.call1(&JsValue::NULL, &JsValue::from_str(source));
    async move {
        let returned = returned.map_err(|error| rejection(operation, error))?;
        let value = settle(returned)
            .await
            .map_err(|error| rejection(operation, error))?;
        serde_wasm_bindgen::from_value(value).map_err(|decode_error| {
            OperationError::Unknown(format!("unexpected {operation} result: {decode_error}"))
        })
    }
    .boxed_local()
}

impl ComputationModule for JsComputationModule {
    fn evaluate(&self, source: &str) -> LocalBoxFuture<'static, Result<EvaluateOutput, OperationError>> {
        call(&self.evaluate, Operation::Evaluate, source)
    }

    fn balance(&self, source: &str) -> LocalBoxFuture<'static, Result<BalanceOutput, OperationError>> {
        call(&self.balance, Operation::Balance, source)
    }
}
