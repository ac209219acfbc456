use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures_util::future::{self, FutureExt, LocalBoxFuture, Shared};
use log::{debug, warn};

use super::{ModuleHandle, ModuleRef};
use crate::error::ModuleError;

type LoadFuture = Shared<LocalBoxFuture<'static, Result<ModuleHandle, ModuleError>>>;

/// Fetches module payloads. Repeated loads of the same reference must be
/// safe; deduplication is the loader's job, not the transport's.
pub trait ModuleTransport {
    fn load(
        &self,
        module_ref: &ModuleRef,
    ) -> LocalBoxFuture<'static, Result<Box<dyn RawModule>, ModuleError>>;
}

/// A fetched module that still has to be instantiated.
pub trait RawModule {
    fn instantiate(self: Box<Self>) -> LocalBoxFuture<'static, Result<ModuleHandle, ModuleError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Absent,
    Loading,
    Ready,
}

enum Slot {
    Loading(LoadFuture),
    Ready(ModuleHandle),
}

/// Lazily loads computation modules, at most one load in flight per
/// reference.
///
/// A resolved handle is cached for the rest of the page session. A failed
/// load is forgotten, so the next request tries again.
pub struct ModuleLoader {
    transport: Rc<dyn ModuleTransport>,
    slots: Rc<RefCell<HashMap<ModuleRef, Slot>>>,
    load_count: Cell<usize>,
}

impl ModuleLoader {
    pub fn new(transport: Rc<dyn ModuleTransport>) -> Self {
        Self {
            transport,
            slots: Rc::new(RefCell::new(HashMap::new())),
            load_count: Cell::new(0),
        }
    }

    /// Resolves to the module behind `module_ref`.
    ///
    /// The first call starts the load; calls made while it is pending share
    /// the same future; calls after it resolved get the cached handle.
    pub fn request(
        &self,
        module_ref: &ModuleRef,
    ) -> LocalBoxFuture<'static, Result<ModuleHandle, ModuleError>> {
        if let Some(slot) = self.slots.borrow().get(module_ref) {
            return match slot {
                Slot::Ready(handle) => future::ready(Ok(handle.clone())).boxed_local(),
                Slot::Loading(load) => load.clone().boxed_local(),
            };
        }

        self.load_count.set(self.load_count.get() + 1);
        debug!(
            "[ModuleLoader] loading `{module_ref}` (load #{})",
            self.load_count.get()
        );
        let raw = self.transport.load(module_ref);
        let slots = Rc::clone(&self.slots);
        let reference = module_ref.clone();
        let load = async move {
            let result = match raw.await {
                Ok(raw) => raw.instantiate().await,
                Err(error) => Err(error),
            };
            let mut slots = slots.borrow_mut();
            match &result {
                Ok(handle) => {
                    debug!("[ModuleLoader] `{reference}` ready");
                    slots.insert(reference, Slot::Ready(handle.clone()));
                }
                Err(error) => {
                    warn!("[ModuleLoader] {error}");
                    slots.remove(&reference);
                }
            }
            result
        }
        .boxed_local()
        .shared();

        self.slots
            .borrow_mut()
            .insert(module_ref.clone(), Slot::Loading(load.clone()));
        load.boxed_local()
    }

    pub fn state(&self, module_ref: &ModuleRef) -> LoadState {
        match self.slots.borrow().get(module_ref) {
            None => LoadState::Absent,
            Some(Slot::Loading(_)) => LoadState::Loading,
            Some(Slot::Ready(_)) => LoadState::Ready,
        }
    }

    /// Number of transport loads started so far.
    pub fn load_count(&self) -> usize {
        self.load_count.get()
    }
}
