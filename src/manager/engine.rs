use std::sync::Arc;

use custom_debug_derive::Debug;
use parking_lot::RwLock;
use tracing::{debug, error, info, instrument};

use crate::actions::{run_actions, ActionDescriptor, ActionExecutionError, ActionExecutor, ErrorHandler};
use crate::bindings::{ButtonIndex, ModMask, MouseBinding, MouseEventKind};
use crate::config::rules::{ResolvedProperties, WindowMetadata};
use crate::config::{ConfigSource, Registry};
use crate::util::log::DefaultErrorHandler;
use crate::Result;

use super::hooks::{EventKind, FiredEvents, HookContext, HookDispatcher};

/// The query interface a host window manager talks to.
///
/// An `Engine` owns the current [`Registry`] snapshot and the
/// [`HookDispatcher`]. Every query works on one complete snapshot:
/// a reload that happens halfway through a query is not observed by it.
///
/// `Engine` is `Send + Sync`, so a host can share it between threads
/// behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    registry: RwLock<Arc<Registry>>,
    dispatcher: HookDispatcher,
    #[debug(skip)]
    handler: Box<dyn ErrorHandler + Send + Sync>,
}

impl Engine {
    /// Creates a new `Engine` with a fresh set of fired events.
    pub fn new(registry: Registry) -> Self {
        Self::with_fired(registry, FiredEvents::new())
    }

    /// Creates a new `Engine` that tracks once-only events in `fired`.
    ///
    /// Pass the same set to every engine that should share a
    /// process lifetime.
    pub fn with_fired(registry: Registry, fired: FiredEvents) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
            dispatcher: HookDispatcher::new(fired),
            handler: Box::new(DefaultErrorHandler),
        }
    }

    /// Loads a registry from `source` and wraps it in a new `Engine`.
    pub fn load(source: ConfigSource) -> Result<Self> {
        Registry::load(source).map(Self::new)
    }

    /// Sets the handler that is called whenever an action fails in
    /// [`run_event`](Self::run_event).
    pub fn set_error_handler<H>(&mut self, handler: H)
    where
        H: ErrorHandler + Send + Sync + 'static,
    {
        self.handler = Box::new(handler);
    }

    /// Returns the current registry snapshot.
    pub fn snapshot(&self) -> Arc<Registry> {
        Arc::clone(&self.registry.read())
    }

    /// The set of once-only events that have already fired.
    pub fn fired(&self) -> &FiredEvents {
        self.dispatcher.fired()
    }

    /// Reloads the configuration from `source`.
    ///
    /// The new registry is built and validated before anything is
    /// swapped. If that fails, the current registry stays active and
    /// the error is returned. The fired set is never touched.
    #[cfg_attr(debug_assertions, instrument(level = "debug", skip(self, source)))]
    pub fn reload(&self, source: ConfigSource) -> Result<()> {
        match Registry::load(source) {
            Ok(registry) => {
                self.replace(registry);
                info!(target: "manager::engine", "configuration reloaded");
                Ok(())
            }
            Err(e) => {
                error!(target: "manager::engine", "reload failed, keeping the current configuration: {}", e);
                Err(e)
            }
        }
    }

    /// Swaps in an already-validated registry, returning the old one.
    pub fn replace(&self, registry: Registry) -> Arc<Registry> {
        std::mem::replace(&mut *self.registry.write(), Arc::new(registry))
    }

    /// Resolves the placement properties of a new window.
    pub fn resolve(&self, window: &WindowMetadata) -> ResolvedProperties {
        self.snapshot().resolve(window)
    }

    /// Returns the actions the host should run for `event`.
    pub fn dispatch(&self, event: EventKind, ctx: &HookContext) -> Vec<ActionDescriptor> {
        let registry = self.snapshot();
        self.dispatcher.dispatch(&registry, event, ctx)
    }

    /// Looks up the action bound to a key press.
    pub fn lookup_key(&self, modmask: ModMask, key: &str) -> Option<ActionDescriptor> {
        let action = self
            .snapshot()
            .lookup_key(modmask, key)
            .map(|binding| binding.action.clone());
        if action.is_none() {
            debug!(target: "manager::engine", "no binding for {}+{}", modmask, key);
        }
        action
    }

    /// Looks up the binding for a mouse event.
    pub fn lookup_mouse(
        &self,
        modmask: ModMask,
        button: ButtonIndex,
        kind: MouseEventKind,
    ) -> Option<MouseBinding> {
        self.snapshot().lookup_mouse(modmask, button, kind).cloned()
    }

    /// Dispatches `event` and runs the resulting actions on `executor`.
    ///
    /// Failing actions are reported to the error handler and do not stop
    /// the ones after them. All errors are returned in order.
    pub fn run_event<E>(&self, executor: &mut E, event: EventKind, ctx: &HookContext) -> Vec<ActionExecutionError>
    where
        E: ActionExecutor + ?Sized,
    {
        let actions = self.dispatch(event, ctx);
        run_actions(executor, &actions, &*self.handler)
    }
}
