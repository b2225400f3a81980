//! The engine a host window manager queries, and associated modules.

/// Macros and storage types for lifecycle hooks.
pub mod hooks;

mod engine;

#[doc(inline)]
pub use engine::Engine;
#[doc(inline)]
pub use hooks::{EventKind, FiredEvents, HookBinding, HookContext, HookDispatcher};
