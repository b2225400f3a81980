//! # ToaruConf - A certain configuration
//!
//! ToaruConf is the declarative half of a window manager: it holds everything a user writes in
//! their config file (keybindings, mouse bindings, groups, layouts, window rules, hooks, bars)
//! and turns it into a validated, immutable [`Registry`] that a host window manager can query
//! while it runs.
//!
//! ToaruConf never does anything by itself. It does not spawn processes, move windows, or talk
//! to the X server or a Wayland compositor. Every query it answers returns data: an
//! [`ActionDescriptor`] (or a list of them) describing what the host should do, or a set of
//! [`ResolvedProperties`] describing how a new window should be placed.
//!
//! ## Design
//!
//! There are three moving parts:
//!
//! - The [`Registry`], built once from a [`ConfigSource`] (a TOML file, a TOML string, or an
//!   in-memory [`RawConfig`]) or from a [`RegistryBuilder`].
//! - The matcher in [`config::rules`], which evaluates [`MatchRule`]s against the
//!   [`WindowMetadata`] the host supplies for every new window.
//! - The [`HookDispatcher`], which maps lifecycle events to ordered action lists, and makes
//!   sure that `startup_once` hooks only ever fire once.
//!
//! These are tied together by the [`Engine`], which owns the current registry snapshot and
//! swaps it atomically when the configuration is reloaded.
//!
//! ### A Basic Example
//!
//! ```no_run
//! use toaruconf::{Engine, ConfigSource, EventKind, HookContext, WindowMetadata};
//!
//! let engine = Engine::load(ConfigSource::file("config.toml")).expect("bad config");
//!
//! // the host reports a new window
//! let window = WindowMetadata::new().with_class(["ssh-askpass", "SshAskpass"]);
//! let props = engine.resolve(&window);
//! println!("floating: {}", props.floating);
//!
//! // the host reports startup
//! for action in engine.dispatch(EventKind::StartupOnce, &HookContext::default()) {
//!     println!("host should run {}", action);
//! }
//! ```
//!
//! ## Reloading
//!
//! A reload builds a completely new registry and only swaps it in once it has validated. If the
//! new configuration is invalid, the old one stays active and the error is returned to the host.

#![warn(
    missing_debug_implementations,
    missing_docs
)]

#[macro_use]
mod log;

pub mod actions;
pub mod bindings;
pub mod config;
pub mod manager;
pub mod util;

#[doc(inline)]
pub use crate::actions::{
    run_actions, ActionDescriptor, ActionExecutionError, ActionExecutor, ErrorHandler, LayoutOp, WindowOp,
};
#[doc(inline)]
pub use crate::bindings::{DuplicateBindingError, Keybind, ModMask, Modifier, Mousebind};
#[doc(inline)]
pub use crate::config::{
    rules::{MatchRule, Predicate, ResolvedProperties, WindowMetadata, WindowType},
    ConfigSource, RawConfig, Registry, RegistryBuilder,
};
#[doc(inline)]
pub use crate::manager::{
    hooks::{EventKind, FiredEvents, HookBinding, HookContext, HookDispatcher},
    Engine,
};

use std::path::PathBuf;

use thiserror::Error;

/// Everything that could go wrong while loading a configuration.
///
/// Any of these is fatal to a load: no registry is produced, and if a
/// registry was already active it stays active.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A modifier name that does not correspond to any known modifier.
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),

    /// A binding declared with an empty key name.
    #[error("empty key name in {0}")]
    EmptyKey(String),

    /// A keybind shorthand string could not be parsed.
    #[error("invalid keybind `{0}`")]
    InvalidKeybind(String),

    /// A mouse button name that does not correspond to any known button.
    #[error("unknown mouse button `{0}`")]
    UnknownButton(String),

    /// A window-matching predicate of an unknown kind or shape.
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    /// An action that could not be parsed.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// A hook bound to an unknown lifecycle event.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    /// A reference to a group that was never declared.
    #[error("unknown group `{0}`")]
    UnknownGroup(String),

    /// A reference to a layout that was never declared.
    #[error("unknown layout `{0}`")]
    UnknownLayout(String),

    /// Two bindings with the same trigger under the strict binding policy.
    #[error(transparent)]
    DuplicateBinding(#[from] DuplicateBindingError),

    /// A name conflict among groups or layouts.
    #[error("namespace conflict: {0}")]
    NamespaceConflict(String),

    /// A configuration file that does not exist.
    #[error("configuration file {0} does not exist")]
    MissingSource(PathBuf),

    /// The configuration source could not be read or deserialized.
    #[error(transparent)]
    Source(Box<figment::Error>),

    /// One or more configuration invariants was not upheld.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> ConfigError {
        ConfigError::Source(Box::new(e))
    }
}

/// The general result type used by ToaruConf.
pub type Result<T> = ::core::result::Result<T, ConfigError>;
