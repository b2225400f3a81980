//! Types and helpers for configuring a window manager.
//!
//! The central type here is the [`Registry`], an immutable snapshot of
//! everything a configuration declares. It is built either by loading a
//! [`ConfigSource`] or with a [`RegistryBuilder`], and only exists once
//! it has been validated.

mod registry;

pub mod layout;
pub mod rules;
pub mod screen;
pub mod settings;
pub mod source;

#[doc(inline)]
pub use layout::{Layout, OptionValue, Options};
#[doc(inline)]
pub use registry::{no_checks, Group, GroupKeys, Registry, RegistryBuilder};
#[doc(inline)]
pub use screen::{Bar, Screen, Widget};
#[doc(inline)]
pub use settings::{BindingPolicy, FocusOnActivation, Settings};
#[doc(inline)]
pub use source::{ConfigSource, RawConfig};
