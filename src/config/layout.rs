//! Layout declarations.
//!
//! ToaruConf does not implement any layout algorithm. A [`Layout`] names
//! an algorithm the host provides (e.g. `spiral`, `max`) along with the
//! options it should be constructed with.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A loosely-typed option value for layouts and widgets.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

/// A set of named options.
pub type Options = BTreeMap<String, OptionValue>;

/// A layout available to every group.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// The name used to refer to this layout.
    pub name: String,
    /// The layout algorithm the host should use.
    pub kind: String,
    /// Options for the algorithm.
    pub options: Options,
}

impl Layout {
    /// Creates a layout whose name is its kind.
    pub fn new<S: Into<String>>(kind: S) -> Self {
        let kind = kind.into();
        Self {
            name: kind.clone(),
            kind,
            options: Options::new(),
        }
    }

    /// Sets the name of the layout.
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets an option.
    pub fn option<K: Into<String>, V: Into<OptionValue>>(mut self, key: K, value: V) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}
