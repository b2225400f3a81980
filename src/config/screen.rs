//! Screen and bar declarations.
//!
//! These are handed to the host's panel renderer as-is.

use serde::Deserialize;

use super::layout::{OptionValue, Options};

/// A single widget in a bar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Widget {
    /// The kind of widget (e.g. `clock`, `group_box`).
    #[serde(default)]
    pub kind: String,
    /// Widget options, layered over the widget defaults.
    #[serde(default)]
    pub options: Options,
}

impl Widget {
    /// Creates a widget with no options.
    pub fn new<S: Into<String>>(kind: S) -> Self {
        Self {
            kind: kind.into(),
            options: Options::new(),
        }
    }

    /// Sets an option.
    pub fn option<K: Into<String>, V: Into<OptionValue>>(mut self, key: K, value: V) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// A bar placed along one edge of a screen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bar {
    /// The thickness of the bar, in pixels.
    pub size: u32,
    /// The widgets, in display order.
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// A screen and its bars.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Screen {
    /// The bar along the top edge.
    pub top: Option<Bar>,
    /// The bar along the bottom edge.
    pub bottom: Option<Bar>,
}

impl Bar {
    /// Creates a bar with no widgets.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            widgets: Vec::new(),
        }
    }

    /// Appends a widget.
    pub fn widget(mut self, widget: Widget) -> Self {
        self.widgets.push(widget);
        self
    }
}

impl Screen {
    /// Iterates over the bars on this screen.
    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.top.iter().chain(self.bottom.iter())
    }
}
