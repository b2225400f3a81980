//! Window Rules for use in a config.
//!
//! A [`MatchRule`] pairs a [`Predicate`] with the [`ResolvedProperties`]
//! a window should receive if the predicate holds. Rules are evaluated
//! top-to-bottom by [`resolve`], and the first match wins.

use std::fmt;

use strum::{Display, EnumIter, EnumString};
use tracing::debug;

/// The EWMH window type of a window, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, EnumIter, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WindowType {
    /// A normal top-level window.
    #[default]
    Normal,
    /// A dialog window.
    Dialog,
    /// A small persistent utility window, such as a palette.
    Utility,
    /// A toolbar torn off from the main window.
    Toolbar,
    /// A splash screen.
    Splash,
    /// A torn-off menu.
    Menu,
    /// A notification bubble.
    Notification,
    /// A dock or panel.
    Dock,
    /// The desktop window.
    Desktop,
}

/// A structural description of a window, supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowMetadata {
    /// The components of `WM_CLASS` (usually instance, then class).
    pub wm_class: Vec<String>,
    /// The window title, if it has one.
    pub title: Option<String>,
    /// Whether the window is transient for another window.
    pub transient: bool,
    /// The window type.
    pub window_type: WindowType,
}

impl WindowMetadata {
    /// Creates metadata for a normal, untitled, classless window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `WM_CLASS` components.
    pub fn with_class<I, S>(mut self, class: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wm_class = class.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the title.
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets whether the window is transient.
    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// Sets the window type.
    pub fn with_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    /// Whether the window is a dialog.
    pub fn is_dialog(&self) -> bool {
        self.window_type == WindowType::Dialog
    }
}

/// A string pattern in which `*` matches any run of characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(String);

impl Pattern {
    /// Creates a new `Pattern`.
    pub fn new<S: Into<String>>(pattern: S) -> Self {
        Self(pattern.into())
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether `text` matches this pattern.
    pub fn matches(&self, text: &str) -> bool {
        if !self.0.contains('*') {
            return self.0 == text;
        }
        glob_match(&self.0, text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Pattern {
        Pattern::new(s)
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Pattern {
        Pattern(s)
    }
}

// single-star glob with backtracking to the last star seen
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == '*')
}

/// A predicate over [`WindowMetadata`].
///
/// This is a closed set of kinds; anything else is rejected when a
/// configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Any component of `WM_CLASS` matches the pattern.
    Class(Pattern),
    /// The title matches the pattern.
    Title(Pattern),
    /// The window is transient for another window.
    Transient,
    /// The window is a dialog.
    Dialog,
    /// The window has the given type.
    WindowType(WindowType),
    /// All of the inner predicates hold.
    All(Vec<Predicate>),
    /// At least one of the inner predicates holds.
    Any(Vec<Predicate>),
    /// The inner predicate does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Shorthand for a `Class` predicate.
    pub fn class<P: Into<Pattern>>(pattern: P) -> Self {
        Self::Class(pattern.into())
    }

    /// Shorthand for a `Title` predicate.
    pub fn title<P: Into<Pattern>>(pattern: P) -> Self {
        Self::Title(pattern.into())
    }

    /// Evaluates the predicate against `window`.
    pub fn matches(&self, window: &WindowMetadata) -> bool {
        use Predicate::*;
        match self {
            Class(p) => window.wm_class.iter().any(|c| p.matches(c)),
            Title(p) => window.title.as_deref().is_some_and(|t| p.matches(t)),
            Transient => window.transient,
            Dialog => window.is_dialog(),
            WindowType(ty) => window.window_type == *ty,
            All(preds) => preds.iter().all(|p| p.matches(window)),
            Any(preds) => preds.iter().any(|p| p.matches(window)),
            Not(pred) => !pred.matches(window),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Predicate::*;
        let join = |preds: &[Predicate]| {
            preds
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Class(p) => write!(f, "class == {}", p),
            Title(p) => write!(f, "title == {}", p),
            Transient => write!(f, "transient"),
            Dialog => write!(f, "dialog"),
            WindowType(ty) => write!(f, "type == {}", ty),
            All(preds) => write!(f, "all({})", join(preds)),
            Any(preds) => write!(f, "any({})", join(preds)),
            Not(pred) => write!(f, "not({})", pred),
        }
    }
}

/// The placement properties resolved for a window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolvedProperties {
    /// Whether the window should be exempt from tiling.
    pub floating: bool,
    /// The group the window should be sent to, if any.
    pub group: Option<String>,
}

impl ResolvedProperties {
    /// Properties that only set the floating flag.
    pub fn floating(floating: bool) -> Self {
        Self {
            floating,
            group: None,
        }
    }

    /// Sets the group to send the window to.
    pub fn in_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A rule that can be applied to windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    /// The predicate a window must satisfy.
    pub predicate: Predicate,
    /// The properties applied when it does.
    pub properties: ResolvedProperties,
}

impl MatchRule {
    /// Creates a new `MatchRule`.
    pub fn new(predicate: Predicate, properties: ResolvedProperties) -> Self {
        Self {
            predicate,
            properties,
        }
    }

    /// A rule that makes matching windows float.
    pub fn float(predicate: Predicate) -> Self {
        Self::new(predicate, ResolvedProperties::floating(true))
    }
}

/// Resolves the properties of `window` against `rules`.
///
/// Rules are evaluated in order; the properties of the first rule whose
/// predicate holds are returned. If none match, the default properties
/// (not floating, no group) are returned.
pub fn resolve(rules: &[MatchRule], window: &WindowMetadata) -> ResolvedProperties {
    match rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.predicate.matches(window))
    {
        Some((idx, rule)) => {
            debug!(
                target: "config::rules",
                "window {:?} matched rule #{} ({})", window.wm_class, idx, rule.predicate
            );
            rule.properties.clone()
        }
        None => ResolvedProperties::default(),
    }
}

/// The rules that float common transient window types.
///
/// These make utility, notification, toolbar, splash and dialog windows
/// float, along with a handful of well-known progress and error windows
/// identified by class.
pub fn default_float_rules() -> Vec<MatchRule> {
    use WindowType::*;

    let types = [Utility, Notification, Toolbar, Splash, Dialog]
        .into_iter()
        .map(Predicate::WindowType);
    let classes = [
        "file_progress",
        "confirm",
        "dialog",
        "download",
        "error",
        "notification",
        "splash",
        "toolbar",
    ]
    .into_iter()
    .map(Predicate::class);

    types.chain(classes).map(MatchRule::float).collect()
}
