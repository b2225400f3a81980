//! Lifecycle hooks and the dispatcher that resolves them.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::actions::ActionDescriptor;
use crate::config::rules::{Predicate, WindowMetadata};
use crate::config::Registry;

/// A lifecycle event reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventKind {
    /// The window manager started for the first time in this process.
    StartupOnce,
    /// The window manager started or restarted.
    Startup,
    /// Startup has finished.
    StartupComplete,
    /// The window manager is shutting down.
    Shutdown,
    /// A new window appeared.
    ClientNew,
    /// A new window is now managed.
    ClientManaged,
    /// A window was closed.
    ClientKilled,
    /// A window received focus.
    ClientFocus,
    /// The current group changed.
    SetGroup,
    /// The current layout changed.
    LayoutChange,
    /// The screen configuration changed.
    ScreenChange,
}

impl EventKind {
    /// Parses an event name, accepting both `snake_case` and `kebab-case`.
    pub fn parse(name: &str) -> Option<EventKind> {
        name.trim().replace('-', "_").parse().ok()
    }

    /// Whether this event fires at most once per process lifetime.
    pub fn is_once(self) -> bool {
        matches!(self, EventKind::StartupOnce)
    }
}

/// A list of actions bound to a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookBinding {
    /// The event that triggers this hook.
    pub event: EventKind,
    /// The actions to run, in order.
    pub actions: Vec<ActionDescriptor>,
    /// If set, the hook only applies when the context window matches.
    pub when: Option<Predicate>,
}

impl HookBinding {
    /// Creates a new unconditional hook.
    pub fn new<I>(event: EventKind, actions: I) -> Self
    where
        I: IntoIterator<Item = ActionDescriptor>,
    {
        Self {
            event,
            actions: actions.into_iter().collect(),
            when: None,
        }
    }

    /// Restricts the hook to windows matching `predicate`.
    pub fn when(mut self, predicate: Predicate) -> Self {
        self.when = Some(predicate);
        self
    }

    /// Whether this hook applies in the given context.
    ///
    /// A conditional hook never applies when there is no window in the context.
    pub fn applies_to(&self, ctx: &HookContext) -> bool {
        match (&self.when, &ctx.window) {
            (None, _) => true,
            (Some(pred), Some(window)) => pred.matches(window),
            (Some(_), None) => false,
        }
    }
}

/// Macro for creating a hook that can be registered with a [`RegistryBuilder`].
///
/// ## Example
/// ```rust
/// use toaruconf::{hook, ActionDescriptor, EventKind};
///
/// let autostart = hook!(EventKind::StartupOnce => [
///     ActionDescriptor::spawn("/home/me/.config/autostart.sh", Vec::<String>::new()),
/// ]);
///
/// assert_eq!(autostart.actions.len(), 1);
/// ```
///
/// [`RegistryBuilder`]: crate::RegistryBuilder
#[macro_export]
macro_rules! hook {
    ($event:expr => [$($action:expr),* $(,)?]) => {
        $crate::manager::hooks::HookBinding::new($event, vec![$($action),*])
    };
}

/// Context supplied by the host alongside an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookContext {
    /// The window the event concerns, if any.
    pub window: Option<WindowMetadata>,
}

impl HookContext {
    /// A context concerning a single window.
    pub fn with_window(window: WindowMetadata) -> Self {
        Self {
            window: Some(window),
        }
    }
}

/// The set of once-only events that have already fired.
///
/// Clones share the same underlying set. The set lives as long as the
/// process holds on to it; reloading the configuration does not touch it.
#[derive(Debug, Clone, Default)]
pub struct FiredEvents {
    inner: Arc<Mutex<HashSet<EventKind>>>,
}

impl FiredEvents {
    /// Creates a new, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `event` has already fired.
    pub fn has_fired(&self, event: EventKind) -> bool {
        self.inner.lock().contains(&event)
    }

    /// Marks `event` as fired, returning whether this is the first time.
    pub fn mark(&self, event: EventKind) -> bool {
        self.inner.lock().insert(event)
    }

    /// Forgets every fired event.
    pub fn reset(&self) {
        self.inner.lock().clear()
    }
}

/// Resolves lifecycle events into action sequences.
#[derive(Debug, Clone, Default)]
pub struct HookDispatcher {
    fired: FiredEvents,
}

impl HookDispatcher {
    /// Creates a new dispatcher tracking once-only events in `fired`.
    pub fn new(fired: FiredEvents) -> Self {
        Self { fired }
    }

    /// The set of once-only events this dispatcher has fired.
    pub fn fired(&self) -> &FiredEvents {
        &self.fired
    }

    /// Returns the actions bound to `event` in `registry`.
    ///
    /// The actions of every applicable hook are concatenated in
    /// registration order. A once-only event returns its actions the
    /// first time it is dispatched and nothing afterwards.
    pub fn dispatch(
        &self,
        registry: &Registry,
        event: EventKind,
        ctx: &HookContext,
    ) -> Vec<ActionDescriptor> {
        if event.is_once() && !self.fired.mark(event) {
            debug!(target: "manager::hooks", "{} has already fired", event);
            return Vec::new();
        }

        let actions: Vec<ActionDescriptor> = registry
            .hooks_for(event)
            .filter(|hook| hook.applies_to(ctx))
            .flat_map(|hook| hook.actions.iter().cloned())
            .collect();

        debug!(target: "manager::hooks", "{} resolved to {} action(s)", event, actions.len());
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::rules::WindowType;
    use crate::config::{Layout, RegistryBuilder};
    use crate::ActionDescriptor as Action;

    fn registry() -> Registry {
        RegistryBuilder::new()
            .group("1")
            .layout(Layout::new("max"))
            .hook(hook!(EventKind::StartupOnce => [Action::spawn("autostart.sh", Vec::<String>::new())]))
            .hook(hook!(EventKind::Startup => [Action::spawn("xsetroot", ["-cursor_name", "left_ptr"])]))
            .hook(hook!(EventKind::Startup => [Action::SwitchGroup("1".into())]))
            .hook(
                hook!(EventKind::ClientNew => [Action::Window(crate::WindowOp::ToggleFloating)])
                    .when(Predicate::Dialog),
            )
            .finish()
            .unwrap()
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::parse("startup_once"), Some(EventKind::StartupOnce));
        assert_eq!(EventKind::parse("startup-once"), Some(EventKind::StartupOnce));
        assert_eq!(EventKind::parse("Client_New"), Some(EventKind::ClientNew));
        assert_eq!(EventKind::parse("teardown"), None);
        assert_eq!(EventKind::ClientKilled.to_string(), "client_killed");
    }

    #[test]
    fn test_startup_once_fires_once() {
        let registry = registry();
        let dispatcher = HookDispatcher::new(FiredEvents::new());
        let ctx = HookContext::default();

        let first = dispatcher.dispatch(&registry, EventKind::StartupOnce, &ctx);
        let second = dispatcher.dispatch(&registry, EventKind::StartupOnce, &ctx);

        assert_eq!(first, vec![Action::spawn("autostart.sh", Vec::<String>::new())]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_fired_set_is_shared() {
        let registry = registry();
        let fired = FiredEvents::new();
        let a = HookDispatcher::new(fired.clone());
        let b = HookDispatcher::new(fired.clone());
        let ctx = HookContext::default();

        assert_eq!(a.dispatch(&registry, EventKind::StartupOnce, &ctx).len(), 1);
        assert!(b.dispatch(&registry, EventKind::StartupOnce, &ctx).is_empty());
        assert!(fired.has_fired(EventKind::StartupOnce));

        fired.reset();
        assert_eq!(b.dispatch(&registry, EventKind::StartupOnce, &ctx).len(), 1);
    }

    #[test]
    fn test_repeatable_events_concatenate_in_order() {
        let registry = registry();
        let dispatcher = HookDispatcher::default();
        let ctx = HookContext::default();

        let expected = vec![
            Action::spawn("xsetroot", ["-cursor_name", "left_ptr"]),
            Action::SwitchGroup("1".into()),
        ];
        assert_eq!(dispatcher.dispatch(&registry, EventKind::Startup, &ctx), expected);
        assert_eq!(dispatcher.dispatch(&registry, EventKind::Startup, &ctx), expected);
        assert!(dispatcher.dispatch(&registry, EventKind::Shutdown, &ctx).is_empty());
    }

    #[test]
    fn test_conditional_hooks() {
        let registry = registry();
        let dispatcher = HookDispatcher::default();

        let dialog = HookContext::with_window(WindowMetadata::new().with_type(WindowType::Dialog));
        let normal = HookContext::with_window(WindowMetadata::new());

        assert_eq!(dispatcher.dispatch(&registry, EventKind::ClientNew, &dialog).len(), 1);
        assert!(dispatcher.dispatch(&registry, EventKind::ClientNew, &normal).is_empty());
        assert!(dispatcher
            .dispatch(&registry, EventKind::ClientNew, &HookContext::default())
            .is_empty());
    }
}
