use std::fmt::Display;
use std::hash::Hash;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::actions::{ActionDescriptor, WindowOp};
use crate::bindings::{ButtonIndex, KeyBinding, Keybind, ModMask, MouseBinding, MouseEventKind, Mousebind};
use crate::manager::hooks::{EventKind, HookBinding};
use crate::{ConfigError, DuplicateBindingError, Result};

use super::layout::{Layout, OptionValue, Options};
use super::rules::{self, MatchRule, ResolvedProperties, WindowMetadata};
use super::screen::{Screen, Widget};
use super::settings::{BindingPolicy, Settings};
use super::source::ConfigSource;

/// A named group of windows (also known as a workspace).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    /// The name the group is referred to by.
    pub name: String,
    /// The label shown to the user.
    pub label: String,
    /// The layout the group starts with.
    pub layout: Option<String>,
}

impl Group {
    /// Creates a new `Group` whose label is its name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            layout: None,
        }
    }

    /// Sets the label of the group.
    pub fn label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the layout the group starts with.
    pub fn with_layout<S: Into<String>>(mut self, layout: S) -> Self {
        self.layout = Some(layout.into());
        self
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Group {
        Group::new(name)
    }
}

impl From<String> for Group {
    fn from(name: String) -> Group {
        Group::new(name)
    }
}

/// Modifier sets used to generate one pair of keybindings per group.
///
/// For each group, `switch + <name>` switches to the group and
/// `move_to + <name>` sends the focused window there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupKeys {
    /// Modifiers for switching to a group.
    pub switch: Option<ModMask>,
    /// Modifiers for moving the focused window to a group.
    pub move_to: Option<ModMask>,
}

impl GroupKeys {
    fn generate(&self, groups: &[Group]) -> Vec<KeyBinding> {
        let mut keys = Vec::new();
        for group in groups {
            if let Some(mods) = self.switch {
                keys.push(
                    KeyBinding::new(
                        Keybind::new(mods, group.name.as_str()),
                        ActionDescriptor::SwitchGroup(group.name.clone()),
                    )
                    .desc(format!("Switch to group {}", group.name)),
                );
            }
            if let Some(mods) = self.move_to {
                keys.push(
                    KeyBinding::new(
                        Keybind::new(mods, group.name.as_str()),
                        ActionDescriptor::Window(WindowOp::ToGroup(group.name.clone())),
                    )
                    .desc(format!("Move focused window to group {}", group.name)),
                );
            }
        }
        keys
    }
}

/// A validated, immutable configuration snapshot.
///
/// A `Registry` is built either from a [`ConfigSource`] with
/// [`Registry::load`], or programmatically with a [`RegistryBuilder`].
/// Either way it only exists once every invariant has been checked:
///
/// - there is at least one group and at least one layout, all with
///   unique, non-empty names;
/// - every group, layout and modifier referenced anywhere exists;
/// - every keybinding trigger is unique (see [`BindingPolicy`]).
///
/// # Example
///
/// ```rust
/// use toaruconf::config::{Layout, RegistryBuilder};
/// use toaruconf::{ActionDescriptor, ModMask, WindowMetadata};
/// use toaruconf::bindings::{KeyBinding, Keybind};
///
/// let registry = RegistryBuilder::new()
///     .group("1")
///     .group("2")
///     .layout(Layout::new("max"))
///     .key(KeyBinding::new(
///         Keybind::new(ModMask::MOD4, "Return"),
///         ActionDescriptor::spawn("alacritty", Vec::<String>::new()),
///     ))
///     .finish()
///     .expect("invalid registry");
///
/// let binding = registry.lookup_key(ModMask::MOD4, "Return").unwrap();
/// assert!(binding.action.is_external());
/// assert!(!registry.resolve(&WindowMetadata::new()).floating);
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    keys: IndexMap<Keybind, KeyBinding>,
    mouse: IndexMap<Mousebind, MouseBinding>,
    groups: Vec<Group>,
    layouts: Vec<Layout>,
    rules: Vec<MatchRule>,
    hooks: Vec<HookBinding>,
    screens: Vec<Screen>,
    widget_defaults: Options,
    settings: Settings,
}

impl Registry {
    /// Loads and validates a registry from `source`.
    pub fn load(source: ConfigSource) -> Result<Registry> {
        let raw = source.load()?;
        RegistryBuilder::try_from(raw)?.finish()
    }

    /// Returns a [`RegistryBuilder`] to build a registry with the
    /// 'builder' idiom.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up the keybinding for the given modifiers and key.
    pub fn lookup_key(&self, modmask: ModMask, key: &str) -> Option<&KeyBinding> {
        self.keys.get(&Keybind::new(modmask, key))
    }

    /// Looks up the mouse binding for the given modifiers, button and kind.
    pub fn lookup_mouse(
        &self,
        modmask: ModMask,
        button: ButtonIndex,
        kind: MouseEventKind,
    ) -> Option<&MouseBinding> {
        self.mouse.get(&Mousebind::new(modmask, button, kind))
    }

    /// All keybindings, in registration order.
    pub fn keybindings(&self) -> impl Iterator<Item = &KeyBinding> {
        self.keys.values()
    }

    /// All mouse bindings, in registration order.
    pub fn mousebindings(&self) -> impl Iterator<Item = &MouseBinding> {
        self.mouse.values()
    }

    /// The declared groups.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Looks up a group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The declared layouts.
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Looks up a layout by name.
    pub fn layout(&self, name: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.name == name)
    }

    /// The window rules, in evaluation order.
    ///
    /// If the configuration opts in with `default_float_rules`, the
    /// built-in float rules come first.
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    /// All hooks, in registration order.
    pub fn hooks(&self) -> &[HookBinding] {
        &self.hooks
    }

    /// The hooks bound to `event`, in registration order.
    pub fn hooks_for(&self, event: EventKind) -> impl Iterator<Item = &HookBinding> {
        self.hooks.iter().filter(move |h| h.event == event)
    }

    /// The declared screens.
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Options shared by every widget.
    pub fn widget_defaults(&self) -> &Options {
        &self.widget_defaults
    }

    /// The options of `widget`, layered over the widget defaults.
    pub fn widget_options(&self, widget: &Widget) -> Options {
        let mut options = self.widget_defaults.clone();
        options.extend(widget.options.clone());
        options
    }

    /// General settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolves the placement properties of `window`.
    pub fn resolve(&self, window: &WindowMetadata) -> ResolvedProperties {
        rules::resolve(&self.rules, window)
    }
}

/// A const function that simply returns Ok. Pass this into
/// [`RegistryBuilder::finish_with`] if you have no checks of your own to run.
pub const fn no_checks(_: &Registry) -> Result<()> {
    Ok(())
}

/// A helper type to construct a [`Registry`].
///
/// Registration calls can come in any order; nothing is checked until
/// [`finish`](RegistryBuilder::finish) is called.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    keys: Vec<KeyBinding>,
    mouse: Vec<MouseBinding>,
    groups: Vec<Group>,
    group_keys: GroupKeys,
    layouts: Vec<Layout>,
    rules: Vec<MatchRule>,
    hooks: Vec<HookBinding>,
    screens: Vec<Screen>,
    widget_defaults: Options,
    settings: Settings,
}

impl RegistryBuilder {
    /// Creates a new, empty `RegistryBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a keybinding.
    pub fn key(mut self, binding: KeyBinding) -> Self {
        self.keys.push(binding);
        self
    }

    /// Registers a mouse binding.
    pub fn mouse(mut self, binding: MouseBinding) -> Self {
        self.mouse.push(binding);
        self
    }

    /// Declares a group.
    pub fn group<G: Into<Group>>(mut self, group: G) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Sets the modifiers used to generate per-group keybindings.
    pub fn group_keys(mut self, group_keys: GroupKeys) -> Self {
        self.group_keys = group_keys;
        self
    }

    /// Declares a layout.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layouts.push(layout);
        self
    }

    /// Appends a window rule.
    pub fn rule(mut self, rule: MatchRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Registers a hook.
    pub fn hook(mut self, hook: HookBinding) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Declares a screen.
    pub fn screen(mut self, screen: Screen) -> Self {
        self.screens.push(screen);
        self
    }

    /// Sets an option shared by every widget.
    pub fn widget_default<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<OptionValue>,
    {
        self.widget_defaults.insert(key.into(), value.into());
        self
    }

    /// Sets the general settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Finishes construction, validates the result and returns the
    /// registry if validation is successful.
    pub fn finish(self) -> Result<Registry> {
        self.finish_with(no_checks)
    }

    /// Like [`finish`](Self::finish), but runs `check` on the validated
    /// registry as a final step.
    pub fn finish_with<F>(self, check: F) -> Result<Registry>
    where
        F: FnOnce(&Registry) -> Result<()>,
    {
        let RegistryBuilder {
            keys,
            mouse,
            groups,
            group_keys,
            layouts,
            rules,
            hooks,
            screens,
            widget_defaults,
            settings,
        } = self;

        check_names("group", groups.iter().map(|g| g.name.as_str()))?;
        check_names("layout", layouts.iter().map(|l| l.name.as_str()))?;
        for layout in &layouts {
            if layout.kind.trim().is_empty() {
                return Err(invalid!("layout `{}` has no kind", layout.name));
            }
        }
        for group in &groups {
            if let Some(name) = &group.layout {
                if !layouts.iter().any(|l| &l.name == name) {
                    return Err(ConfigError::UnknownLayout(name.clone()));
                }
            }
        }

        let policy = settings.binding_policy;
        let check_action = |action: &ActionDescriptor| -> Result<()> {
            if let ActionDescriptor::Spawn { command, .. } = action {
                if command.trim().is_empty() {
                    return Err(ConfigError::InvalidAction("empty spawn command".into()));
                }
            }
            match action.group() {
                Some(name) if !groups.iter().any(|g| g.name == name) => {
                    Err(ConfigError::UnknownGroup(name.into()))
                }
                _ => Ok(()),
            }
        };

        let mut keymap = IndexMap::new();
        for binding in keys.into_iter().chain(group_keys.generate(&groups)) {
            if binding.bind.key().trim().is_empty() {
                return Err(ConfigError::EmptyKey(format!("keybinding for {}", binding.action)));
            }
            check_action(&binding.action)?;
            insert_binding(&mut keymap, binding.bind.clone(), binding, policy)?;
        }

        let mut mousemap = IndexMap::new();
        for binding in mouse {
            check_action(&binding.action)?;
            if let Some(start) = &binding.start {
                if binding.bind.kind() != MouseEventKind::Drag {
                    return Err(invalid!("{} has a start action but is not a drag", binding.bind));
                }
                check_action(start)?;
            }
            insert_binding(&mut mousemap, binding.bind, binding, policy)?;
        }

        for rule in &rules {
            if let Some(name) = &rule.properties.group {
                if !groups.iter().any(|g| &g.name == name) {
                    return Err(ConfigError::UnknownGroup(name.clone()));
                }
            }
        }
        let rules = if settings.default_float_rules {
            rules::default_float_rules().into_iter().chain(rules).collect()
        } else {
            rules
        };

        for hook in &hooks {
            hook.actions.iter().try_for_each(check_action)?;
        }

        for (idx, screen) in screens.iter().enumerate() {
            for bar in screen.bars() {
                if bar.size == 0 {
                    return Err(invalid!("bar on screen {} has size 0", idx));
                }
                if bar.widgets.iter().any(|w| w.kind.trim().is_empty()) {
                    return Err(invalid!("widget on screen {} has no kind", idx));
                }
            }
        }

        let registry = Registry {
            keys: keymap,
            mouse: mousemap,
            groups,
            layouts,
            rules,
            hooks,
            screens,
            widget_defaults,
            settings,
        };

        check(&registry)?;

        debug!(
            target: "config::registry",
            "registry built: {} keys, {} mouse bindings, {} groups, {} rules, {} hooks",
            registry.keys.len(),
            registry.mouse.len(),
            registry.groups.len(),
            registry.rules.len(),
            registry.hooks.len(),
        );
        Ok(registry)
    }
}

#[allow(clippy::len_zero)]
fn check_names<'a, I>(kind: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::NamespaceConflict(format!("{} with an empty name", kind)));
        }
        if seen.contains(&name) {
            return Err(ConfigError::NamespaceConflict(format!(
                "{} `{}` declared more than once",
                kind, name
            )));
        }
        seen.push(name);
    }
    if seen.len() < 1 {
        return Err(invalid!("at least one {} must be declared", kind));
    }
    Ok(())
}

fn insert_binding<K, V>(map: &mut IndexMap<K, V>, key: K, value: V, policy: BindingPolicy) -> Result<()>
where
    K: Hash + Eq + Display,
{
    if map.contains_key(&key) {
        match policy {
            BindingPolicy::Strict => {
                return Err(DuplicateBindingError {
                    binding: key.to_string(),
                }
                .into())
            }
            BindingPolicy::LastWins => {
                warn!(target: "config::registry", "`{}` is bound more than once, using the last binding", key);
                map.shift_remove(&key);
            }
        }
    }
    map.insert(key, value);
    Ok(())
}
