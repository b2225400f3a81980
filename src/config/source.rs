//! Loading configurations from TOML.
//!
//! A [`ConfigSource`] is read through `figment` into a [`RawConfig`],
//! which mirrors the on-disk schema with every name still a string.
//! Converting it into a [`RegistryBuilder`] resolves those names,
//! so a typo surfaces as the specific [`ConfigError`] it corresponds
//! to rather than as a generic deserialization error.
//!
//! Any variable prefixed with `TOARUCONF_` in the environment overrides
//! the matching key of the `[settings]` table, so
//! `TOARUCONF_BINDING_POLICY=strict` sets `settings.binding_policy`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use tracing::debug;

use crate::actions::{ActionDescriptor, LayoutOp, WindowOp};
use crate::bindings::{ButtonIndex, KeyBinding, Keybind, ModMask, MouseBinding, MouseEventKind, Mousebind};
use crate::manager::hooks::{EventKind, HookBinding};
use crate::{ConfigError, Result};

use super::layout::{Layout, Options};
use super::registry::{Group, GroupKeys, RegistryBuilder};
use super::rules::{MatchRule, Predicate, ResolvedProperties};
use super::screen::Screen;
use super::settings::Settings;

/// The prefix of environment variables that override `[settings]`.
pub const ENV_PREFIX: &str = "TOARUCONF_";

/// Where a configuration comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// A TOML file on disk.
    File(PathBuf),
    /// A TOML document held in memory.
    Toml(String),
    /// An already-parsed configuration.
    Raw(RawConfig),
}

impl ConfigSource {
    /// A TOML file on disk.
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self::File(path.into())
    }

    /// A TOML document held in memory.
    pub fn toml<S: Into<String>>(doc: S) -> Self {
        Self::Toml(doc.into())
    }

    /// Reads the source into a [`RawConfig`].
    ///
    /// File and string sources are layered with the environment
    /// overrides; a raw source is returned as-is.
    pub fn load(self) -> Result<RawConfig> {
        let figment = match self {
            ConfigSource::File(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingSource(path));
                }
                debug!(target: "config::source", "reading configuration from {}", path.display());
                Figment::new().merge(Toml::file(path))
            }
            ConfigSource::Toml(doc) => Figment::new().merge(Toml::string(&doc)),
            ConfigSource::Raw(raw) => return Ok(raw),
        };

        let raw = figment
            .merge(Env::prefixed(ENV_PREFIX).map(|key| format!("settings.{}", key).into()))
            .extract()?;
        Ok(raw)
    }
}

/// A configuration as written, before any name is resolved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// The groups, as bare names or tables.
    pub groups: Vec<RawGroup>,
    /// Modifiers for generating per-group keybindings.
    pub group_keys: RawGroupKeys,
    /// General settings.
    pub settings: Settings,
    /// The layouts.
    pub layouts: Vec<RawLayout>,
    /// The keybindings.
    pub keys: Vec<RawKey>,
    /// The mouse bindings.
    pub mouse: Vec<RawMouse>,
    /// The window rules.
    pub rules: Vec<RawRule>,
    /// The hooks.
    pub hooks: Vec<RawHook>,
    /// Options shared by every widget.
    pub widget_defaults: Options,
    /// The screens.
    pub screens: Vec<Screen>,
}

/// A group, either a bare name or a full table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawGroup {
    #[allow(missing_docs)]
    Name(String),
    #[allow(missing_docs)]
    Full {
        name: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        layout: Option<String>,
    },
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawGroupKeys {
    pub switch: Option<Vec<String>>,
    #[serde(rename = "move")]
    pub move_to: Option<Vec<String>>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawLayout {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub options: Options,
}

/// A keybinding, given either as `modifiers` and `key` or as a
/// shorthand `bind = "M-S-q"`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawKey {
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub bind: Option<String>,
    pub action: RawAction,
    #[serde(default, alias = "description")]
    pub desc: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMouse {
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub button: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub action: RawAction,
    #[serde(default)]
    pub start: Option<RawAction>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRule {
    #[serde(rename = "match")]
    pub predicate: RawPredicate,
    #[serde(default)]
    pub floating: bool,
    #[serde(default)]
    pub group: Option<String>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawHook {
    pub event: String,
    #[serde(default)]
    pub actions: Vec<RawAction>,
    #[serde(default)]
    pub when: Option<RawPredicate>,
}

/// A predicate as written: a bare name (`"dialog"`) or a table
/// with a single entry (`{ class = "gitk" }`).
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPredicate {
    Name(String),
    Table(BTreeMap<String, RawPredicateArg>),
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPredicateArg {
    Str(String),
    List(Vec<RawPredicate>),
    Nested(Box<RawPredicate>),
}

/// An action as written: a bare name (`"reload"`) or a table with a
/// single entry (`{ layout = "next" }`).
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAction {
    Name(String),
    Table(BTreeMap<String, RawActionArg>),
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawActionArg {
    Index(u64),
    Str(String),
    List(Vec<String>),
    Spawn(RawSpawn),
    Map(BTreeMap<String, String>),
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSpawn {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub shell: Option<String>,
}

// a predicate or action table must have exactly one entry
fn single<V>(table: BTreeMap<String, V>) -> Option<(String, V)> {
    let mut entries = table.into_iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Some(entry),
        _ => None,
    }
}

impl RawPredicate {
    /// Resolves this into a [`Predicate`].
    pub fn into_predicate(self) -> Result<Predicate> {
        use RawPredicateArg::*;

        let table = match self {
            RawPredicate::Name(name) => {
                return match name.as_str() {
                    "transient" => Ok(Predicate::Transient),
                    "dialog" => Ok(Predicate::Dialog),
                    _ => Err(ConfigError::InvalidPredicate(format!("unknown predicate `{}`", name))),
                }
            }
            RawPredicate::Table(table) => table,
        };

        let (kind, arg) = single(table).ok_or_else(|| {
            ConfigError::InvalidPredicate("a predicate table must have exactly one entry".into())
        })?;

        match (kind.as_str(), arg) {
            ("class", Str(pattern)) => Ok(Predicate::class(pattern)),
            ("title", Str(pattern)) => Ok(Predicate::title(pattern)),
            ("window_type", Str(ty)) => ty
                .parse()
                .map(Predicate::WindowType)
                .map_err(|_| ConfigError::InvalidPredicate(format!("unknown window type `{}`", ty))),
            ("all", List(preds)) => Ok(Predicate::All(convert_all(preds)?)),
            ("any", List(preds)) => Ok(Predicate::Any(convert_all(preds)?)),
            ("not", Str(name)) => Ok(Predicate::Not(Box::new(RawPredicate::Name(name).into_predicate()?))),
            ("not", Nested(pred)) => Ok(Predicate::Not(Box::new(pred.into_predicate()?))),
            (kind, _) => Err(ConfigError::InvalidPredicate(format!(
                "`{}` is not a predicate, or has the wrong argument",
                kind
            ))),
        }
    }
}

fn convert_all(preds: Vec<RawPredicate>) -> Result<Vec<Predicate>> {
    preds.into_iter().map(RawPredicate::into_predicate).collect()
}

impl RawSpawn {
    fn into_action(self) -> Result<ActionDescriptor> {
        match (self.command, self.shell) {
            (Some(command), None) => Ok(ActionDescriptor::spawn(command, self.args)),
            (None, Some(line)) if self.args.is_empty() => Ok(ActionDescriptor::shell(line)),
            _ => Err(ConfigError::InvalidAction(
                "spawn needs exactly one of `command` or `shell`".into(),
            )),
        }
    }
}

impl RawAction {
    /// Resolves this into an [`ActionDescriptor`].
    pub fn into_action(self) -> Result<ActionDescriptor> {
        use RawActionArg::*;

        let table = match self {
            RawAction::Name(name) => {
                return match name.as_str() {
                    "reload" => Ok(ActionDescriptor::Reload),
                    "shutdown" => Ok(ActionDescriptor::Shutdown),
                    _ => Err(ConfigError::InvalidAction(format!("unknown action `{}`", name))),
                }
            }
            RawAction::Table(table) => table,
        };

        let (kind, arg) = single(table).ok_or_else(|| {
            ConfigError::InvalidAction("an action table must have exactly one entry".into())
        })?;

        match (kind.as_str(), arg) {
            // a plain string is split on whitespace; use `shell` for anything that needs quoting
            ("spawn", Str(line)) => {
                let mut argv = line.split_whitespace();
                let command = argv.next().unwrap_or_default();
                Ok(ActionDescriptor::spawn(command, argv))
            }
            ("spawn", List(mut argv)) => {
                if argv.is_empty() {
                    return Err(ConfigError::InvalidAction("empty spawn command".into()));
                }
                let command = argv.remove(0);
                Ok(ActionDescriptor::spawn(command, argv))
            }
            ("spawn", Spawn(spawn)) => spawn.into_action(),
            ("layout", Str(op)) => op
                .parse::<LayoutOp>()
                .map(ActionDescriptor::Layout)
                .map_err(|_| ConfigError::InvalidAction(format!("unknown layout operation `{}`", op))),
            ("window", Str(op)) => op
                .parse::<WindowOp>()
                .map(ActionDescriptor::Window)
                .map_err(|_| ConfigError::InvalidAction(format!("unknown window operation `{}`", op))),
            ("window", Map(map)) => match single(map) {
                Some((op, group)) if op == "to_group" => Ok(ActionDescriptor::Window(WindowOp::ToGroup(group))),
                Some((op, _)) => Err(ConfigError::InvalidAction(format!("unknown window operation `{}`", op))),
                None => Err(ConfigError::InvalidAction("a window operation table must have exactly one entry".into())),
            },
            ("switch_group", Str(group)) => Ok(ActionDescriptor::SwitchGroup(group)),
            ("switch_group", Index(idx)) => Ok(ActionDescriptor::SwitchGroup(idx.to_string())),
            ("to_screen", Index(idx)) => usize::try_from(idx)
                .map(ActionDescriptor::ToScreen)
                .map_err(|_| ConfigError::InvalidAction(format!("screen index {} is out of range", idx))),
            (kind, _) => Err(ConfigError::InvalidAction(format!(
                "`{}` is not an action, or has the wrong argument",
                kind
            ))),
        }
    }
}

impl RawKey {
    fn into_binding(self) -> Result<KeyBinding> {
        let bind = match self.bind {
            Some(spec) if self.key.is_empty() && self.modifiers.is_empty() => spec.parse::<Keybind>()?,
            Some(spec) => {
                return Err(ConfigError::InvalidKeybind(format!(
                    "{}: `bind` cannot be combined with `key` or `modifiers`",
                    spec
                )))
            }
            None => Keybind::new(ModMask::parse(&self.modifiers)?, self.key),
        };
        Ok(KeyBinding::new(bind, self.action.into_action()?).desc(self.desc))
    }
}

impl RawMouse {
    fn into_binding(self) -> Result<MouseBinding> {
        let modmask = ModMask::parse(&self.modifiers)?;
        let button = self
            .button
            .trim()
            .parse::<ButtonIndex>()
            .map_err(|_| ConfigError::UnknownButton(self.button.clone()))?;
        let kind = match self.kind {
            Some(kind) => kind
                .parse::<MouseEventKind>()
                .map_err(|_| invalid!("unknown mouse event kind `{}`", kind))?,
            None => MouseEventKind::Click,
        };

        let mut binding = MouseBinding::new(Mousebind::new(modmask, button, kind), self.action.into_action()?);
        if let Some(start) = self.start {
            binding = binding.on_start(start.into_action()?);
        }
        Ok(binding)
    }
}

impl RawGroupKeys {
    fn into_group_keys(self) -> Result<GroupKeys> {
        Ok(GroupKeys {
            switch: self.switch.map(ModMask::parse).transpose()?,
            move_to: self.move_to.map(ModMask::parse).transpose()?,
        })
    }
}

impl From<RawGroup> for Group {
    fn from(raw: RawGroup) -> Group {
        match raw {
            RawGroup::Name(name) => Group::new(name),
            RawGroup::Full { name, label, layout } => {
                let mut group = Group::new(name);
                if let Some(label) = label {
                    group = group.label(label);
                }
                group.layout = layout;
                group
            }
        }
    }
}

impl From<RawLayout> for Layout {
    fn from(raw: RawLayout) -> Layout {
        let name = raw.name.unwrap_or_else(|| raw.kind.clone());
        Layout {
            name,
            kind: raw.kind,
            options: raw.options,
        }
    }
}

impl TryFrom<RawConfig> for RegistryBuilder {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<RegistryBuilder> {
        let mut builder = RegistryBuilder::new()
            .settings(raw.settings)
            .group_keys(raw.group_keys.into_group_keys()?);

        for group in raw.groups {
            builder = builder.group(Group::from(group));
        }
        for layout in raw.layouts {
            builder = builder.layout(layout.into());
        }
        for key in raw.keys {
            builder = builder.key(key.into_binding()?);
        }
        for mouse in raw.mouse {
            builder = builder.mouse(mouse.into_binding()?);
        }
        for rule in raw.rules {
            let properties = ResolvedProperties {
                floating: rule.floating,
                group: rule.group,
            };
            builder = builder.rule(MatchRule::new(rule.predicate.into_predicate()?, properties));
        }
        for hook in raw.hooks {
            let event = EventKind::parse(&hook.event).ok_or(ConfigError::UnknownEvent(hook.event))?;
            let actions = hook
                .actions
                .into_iter()
                .map(RawAction::into_action)
                .collect::<Result<Vec<_>>>()?;
            let mut binding = HookBinding::new(event, actions);
            if let Some(when) = hook.when {
                binding = binding.when(when.into_predicate()?);
            }
            builder = builder.hook(binding);
        }
        for (key, value) in raw.widget_defaults {
            builder = builder.widget_default(key, value);
        }
        for screen in raw.screens {
            builder = builder.screen(screen);
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::rules;
    use crate::config::settings::BindingPolicy;
    use crate::config::Registry;
    use crate::{WindowMetadata, WindowType};

    fn load(doc: &str) -> Result<Registry> {
        Registry::load(ConfigSource::toml(doc))
    }

    const MINIMAL: &str = r#"
        groups = ["1", "2"]

        [[layouts]]
        kind = "max"
    "#;

    #[test]
    fn test_actions() {
        let doc = format!(
            "{}{}",
            MINIMAL,
            r#"
            [[keys]]
            modifiers = ["mod4"]
            key = "Return"
            action = { spawn = "alacritty -e tmux" }

            [[keys]]
            modifiers = ["mod4", "shift"]
            key = "Print"
            action = { spawn = { shell = "scrot -s '/tmp/%F.png'" } }

            [[keys]]
            modifiers = ["super"]
            key = "d"
            action = { spawn = { command = "rofi", args = ["-show", "drun"] } }

            [[keys]]
            bind = "M-S-1"
            action = { window = { to_group = "1" } }

            [[keys]]
            modifiers = ["alt"]
            key = "Tab"
            action = { layout = "next_layout" }

            [[keys]]
            modifiers = ["mod4"]
            key = "q"
            action = { window = "kill" }

            [[keys]]
            modifiers = ["mod4"]
            key = "comma"
            action = { to_screen = 0 }

            [[keys]]
            modifiers = ["mod4", "control"]
            key = "r"
            action = "reload"
            desc = "Reload the config"
        "#
        );
        let registry = load(&doc).unwrap();
        let action = |mods, key| registry.lookup_key(mods, key).unwrap().action.clone();

        assert_eq!(
            action(ModMask::MOD4, "Return"),
            ActionDescriptor::spawn("alacritty", ["-e", "tmux"])
        );
        assert_eq!(
            action(ModMask::MOD4 | ModMask::SHIFT, "Print"),
            ActionDescriptor::shell("scrot -s '/tmp/%F.png'")
        );
        assert_eq!(action(ModMask::MOD4, "d"), ActionDescriptor::spawn("rofi", ["-show", "drun"]));
        assert_eq!(
            action(ModMask::MOD4 | ModMask::SHIFT, "1"),
            ActionDescriptor::Window(WindowOp::ToGroup("1".into()))
        );
        assert_eq!(action(ModMask::MOD1, "Tab"), ActionDescriptor::Layout(LayoutOp::NextLayout));
        assert_eq!(action(ModMask::MOD4, "q"), ActionDescriptor::Window(WindowOp::Kill));
        assert_eq!(action(ModMask::MOD4, "comma"), ActionDescriptor::ToScreen(0));

        let reload = registry.lookup_key(ModMask::MOD4 | ModMask::CONTROL, "r").unwrap();
        assert_eq!(reload.action, ActionDescriptor::Reload);
        assert_eq!(reload.description, "Reload the config");
    }

    #[test]
    fn test_invalid_actions() {
        let cases = [
            r#"action = "explode""#,
            r#"action = { layout = "sideways" }"#,
            r#"action = { window = "defenestrate" }"#,
            r#"action = { window = { to_screen = "1" } }"#,
            r#"action = { spawn = { command = "a", shell = "b" } }"#,
            r#"action = { layout = "next", window = "kill" }"#,
        ];
        for case in cases {
            let doc = format!("{}\n[[keys]]\nkey = \"x\"\n{}\n", MINIMAL, case);
            let err = load(&doc).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidAction(_)), "{}: {:?}", case, err);
        }
    }

    #[test]
    fn test_unknown_names() {
        let doc = format!("{}{}", MINIMAL, "[[keys]]\nmodifiers = [\"hyper\"]\nkey = \"a\"\naction = \"reload\"\n");
        assert!(matches!(load(&doc).unwrap_err(), ConfigError::UnknownModifier(m) if m == "hyper"));

        let doc = format!("{}{}", MINIMAL, "[[keys]]\nkey = \"\"\naction = \"reload\"\n");
        assert!(matches!(load(&doc).unwrap_err(), ConfigError::EmptyKey(_)));

        let doc = format!("{}{}", MINIMAL, "[[mouse]]\nbutton = \"Button9\"\naction = \"reload\"\n");
        assert!(matches!(load(&doc).unwrap_err(), ConfigError::UnknownButton(b) if b == "Button9"));

        let doc = format!("{}{}", MINIMAL, "[[hooks]]\nevent = \"teardown\"\nactions = []\n");
        assert!(matches!(load(&doc).unwrap_err(), ConfigError::UnknownEvent(e) if e == "teardown"));
    }

    #[test]
    fn test_predicates() {
        let doc = format!(
            "{}{}",
            MINIMAL,
            r#"
            [settings]
            default_float_rules = false

            [[rules]]
            match = { all = [{ class = "steam" }, { not = { title = "Steam" } }] }
            floating = true
            group = "2"

            [[rules]]
            match = { any = ["dialog", "transient", { window_type = "splash" }] }
            floating = true

            [[rules]]
            match = { not = "transient" }
            floating = false
        "#
        );
        let registry = load(&doc).unwrap();
        assert_eq!(registry.rules().len(), 3);

        let friends = WindowMetadata::new().with_class(["steam", "Steam"]).with_title("Friends List");
        let props = registry.resolve(&friends);
        assert!(props.floating);
        assert_eq!(props.group.as_deref(), Some("2"));

        let splash = WindowMetadata::new().with_type(WindowType::Splash);
        assert!(registry.resolve(&splash).floating);
    }

    #[test]
    fn test_invalid_predicates() {
        let cases = [
            r#"match = "fullscreen""#,
            r#"match = { role = "browser" }"#,
            r#"match = { class = "a", title = "b" }"#,
            r#"match = { window_type = "popup" }"#,
            r#"match = { all = "dialog" }"#,
        ];
        for case in cases {
            let doc = format!("{}\n[[rules]]\n{}\nfloating = true\n", MINIMAL, case);
            let err = load(&doc).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPredicate(_)), "{}: {:?}", case, err);
        }
    }

    #[test]
    fn test_groups_hooks_and_mouse() {
        let doc = r#"
            groups = ["1", { name = "web", label = "", layout = "max" }]

            [group_keys]
            switch = ["mod4"]
            move = ["mod4", "shift"]

            [[layouts]]
            kind = "spiral"
            options = { main_pane = "left", ratio = 0.5, new_client_position = "top" }

            [[layouts]]
            kind = "max"

            [[mouse]]
            modifiers = ["mod4"]
            button = "Button1"
            kind = "drag"
            action = { window = "set_position_floating" }
            start = { window = "get_position" }

            [[hooks]]
            event = "startup-once"
            actions = [{ spawn = "/home/me/.config/autostart.sh" }]

            [[hooks]]
            event = "client_new"
            when = "dialog"
            actions = [{ window = "toggle_floating" }]
        "#;
        let registry = load(doc).unwrap();

        let web = registry.group("web").unwrap();
        assert_eq!(web.label, "");
        assert_eq!(web.layout.as_deref(), Some("max"));
        assert_eq!(registry.keybindings().count(), 4);
        assert!(registry.lookup_key(ModMask::MOD4, "web").is_some());

        let drag = registry
            .lookup_mouse(ModMask::MOD4, ButtonIndex::Left, MouseEventKind::Drag)
            .unwrap();
        assert_eq!(drag.start, Some(ActionDescriptor::Window(WindowOp::GetPosition)));

        let hooks: Vec<_> = registry.hooks_for(EventKind::ClientNew).collect();
        assert_eq!(hooks[0].when, Some(Predicate::Dialog));
        assert_eq!(registry.hooks_for(EventKind::StartupOnce).count(), 1);
    }

    #[test]
    fn test_sample_config() {
        let registry = load(include_str!("../../res/config.toml")).unwrap();

        // 26 explicit keys, plus switch and move keys for nine groups
        assert_eq!(registry.keybindings().count(), 44);
        assert_eq!(registry.mousebindings().count(), 3);
        assert_eq!(registry.groups().len(), 9);
        assert_eq!(registry.layouts()[0].name, "spiral");
        assert_eq!(registry.rules().len(), rules::default_float_rules().len() + 8);
        assert!(!registry.settings().auto_minimize);

        assert_eq!(
            registry.lookup_key(ModMask::MOD4, "space").unwrap().action,
            ActionDescriptor::spawn("rofi", ["-show", "drun"])
        );
        assert_eq!(
            registry.lookup_key(ModMask::MOD4 | ModMask::SHIFT, "9").unwrap().action,
            ActionDescriptor::Window(WindowOp::ToGroup("9".into()))
        );

        let gitk = WindowMetadata::new().with_class(["makebranch", "Makebranch"]);
        assert!(registry.resolve(&gitk).floating);
        let askpass = WindowMetadata::new().with_transient(true);
        assert!(registry.resolve(&askpass).floating);
        let terminal = WindowMetadata::new().with_class(["Alacritty", "Alacritty"]).with_title("tmux");
        assert!(!registry.resolve(&terminal).floating);

        let bar = registry.screens()[0].top.as_ref().unwrap();
        assert_eq!(bar.size, 40);
        assert_eq!(bar.widgets.len(), 6);
        assert_eq!(registry.widget_options(&bar.widgets[4])["fontsize"], crate::config::OptionValue::Int(14));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigSource::file("/nonexistent/toaruconf/config.toml").load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSource(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = load("groups = [").unwrap_err();
        assert!(matches!(err, ConfigError::Source(_)));
    }

    #[test]
    fn test_raw_source() {
        let raw = RawConfig {
            groups: vec![RawGroup::Name("1".into())],
            layouts: vec![RawLayout {
                name: None,
                kind: "max".into(),
                options: Options::new(),
            }],
            ..RawConfig::default()
        };
        let registry = Registry::load(ConfigSource::Raw(raw)).unwrap();
        assert_eq!(registry.layouts()[0].name, "max");
    }

    #[test]
    fn test_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", MINIMAL)?;
            jail.set_env("TOARUCONF_BINDING_POLICY", "strict");
            jail.set_env("TOARUCONF_WMNAME", "toaru");
            jail.set_env("TOARUCONF_DEFAULT_FLOAT_RULES", "true");

            let raw = ConfigSource::file("config.toml").load().map_err(|e| e.to_string())?;
            assert_eq!(raw.settings.binding_policy, BindingPolicy::Strict);
            assert_eq!(raw.settings.wmname, "toaru");
            assert!(raw.settings.default_float_rules);
            Ok(())
        });
    }
}
