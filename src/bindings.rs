//! Types for parsing and creating key and mouse bindings.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

use crate::actions::ActionDescriptor;
use crate::{ConfigError, Result};

/// A type representing a modifier key tied to a certain keybind.
///
/// Modifier names are parsed case-insensitively. Besides the
/// X protocol names (`shift`, `lock`, `control`, `mod1` to `mod5`),
/// the usual aliases are accepted: `ctrl`, `alt`, `super`, `meta`
/// and `win`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Modifier {
    /// The Shift key.
    Shift,
    /// The Capslock key.
    Lock,
    /// The Control key.
    #[strum(to_string = "control", serialize = "ctrl")]
    Control,
    /// The Alt key.
    #[strum(to_string = "mod1", serialize = "alt")]
    Mod1,
    /// The Numlock key.
    Mod2,
    /// Whatever the X server has assigned MOD3 to.
    Mod3,
    /// The Super/Meta/Windows key.
    #[strum(to_string = "mod4", serialize = "super", serialize = "meta", serialize = "win")]
    Mod4,
    /// Whatever the X server has assigned MOD5 to.
    Mod5,
}

bitflags! {

/// Bitmask representing one or a combination of modifier keys.
///
/// Bit values follow the X Server Protocol definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModMask: u16 {
    /// The Shift key.
    const SHIFT   = 1 << 0;
    /// The Capslock key.
    const LOCK    = 1 << 1;
    /// The Control key.
    const CONTROL = 1 << 2;
    /// The Alt key.
    const MOD1    = 1 << 3;
    /// The Numlock key.
    const MOD2    = 1 << 4;
    /// The MOD3 key.
    const MOD3    = 1 << 5;
    /// The Super/Meta/Windows key.
    const MOD4    = 1 << 6;
    /// The MOD5 key.
    const MOD5    = 1 << 7;
}

}

impl From<Modifier> for ModMask {
    fn from(from: Modifier) -> ModMask {
        match from {
            Modifier::Shift => ModMask::SHIFT,
            Modifier::Lock => ModMask::LOCK,
            Modifier::Control => ModMask::CONTROL,
            Modifier::Mod1 => ModMask::MOD1,
            Modifier::Mod2 => ModMask::MOD2,
            Modifier::Mod3 => ModMask::MOD3,
            Modifier::Mod4 => ModMask::MOD4,
            Modifier::Mod5 => ModMask::MOD5,
        }
    }
}

impl FromIterator<Modifier> for ModMask {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> ModMask {
        iter.into_iter()
            .fold(ModMask::empty(), |acc, m| acc | ModMask::from(m))
    }
}

#[doc(hidden)]
impl From<Vec<Modifier>> for ModMask {
    fn from(from: Vec<Modifier>) -> ModMask {
        from.into_iter().collect()
    }
}

impl ModMask {
    /// Parses a list of modifier names into a `ModMask`.
    ///
    /// Fails with [`ConfigError::UnknownModifier`] on the first
    /// name that is not a known modifier.
    pub fn parse<I, S>(names: I) -> Result<ModMask>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(ModMask::empty(), |acc, name| {
            let name = name.as_ref();
            Modifier::from_str(name.trim())
                .map(|m| acc | ModMask::from(m))
                .map_err(|_| ConfigError::UnknownModifier(name.into()))
        })
    }

    /// Returns the individual modifiers set in this mask.
    pub fn modifiers(self) -> impl Iterator<Item = Modifier> {
        Modifier::iter().filter(move |m| self.contains(ModMask::from(*m)))
    }
}

impl fmt::Display for ModMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = self.modifiers().map(|m| m.into()).collect();
        write!(f, "{}", names.join("+"))
    }
}

/// The name of a key, as it would be given to the host's keymap (e.g. `Return`, `a`, `Print`).
pub type KeyName = String;

/// A type representing a mouse button tied to a certain mousebind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ButtonIndex {
    /// The left mouse button.
    #[strum(to_string = "Button1", serialize = "left")]
    Left,
    /// The middle mouse button (clicking the scroll wheel).
    #[strum(to_string = "Button2", serialize = "middle")]
    Middle,
    /// The right mouse button.
    #[strum(to_string = "Button3", serialize = "right")]
    Right,
    /// Scroll wheel up.
    #[strum(to_string = "Button4", serialize = "scrollup")]
    Button4,
    /// Scroll wheel down.
    #[strum(to_string = "Button5", serialize = "scrolldown")]
    Button5,
}

/// The kind of mouse interaction a mousebind reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MouseEventKind {
    /// A single press of the button.
    Click,
    /// Pressing the button and moving the pointer.
    Drag,
}

/// The trigger of a keybinding: a set of modifiers and a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keybind {
    pub(crate) modmask: ModMask,
    pub(crate) key: KeyName,
}

impl Keybind {
    /// Creates new `Keybind`.
    pub fn new<M: Into<ModMask>, K: Into<KeyName>>(modifiers: M, key: K) -> Self {
        Self {
            modmask: modifiers.into(),
            key: key.into(),
        }
    }

    /// The modifiers of this keybind.
    pub fn modmask(&self) -> ModMask {
        self.modmask
    }

    /// The key of this keybind.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for Keybind {
    type Err = ConfigError;

    /// Parses a string as a keybinding.
    ///
    /// Follows the format "mod-key"
    ///
    /// Ctrl = C,
    /// Shift = S,
    /// Alt = A,
    /// Meta = M,
    fn from_str(kb: &str) -> Result<Keybind> {
        let mut modifiers: Vec<Modifier> = Vec::new();

        /* if None, we know that no key was specified,
        which is an error */
        let mut key: Option<&str> = None;
        for token in kb.split('-') {
            if let Some(k) = key {
                return Err(ConfigError::InvalidKeybind(format!(
                    "{}: `{}` is not a modifier",
                    kb, k
                )));
            }
            match token {
                "C" => modifiers.push(Modifier::Control),
                "S" => modifiers.push(Modifier::Shift),
                "A" => modifiers.push(Modifier::Mod1),
                "M" => modifiers.push(Modifier::Mod4),
                "" => return Err(ConfigError::EmptyKey(format!("keybind `{}`", kb))),
                n => key = Some(n),
            }
        }

        key.map(|k| Keybind::new(modifiers, k))
            .ok_or_else(|| ConfigError::InvalidKeybind(format!("{}: missing key", kb)))
    }
}

impl fmt::Display for Keybind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modmask.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modmask, self.key)
        }
    }
}

/// The trigger of a mouse binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mousebind {
    pub(crate) modmask: ModMask,
    pub(crate) button: ButtonIndex,
    pub(crate) kind: MouseEventKind,
}

impl Mousebind {
    /// Creates a new Mousebind.
    pub fn new<M: Into<ModMask>>(modifiers: M, button: ButtonIndex, kind: MouseEventKind) -> Self {
        Self {
            modmask: modifiers.into(),
            button,
            kind,
        }
    }

    /// The modifiers of this mousebind.
    pub fn modmask(&self) -> ModMask {
        self.modmask
    }

    /// The button of this mousebind.
    pub fn button(&self) -> ButtonIndex {
        self.button
    }

    /// Whether this mousebind reacts to clicks or drags.
    pub fn kind(&self) -> MouseEventKind {
        self.kind
    }
}

impl fmt::Display for Mousebind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modmask.is_empty() {
            write!(f, "{} {}", self.kind, self.button)
        } else {
            write!(f, "{} {}+{}", self.kind, self.modmask, self.button)
        }
    }
}

/// Convenience function for constructing a keybind.
pub fn kb(modmask: Vec<Modifier>, key: &str) -> Keybind {
    Keybind::new(modmask, key)
}

/// Convenience function for constructing a mousebind.
pub fn mb(modmask: Vec<Modifier>, button: ButtonIndex, kind: MouseEventKind) -> Mousebind {
    Mousebind::new(modmask, button, kind)
}

/// A keybind together with the action it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    /// The keys that trigger this binding.
    pub bind: Keybind,
    /// The action the host should run.
    pub action: ActionDescriptor,
    /// A human-readable description.
    pub description: String,
}

impl KeyBinding {
    /// Creates a new `KeyBinding` with an empty description.
    pub fn new(bind: Keybind, action: ActionDescriptor) -> Self {
        Self {
            bind,
            action,
            description: String::new(),
        }
    }

    /// Sets the description of this binding.
    pub fn desc<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }
}

/// A mousebind together with the action it resolves to.
///
/// Drag bindings may carry a `start` action, which the host runs
/// once when the drag begins (e.g. to record the window position).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseBinding {
    /// The button and modifiers that trigger this binding.
    pub bind: Mousebind,
    /// The action the host should run.
    pub action: ActionDescriptor,
    /// The action to run when a drag starts.
    pub start: Option<ActionDescriptor>,
}

impl MouseBinding {
    /// Creates a new `MouseBinding` without a start action.
    pub fn new(bind: Mousebind, action: ActionDescriptor) -> Self {
        Self {
            bind,
            action,
            start: None,
        }
    }

    /// Sets the action to run when the drag starts.
    pub fn on_start(mut self, start: ActionDescriptor) -> Self {
        self.start = Some(start);
        self
    }
}

/// Two bindings were declared with the same trigger while the
/// strict binding policy was active.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate binding for `{binding}`")]
pub struct DuplicateBindingError {
    /// The trigger that was bound twice.
    pub binding: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifiers() {
        let mask = ModMask::parse(["mod4", "Shift"]).unwrap();
        assert_eq!(mask, ModMask::MOD4 | ModMask::SHIFT);

        let aliases = ModMask::parse(["super", "alt", "ctrl"]).unwrap();
        assert_eq!(aliases, ModMask::MOD4 | ModMask::MOD1 | ModMask::CONTROL);

        assert!(ModMask::parse(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_unknown_modifier() {
        let err = ModMask::parse(["mod4", "hyperdrive"]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModifier(m) if m == "hyperdrive"));
    }

    #[test]
    fn test_parse_keybind() {
        let modshift_down: Keybind = "M-S-Down".parse().unwrap();
        let modshift_a: Keybind = "M-S-a".parse().unwrap();
        let ctrl_alt_del: Keybind = "C-A-Delete".parse().unwrap();

        let mod4 = Modifier::Mod4;
        let shift = Modifier::Shift;

        assert_eq!(modshift_down, kb(vec![mod4, shift], "Down"));
        assert_eq!(modshift_a, kb(vec![shift, mod4], "a"));
        assert_eq!(
            ctrl_alt_del,
            kb(vec![Modifier::Control, Modifier::Mod1], "Delete")
        );
    }

    #[test]
    fn test_parse_invalid_keybind() {
        assert!(matches!(
            "M-S".parse::<Keybind>(),
            Err(ConfigError::InvalidKeybind(_))
        ));
        assert!(matches!(
            "M-".parse::<Keybind>(),
            Err(ConfigError::EmptyKey(_))
        ));
        assert!(matches!(
            "M-a-b".parse::<Keybind>(),
            Err(ConfigError::InvalidKeybind(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(kb(vec![Modifier::Mod4, Modifier::Shift], "q").to_string(), "shift+mod4+q");
        assert_eq!(kb(vec![], "Print").to_string(), "Print");
        assert_eq!(
            mb(vec![Modifier::Mod4], ButtonIndex::Left, MouseEventKind::Drag).to_string(),
            "drag mod4+Button1"
        );
    }

    #[test]
    fn test_parse_buttons() {
        assert_eq!("Button1".parse::<ButtonIndex>().unwrap(), ButtonIndex::Left);
        assert_eq!("button3".parse::<ButtonIndex>().unwrap(), ButtonIndex::Right);
        assert_eq!("middle".parse::<ButtonIndex>().unwrap(), ButtonIndex::Middle);
        assert!("Button9".parse::<ButtonIndex>().is_err());
    }
}
