//! General settings that don't belong to any other section.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What to do when two bindings share the same trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BindingPolicy {
    /// The binding declared last replaces the earlier one, with a warning.
    #[default]
    LastWins,
    /// Any duplicate is a [`DuplicateBindingError`](crate::DuplicateBindingError).
    Strict,
}

/// How to react when a window asks to be activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FocusOnActivation {
    /// Focus the window if its group is visible, otherwise mark it urgent.
    #[default]
    Smart,
    /// Always focus the window.
    Focus,
    /// Mark the window urgent.
    Urgent,
    /// Ignore the request.
    Never,
}

/// General window manager settings.
///
/// These are not interpreted by ToaruConf beyond `binding_policy` and
/// `default_float_rules`; the host reads the rest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// How duplicate bindings are handled.
    pub binding_policy: BindingPolicy,
    /// Whether to put the built-in float rules ahead of the user's rules.
    ///
    /// Off unless a configuration opts in.
    pub default_float_rules: bool,
    /// Whether the window focus should follow the pointer.
    pub follow_mouse_focus: bool,
    /// Whether clicking a floating window raises it.
    pub bring_front_click: bool,
    /// Whether the pointer warps to the focused window.
    pub cursor_warp: bool,
    /// Whether windows may make themselves fullscreen.
    pub auto_fullscreen: bool,
    /// How window activation requests are handled.
    pub focus_on_window_activation: FocusOnActivation,
    /// Whether to reconfigure screens when outputs change.
    pub reconfigure_screens: bool,
    /// Whether windows may minimize themselves when losing focus.
    pub auto_minimize: bool,
    /// The name the window manager reports to clients.
    pub wmname: String,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            binding_policy: BindingPolicy::LastWins,
            default_float_rules: false,
            follow_mouse_focus: true,
            bring_front_click: false,
            cursor_warp: false,
            auto_fullscreen: true,
            focus_on_window_activation: FocusOnActivation::Smart,
            reconfigure_screens: true,
            auto_minimize: false,
            wmname: "Qtile".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names() {
        assert_eq!("strict".parse::<BindingPolicy>().unwrap(), BindingPolicy::Strict);
        assert_eq!(BindingPolicy::LastWins.to_string(), "last_wins");
        assert_eq!(BindingPolicy::default(), BindingPolicy::LastWins);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert!(!settings.default_float_rules);
        assert!(!settings.auto_minimize);
        assert_eq!(settings.wmname, "Qtile");
        assert!(settings.follow_mouse_focus);
        assert_eq!(settings.focus_on_window_activation, FocusOnActivation::Smart);
    }
}
