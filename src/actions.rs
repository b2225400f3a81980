//! Action descriptors and the interface a host uses to execute them.
//!
//! An [`ActionDescriptor`] is pure data: it describes something the host
//! window manager should do. ToaruConf never executes one itself; the
//! host supplies an [`ActionExecutor`] and runs the descriptors it gets
//! back from the engine, either directly or through [`run_actions`].

use std::fmt;

use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::debug;

/// An effect to be executed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionDescriptor {
    /// Spawn a process and forget about it.
    Spawn {
        /// The program to run.
        command: String,
        /// Arguments passed to the program.
        args: Vec<String>,
    },
    /// Invoke an operation on the current layout.
    Layout(LayoutOp),
    /// Invoke an operation on the focused window.
    Window(WindowOp),
    /// Switch the focused screen to the named group.
    SwitchGroup(String),
    /// Move focus to the screen with the given index.
    ToScreen(usize),
    /// Reload the configuration.
    Reload,
    /// Shut down the window manager.
    Shutdown,
}

impl ActionDescriptor {
    /// Creates a spawn action from a program and its arguments.
    pub fn spawn<C, I, S>(command: C, args: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Spawn {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a spawn action that runs `line` through `sh -c`.
    pub fn shell<S: Into<String>>(line: S) -> Self {
        Self::Spawn {
            command: "sh".into(),
            args: vec!["-c".into(), line.into()],
        }
    }

    /// The name of the group this action refers to, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::SwitchGroup(name) => Some(name),
            Self::Window(WindowOp::ToGroup(name)) => Some(name),
            _ => None,
        }
    }

    /// Whether this action spawns an external command.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { command, args } if args.is_empty() => write!(f, "spawn({})", command),
            Self::Spawn { command, args } => write!(f, "spawn({} {})", command, args.join(" ")),
            Self::Layout(op) => write!(f, "layout.{}", op),
            Self::Window(op) => write!(f, "window.{}", op),
            Self::SwitchGroup(name) => write!(f, "switch_group({})", name),
            Self::ToScreen(idx) => write!(f, "to_screen({})", idx),
            Self::Reload => write!(f, "reload"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Operations that can be sent to the current layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LayoutOp {
    /// Focus the next window.
    Next,
    /// Focus the previous window.
    Previous,
    /// Focus the window to the left.
    Left,
    /// Focus the window to the right.
    Right,
    /// Focus the window above.
    Up,
    /// Focus the window below.
    Down,
    /// Move the focused window left.
    ShuffleLeft,
    /// Move the focused window right.
    ShuffleRight,
    /// Move the focused window up.
    ShuffleUp,
    /// Move the focused window down.
    ShuffleDown,
    /// Grow the main area.
    GrowMain,
    /// Shrink the main area.
    ShrinkMain,
    /// Reset all window sizes.
    Normalize,
    /// Switch to the next layout in the group.
    NextLayout,
    /// Switch to the previous layout in the group.
    PreviousLayout,
}

/// Operations that can be applied to the focused window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum WindowOp {
    /// Close the window.
    Kill,
    /// Toggle the window between tiled and floating.
    ToggleFloating,
    /// Toggle the window in or out of fullscreen.
    ToggleFullscreen,
    /// Raise the window above all others.
    BringToFront,
    /// Move a floating window with the pointer.
    SetPositionFloating,
    /// Resize a floating window with the pointer.
    SetSizeFloating,
    /// Record the window position (typically at the start of a drag).
    GetPosition,
    /// Record the window size (typically at the start of a drag).
    GetSize,
    /// Send the window to the named group.
    #[strum(disabled)]
    ToGroup(String),
}

impl fmt::Display for WindowOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToGroup(name) => write!(f, "to_group({})", name),
            op => write!(f, "{}", op.as_ref()),
        }
    }
}

/// An error raised by the host while executing an [`ActionDescriptor`].
///
/// These never feed back into the engine's state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionExecutionError {
    /// The command of a spawn action could not be found.
    #[error("command `{0}` not found")]
    CommandNotFound(String),
    /// The action was attempted but failed.
    #[error("`{action}` failed: {reason}")]
    Failed {
        /// The action that failed, formatted.
        action: String,
        /// Why it failed.
        reason: String,
    },
}

impl ActionExecutionError {
    /// Constructs a `Failed` error for the given action.
    pub fn failed<S: Into<String>>(action: &ActionDescriptor, reason: S) -> Self {
        Self::Failed {
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}

/// A type that can execute actions on behalf of the host.
///
/// This is implemented for any closure of the right shape, so a host
/// can pass one in directly.
pub trait ActionExecutor {
    /// Executes a single action.
    fn execute(&mut self, action: &ActionDescriptor) -> Result<(), ActionExecutionError>;
}

impl<F> ActionExecutor for F
where
    F: FnMut(&ActionDescriptor) -> Result<(), ActionExecutionError>,
{
    fn execute(&mut self, action: &ActionDescriptor) -> Result<(), ActionExecutionError> {
        self(action)
    }
}

/// An error handler that is called when an action fails to execute.
///
/// Typically this would be a standard logging function that writes
/// to a file or stdout, but it can be anything.
pub trait ErrorHandler {
    /// Calls the error handler.
    fn call(&self, action: &ActionDescriptor, err: &ActionExecutionError);
}

impl<F> ErrorHandler for F
where
    F: Fn(&ActionDescriptor, &ActionExecutionError),
{
    fn call(&self, action: &ActionDescriptor, err: &ActionExecutionError) {
        self(action, err)
    }
}

/// Runs `actions` in order on `executor`.
///
/// Execution is best-effort: a failing action is reported to `handler`
/// and the remaining actions are still attempted. All errors are
/// returned in the order they occurred.
pub fn run_actions<E, H>(
    executor: &mut E,
    actions: &[ActionDescriptor],
    handler: &H,
) -> Vec<ActionExecutionError>
where
    E: ActionExecutor + ?Sized,
    H: ErrorHandler + ?Sized,
{
    let mut errors = Vec::new();
    for action in actions {
        debug!(target: "actions", "running {}", action);
        if let Err(e) = executor.execute(action) {
            handler.call(action, &e);
            errors.push(e);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use crate::util::log::DefaultErrorHandler;

    #[test]
    fn test_parse_ops() {
        assert_eq!("shuffle_left".parse::<LayoutOp>().unwrap(), LayoutOp::ShuffleLeft);
        assert_eq!("next_layout".parse::<LayoutOp>().unwrap(), LayoutOp::NextLayout);
        assert_eq!("kill".parse::<WindowOp>().unwrap(), WindowOp::Kill);
        assert!("to_group".parse::<WindowOp>().is_err());
        assert!("explode".parse::<LayoutOp>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ActionDescriptor::spawn("alacritty", Vec::<String>::new()).to_string(), "spawn(alacritty)");
        assert_eq!(
            ActionDescriptor::spawn("rofi", ["-show", "drun"]).to_string(),
            "spawn(rofi -show drun)"
        );
        assert_eq!(ActionDescriptor::Layout(LayoutOp::GrowMain).to_string(), "layout.grow_main");
        assert_eq!(
            ActionDescriptor::Window(WindowOp::ToGroup("3".into())).to_string(),
            "window.to_group(3)"
        );
    }

    #[test]
    fn test_shell_action() {
        let action = ActionDescriptor::shell("scrot -s '/tmp/%F.png'");
        assert_eq!(
            action,
            ActionDescriptor::Spawn {
                command: "sh".into(),
                args: vec!["-c".into(), "scrot -s '/tmp/%F.png'".into()],
            }
        );
        assert!(action.is_external());
    }

    #[test_log::test]
    fn test_run_actions_continues_on_error() {
        let actions = vec![
            ActionDescriptor::spawn("i3lock", Vec::<String>::new()),
            ActionDescriptor::spawn("does-not-exist", Vec::<String>::new()),
            ActionDescriptor::Layout(LayoutOp::Next),
            ActionDescriptor::Reload,
        ];

        let mut ran = Vec::new();
        let mut executor = |action: &ActionDescriptor| {
            ran.push(action.clone());
            match action {
                ActionDescriptor::Spawn { command, .. } if command == "does-not-exist" => {
                    Err(ActionExecutionError::CommandNotFound(command.clone()))
                }
                ActionDescriptor::Reload => Err(ActionExecutionError::failed(action, "busy")),
                _ => Ok(()),
            }
        };

        let errors = run_actions(&mut executor, &actions, &DefaultErrorHandler);

        assert_eq!(ran, actions);
        assert_eq!(
            errors,
            vec![
                ActionExecutionError::CommandNotFound("does-not-exist".into()),
                ActionExecutionError::failed(&ActionDescriptor::Reload, "busy"),
            ]
        );
    }

    #[test]
    fn test_error_handler_sees_every_failure() {
        let seen = RefCell::new(Vec::new());
        let handler = |action: &ActionDescriptor, _: &ActionExecutionError| {
            seen.borrow_mut().push(action.to_string());
        };
        let mut executor = |action: &ActionDescriptor| -> Result<(), ActionExecutionError> {
            Err(ActionExecutionError::failed(action, "nope"))
        };

        let actions = [ActionDescriptor::Reload, ActionDescriptor::Shutdown];
        let errors = run_actions(&mut executor, &actions, &handler);

        assert_eq!(errors.len(), 2);
        assert_eq!(*seen.borrow(), vec!["reload".to_string(), "shutdown".to_string()]);
    }
}
