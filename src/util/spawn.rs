//! Utilities for spawning external commands.
//!
//! Spawning is fire-and-forget: the child is started, and a background
//! thread reaps it when it exits. Nothing about its exit status is
//! reported back.

use std::ffi::OsStr;
use std::io;
use std::process::{Child, Command, Stdio};
use std::thread;

use tracing::{instrument, trace};

use crate::actions::{ActionDescriptor, ActionExecutionError, ActionExecutor};

/// Spawns `command` with `args`, detached from our stdio.
pub fn spawn<S, I>(command: S, args: I) -> Result<(), ActionExecutionError>
where
    S: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
{
    let name = command.as_ref().to_string_lossy().into_owned();

    let child = Command::new(command.as_ref())
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ActionExecutionError::CommandNotFound(name.clone()),
            _ => ActionExecutionError::Failed {
                action: name.clone(),
                reason: e.to_string(),
            },
        })?;

    thread::Builder::new()
        .name("Command Reaper".to_owned())
        .spawn(move || reap(child))
        .map_err(|e| ActionExecutionError::Failed {
            action: name,
            reason: e.to_string(),
        })?;

    Ok(())
}

#[instrument(level = "trace", skip_all)]
fn reap(mut child: Child) {
    match child.wait() {
        Ok(status) => trace!("child {} exited with {}", child.id(), status),
        Err(e) => trace!("could not wait on child {}: {}", child.id(), e),
    }
}

/// An [`ActionExecutor`] that spawns [`ActionDescriptor::Spawn`] actions
/// and hands every other action to a fallback executor.
#[derive(Debug, Clone, Default)]
pub struct SpawnExecutor<F> {
    fallback: F,
}

impl<F> SpawnExecutor<F>
where
    F: ActionExecutor,
{
    /// Creates a new `SpawnExecutor` that runs non-spawn actions on `fallback`.
    pub fn new(fallback: F) -> Self {
        Self { fallback }
    }
}

impl<F> ActionExecutor for SpawnExecutor<F>
where
    F: ActionExecutor,
{
    fn execute(&mut self, action: &ActionDescriptor) -> Result<(), ActionExecutionError> {
        match action {
            ActionDescriptor::Spawn { command, args } => spawn(command.as_str(), args.iter().map(String::as_str)),
            other => self.fallback.execute(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_missing_command() {
        let res = spawn("toaruconf-definitely-not-a-command", Vec::<&str>::new());
        assert_eq!(
            res,
            Err(ActionExecutionError::CommandNotFound(
                "toaruconf-definitely-not-a-command".into()
            ))
        );
    }

    #[test]
    fn test_spawn_executor_falls_back() {
        let mut fallback_calls = Vec::new();
        let mut executor = SpawnExecutor::new(|action: &ActionDescriptor| -> Result<(), ActionExecutionError> {
            fallback_calls.push(action.clone());
            Ok(())
        });

        executor.execute(&ActionDescriptor::Reload).unwrap();
        let err = executor
            .execute(&ActionDescriptor::spawn("toaruconf-no-such-binary", Vec::<String>::new()))
            .unwrap_err();

        drop(executor);
        assert_eq!(fallback_calls, vec![ActionDescriptor::Reload]);
        assert!(matches!(err, ActionExecutionError::CommandNotFound(_)));
    }
}
