//! External command execution
//!
//! Every fully expanded command line that is not a builtin or an assignment
//! is handed to a [`CommandRunner`]. Failures surface only as statuses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Status reported when a command cannot be started at all.
pub const SPAWN_FAILURE_STATUS: i32 = 127;

/// The boundary between the interpreter and the host.
///
/// # Example
///
/// ```rust
/// use linesh::{CommandRunner, async_trait};
///
/// struct AlwaysFails;
///
/// #[async_trait]
/// impl CommandRunner for AlwaysFails {
///     async fn run(&self, _command: &str) -> i32 {
///         1
///     }
/// }
/// ```
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a fully expanded command line and return its exit status.
    async fn run(&self, command: &str) -> i32;
}

/// Runs commands through the host shell with inherited stdio.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    #[cfg(unix)]
    fn command(line: &str) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }

    #[cfg(windows)]
    fn command(line: &str) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.arg("/C").arg(line);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &str) -> i32 {
        let status = match Self::command(command).status().await {
            Ok(status) => status,
            Err(e) => {
                let program = command.split_whitespace().next().unwrap_or_default();
                tracing::warn!(program, error = %e, "failed to spawn command");
                return SPAWN_FAILURE_STATUS;
            }
        };

        if let Some(code) = status.code() {
            return code;
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return 128 + signal;
            }
        }
        1
    }
}

#[derive(Debug, Default)]
struct Recording {
    commands: Vec<String>,
    statuses: HashMap<String, i32>,
}

/// Records commands instead of running them.
///
/// Statuses are configured per command name (the first word); anything not
/// configured succeeds. Clones share the same recording, so one handle can
/// go to the shell while the test keeps another.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `status` whenever a command named `name` runs.
    pub fn status(self, name: impl Into<String>, status: i32) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.statuses.insert(name.into(), status);
        }
        self
    }

    /// Commands seen so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|inner| inner.commands.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &str) -> i32 {
        let Ok(mut inner) = self.inner.lock() else {
            return 1;
        };
        inner.commands.push(command.to_string());
        let name = command.split_whitespace().next().unwrap_or_default();
        inner.statuses.get(name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_runner_defaults_to_success() {
        let runner = RecordingRunner::new();
        assert_eq!(runner.run("ls -l /tmp").await, 0);
        assert_eq!(runner.commands(), vec!["ls -l /tmp".to_string()]);
    }

    #[tokio::test]
    async fn test_recording_runner_configured_status() {
        let runner = RecordingRunner::new().status("false", 1).status("grep", 2);
        assert_eq!(runner.run("false").await, 1);
        assert_eq!(runner.run("grep x file").await, 2);
        assert_eq!(runner.run("true").await, 0);
        assert_eq!(runner.commands().len(), 3);
    }

    #[tokio::test]
    async fn test_recording_runner_clones_share_state() {
        let runner = RecordingRunner::new();
        let handle = runner.clone();
        runner.run("one").await;
        runner.run("two").await;
        assert_eq!(handle.commands(), vec!["one", "two"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_exit_codes() {
        let runner = ProcessRunner::new();
        assert_eq!(runner.run("true").await, 0);
        assert_eq!(runner.run("exit 3").await, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_unknown_command() {
        let runner = ProcessRunner::new();
        assert_eq!(runner.run("definitely-not-a-command-xyz 2>/dev/null").await, 127);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_signal() {
        let runner = ProcessRunner::new();
        assert_eq!(runner.run("kill -9 $$").await, 137);
    }
}
