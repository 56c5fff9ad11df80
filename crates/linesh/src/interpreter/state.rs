//! Interpreter state types

/// Control flow signal raised by a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlFlow {
    /// Keep executing the script
    #[default]
    None,
    /// `exit` was called; stop immediately with this code
    Exit(i32),
}

/// Result of executing a script or a single builtin.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Standard output produced by builtins (empty when output is inherited)
    pub stdout: String,
    /// Standard error produced by builtins (empty when output is inherited)
    pub stderr: String,
    /// Exit code
    pub exit_code: i32,
    /// Control flow signal
    pub control_flow: ControlFlow,
}

impl ExecResult {
    /// Create a successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    /// Create a failed result with the given stderr.
    pub fn err(stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code,
            ..Default::default()
        }
    }

    /// Create a result carrying only a status.
    pub fn status(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }

    /// Create a result that terminates the script.
    pub fn exit(exit_code: i32) -> Self {
        Self {
            exit_code,
            control_flow: ControlFlow::Exit(exit_code),
            ..Default::default()
        }
    }

    /// Check if the result indicates success.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
