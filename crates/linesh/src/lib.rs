//! linesh - a line-oriented interpreter for a reduced shell language
//!
//! Supports variables and expansion, `if`/`for`/`while`/`case` blocks,
//! `;`, `&&` and `||` sequencing, left-to-right `$((...))` arithmetic and the
//! builtins `echo`, `pwd`, `cd`, `exit`, `read` and `[`. Every other command
//! line is handed, fully expanded, to a [`CommandRunner`].
//!
//! # Example
//!
//! ```rust
//! use linesh::{RecordingRunner, Shell};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> linesh::Result<()> {
//!     let runner = RecordingRunner::new();
//!     let mut shell = Shell::builder().runner(runner.clone()).build();
//!     let result = shell
//!         .exec("x=2\nif [ $x -gt 1 ]; then echo big; else echo small; fi\nmake all")
//!         .await?;
//!     assert_eq!(result.stdout, "big\n");
//!     assert_eq!(runner.commands(), vec!["make all"]);
//!     Ok(())
//! }
//! ```

mod builtins;
mod error;
mod interpreter;
mod limits;
mod logging_impl;
mod parser;
mod runner;

pub use async_trait::async_trait;
pub use builtins::{
    Builtin, Condition, Context as BuiltinContext, Operator, evaluate as evaluate_condition,
};
pub use error::{Error, Result};
pub use interpreter::arithmetic::{evaluate_arithmetic, parse_int};
pub use interpreter::expand::{expand, expand_arithmetic};
pub use interpreter::{ControlFlow, ExecResult, VariableStore};
pub use limits::{ExecutionLimits, LimitExceeded};
pub use logging_impl::LogConfig;
pub use runner::{CommandRunner, ProcessRunner, RecordingRunner};

use std::sync::Arc;

use tokio::io::{AsyncBufRead, BufReader};

use interpreter::{Interpreter, OutputMode};
use logging_impl::format_script_for_log;
use parser::Parser;

/// Main entry point for linesh.
///
/// One `Shell` owns one variable store; successive [`exec`](Shell::exec)
/// calls share it.
pub struct Shell {
    interpreter: Interpreter,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    /// Create a shell that runs external commands on the host and reads
    /// `read` input from the process stdin.
    ///
    /// Builtin output is written straight to the process stdout/stderr so it
    /// stays in order with the output of host commands; the returned
    /// [`ExecResult`] carries empty `stdout`/`stderr`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new ShellBuilder for customized configuration.
    pub fn builder() -> ShellBuilder {
        ShellBuilder::default()
    }

    /// Execute a script and return the result.
    pub async fn exec(&mut self, script: &str) -> Result<ExecResult> {
        tracing::info!(
            script = %format_script_for_log(script, self.interpreter.log_config()),
            "executing script"
        );

        let ast = Parser::from_script(script).parse();
        let result = self.interpreter.execute(&ast).await?;

        tracing::info!(
            exit_code = result.exit_code,
            exited = matches!(result.control_flow, ControlFlow::Exit(_)),
            "script finished"
        );
        Ok(result)
    }

    /// The variable store as left by the last script.
    pub fn variables(&self) -> &VariableStore {
        self.interpreter.variables()
    }
}

/// Builder for customized Shell configuration.
#[derive(Default)]
pub struct ShellBuilder {
    runner: Option<Arc<dyn CommandRunner>>,
    stdin: Option<Box<dyn AsyncBufRead + Unpin + Send>>,
    vars: Vec<(String, String)>,
    positional: Option<(String, Vec<String>)>,
    limits: Option<ExecutionLimits>,
    log_config: Option<LogConfig>,
    builtins: Vec<(String, Box<dyn Builtin>)>,
    inherit_output: Option<bool>,
}

impl ShellBuilder {
    /// Set the runner for external commands.
    pub fn runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Some(Arc::new(runner));
        self
    }

    /// Set the input stream consumed by `read`.
    pub fn stdin(mut self, stdin: impl AsyncBufRead + Unpin + Send + 'static) -> Self {
        self.stdin = Some(Box::new(stdin));
        self
    }

    /// Set a variable before the first script runs.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((name.into(), value.into()));
        self
    }

    /// Set `$0` and the positional arguments.
    pub fn args<S: Into<String>>(
        mut self,
        script_name: impl Into<String>,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        let args = args.into_iter().map(Into::into).collect();
        self.positional = Some((script_name.into(), args));
        self
    }

    /// Set execution limits.
    pub fn limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Configure logging behavior.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linesh::{LogConfig, Shell};
    ///
    /// let shell = Shell::builder()
    ///     .log_config(LogConfig::new().redact_var("INTERNAL_"))
    ///     .build();
    /// ```
    pub fn log_config(mut self, config: LogConfig) -> Self {
        self.log_config = Some(config);
        self
    }

    /// Register a custom builtin. It shadows a default builtin of the same
    /// name and takes precedence over the runner.
    pub fn builtin(mut self, name: impl Into<String>, builtin: Box<dyn Builtin>) -> Self {
        self.builtins.push((name.into(), builtin));
        self
    }

    /// Write builtin output straight to the process stdout/stderr instead of
    /// collecting it in [`ExecResult`].
    ///
    /// Defaults to `true` with the default [`ProcessRunner`] and `false` when
    /// a runner is supplied. Capturing while host commands write to the
    /// terminal moves all builtin output after theirs.
    pub fn inherit_output(mut self, inherit: bool) -> Self {
        self.inherit_output = Some(inherit);
        self
    }

    /// Build the Shell instance.
    pub fn build(self) -> Shell {
        let inherit_output = self.inherit_output.unwrap_or(self.runner.is_none());
        let runner = self
            .runner
            .unwrap_or_else(|| Arc::new(ProcessRunner::new()));
        let stdin = self
            .stdin
            .unwrap_or_else(|| Box::new(BufReader::new(tokio::io::stdin())));
        let mut interpreter = Interpreter::new(runner, stdin);

        if let Some(limits) = self.limits {
            interpreter.set_limits(limits);
        }
        if let Some(config) = self.log_config {
            interpreter.set_log_config(config);
        }
        if inherit_output {
            interpreter.set_output(OutputMode::Inherit);
        }
        for (name, builtin) in self.builtins {
            interpreter.register_builtin(name, builtin);
        }

        let variables = interpreter.variables_mut();
        if let Some((script_name, args)) = self.positional {
            variables.set_positional(&script_name, &args);
        }
        for (name, value) in self.vars {
            variables.set(&name, value);
        }

        Shell { interpreter }
    }
}
