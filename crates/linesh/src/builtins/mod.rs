//! Built-in shell commands
//!
//! This module provides the [`Builtin`] trait for implementing commands that
//! run inside the interpreter instead of going to the
//! [`CommandRunner`](crate::CommandRunner), and the [`Context`] struct they
//! execute with.
//!
//! # Custom Builtins
//!
//! ```rust
//! use linesh::{Builtin, BuiltinContext, ExecResult, async_trait};
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl Builtin for Shout {
//!     async fn execute(&self, ctx: BuiltinContext<'_>) -> linesh::Result<ExecResult> {
//!         Ok(ExecResult::ok(format!("{}\n", ctx.args.to_uppercase())))
//!     }
//! }
//! ```
//!
//! Register via [`ShellBuilder::builtin`](crate::ShellBuilder::builtin).

mod echo;
mod flow;
mod navigation;
mod read;
mod test;

pub use echo::Echo;
pub use flow::Exit;
pub use navigation::{Cd, Pwd};
pub use read::Read;
pub use test::{Bracket, Condition, Operator, Test, evaluate};

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::AsyncBufRead;

use crate::error::Result;
use crate::interpreter::{ExecResult, VariableStore};

/// Execution context for builtin commands.
pub struct Context<'a> {
    /// Everything after the command name, already variable-expanded and
    /// trimmed. For `echo "hi there"` this is `"hi there"` (quotes kept).
    pub args: &'a str,

    /// The interpreter's variable store.
    pub variables: &'a mut VariableStore,

    /// Interactive input stream (process stdin unless configured otherwise).
    pub stdin: &'a mut (dyn AsyncBufRead + Unpin + Send),
}

impl<'a> Context<'a> {
    /// Arguments split on whitespace.
    pub fn words(&self) -> Vec<&'a str> {
        self.args.split_whitespace().collect()
    }
}

/// Trait for implementing builtin commands.
///
/// Return [`ExecResult::ok`] for success with output, or [`ExecResult::err`]
/// for failures with an exit code. An `Err` aborts the whole script, so it is
/// reserved for failures that cannot be expressed as a status.
#[async_trait]
pub trait Builtin: Send + Sync {
    /// Execute the builtin command.
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult>;
}

/// Registry of builtins keyed by command name.
pub(crate) type Registry = HashMap<String, Box<dyn Builtin>>;

/// The builtins every interpreter starts with.
pub(crate) fn default_registry() -> Registry {
    let mut builtins: Registry = HashMap::new();
    builtins.insert("echo".to_string(), Box::new(Echo));
    builtins.insert("pwd".to_string(), Box::new(Pwd));
    builtins.insert("cd".to_string(), Box::new(Cd));
    builtins.insert("exit".to_string(), Box::new(Exit));
    builtins.insert("read".to_string(), Box::new(Read));
    builtins.insert("[".to_string(), Box::new(Bracket));
    builtins.insert("test".to_string(), Box::new(Test));
    builtins
}

/// Split an expanded command into its name and argument text.
///
/// A leading `[` is its own name even without a following space.
pub(crate) fn split_command(command: &str) -> (&str, &str) {
    let command = command.trim();
    if let Some(rest) = command.strip_prefix('[') {
        return ("[", rest.trim());
    }
    match command.find(char::is_whitespace) {
        Some(pos) => (&command[..pos], command[pos..].trim()),
        None => (command, ""),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Run a builtin against a store and in-memory stdin.
    pub async fn run(
        builtin: &dyn Builtin,
        args: &str,
        variables: &mut VariableStore,
        input: &str,
    ) -> ExecResult {
        let mut stdin = input.as_bytes();
        let ctx = Context {
            args,
            variables,
            stdin: &mut stdin,
        };
        match builtin.execute(ctx).await {
            Ok(result) => result,
            Err(e) => panic!("builtin failed: {e}"),
        }
    }
}
