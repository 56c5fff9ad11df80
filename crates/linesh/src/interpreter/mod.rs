//! Interpreter for executing linesh scripts
//!
//! Walks the block tree built by the parser. Plain logical lines go through
//! the sequencer ([`Interpreter::run_logical_line`]), which handles `;`,
//! `&&`, `||` and arithmetic assignment before dispatching each segment to a
//! builtin, an assignment or the [`CommandRunner`].

pub(crate) mod arithmetic;
pub(crate) mod expand;
mod state;
pub(crate) mod variables;

pub use state::{ControlFlow, ExecResult};
pub use variables::VariableStore;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWriteExt};

use crate::builtins::{self, Builtin, Registry, split_command};
use crate::error::Result;
use crate::limits::{ExecutionLimits, LoopCounter};
use crate::logging_impl::LogConfig;
use crate::parser::{Node, Script};
use crate::runner::CommandRunner;
use arithmetic::{evaluate_arithmetic, split_arithmetic_assignment};
use expand::{expand, expand_arithmetic, find_unquoted, split_unquoted, strip_quotes};
use variables::split_assignment;

/// Boxed future used for the recursive tree walk.
type BlockFuture<'a> = Pin<Box<dyn Future<Output = Result<ControlFlow>> + Send + 'a>>;

/// Where builtin output goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum OutputMode {
    /// Collect into the returned [`ExecResult`]
    #[default]
    Capture,
    /// Write straight to the process stdout/stderr
    Inherit,
}

/// The `&&` / `||` connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn proceeds(self, status: i32) -> bool {
        match self {
            Self::And => status == 0,
            Self::Or => status != 0,
        }
    }
}

/// First unquoted `&&` in `line`, or the first unquoted `||` when there is
/// no `&&` at all.
fn find_connective(line: &str) -> Option<(usize, Connective)> {
    find_unquoted(line, "&&")
        .map(|pos| (pos, Connective::And))
        .or_else(|| find_unquoted(line, "||").map(|pos| (pos, Connective::Or)))
}

/// Interpreter state.
pub struct Interpreter {
    variables: VariableStore,
    builtins: Registry,
    runner: Arc<dyn CommandRunner>,
    stdin: Box<dyn AsyncBufRead + Unpin + Send>,
    limits: ExecutionLimits,
    log_config: LogConfig,
    output: OutputMode,
    stdout: String,
    stderr: String,
}

impl Interpreter {
    /// Create a new interpreter around a runner and an input stream.
    ///
    /// The variable store is reset here and nowhere else.
    pub fn new(runner: Arc<dyn CommandRunner>, stdin: Box<dyn AsyncBufRead + Unpin + Send>) -> Self {
        Self {
            variables: VariableStore::new(),
            builtins: builtins::default_registry(),
            runner,
            stdin,
            limits: ExecutionLimits::default(),
            log_config: LogConfig::default(),
            output: OutputMode::default(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn set_limits(&mut self, limits: ExecutionLimits) {
        self.limits = limits;
    }

    pub fn set_log_config(&mut self, log_config: LogConfig) {
        self.log_config = log_config;
    }

    pub(crate) fn set_output(&mut self, output: OutputMode) {
        self.output = output;
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> OutputMode {
        self.output
    }

    /// Register a builtin, replacing any existing one with the same name.
    pub fn register_builtin(&mut self, name: impl Into<String>, builtin: Box<dyn Builtin>) {
        self.builtins.insert(name.into(), builtin);
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.variables
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }

    /// Execute a script.
    pub async fn execute(&mut self, script: &Script) -> Result<ExecResult> {
        self.stdout.clear();
        self.stderr.clear();

        let control_flow = self.run_block(&script.nodes).await?;
        let exit_code = match control_flow {
            ControlFlow::Exit(code) => {
                self.variables.set_exit_status(code);
                code
            }
            ControlFlow::None => self.variables.exit_status(),
        };

        Ok(ExecResult {
            stdout: std::mem::take(&mut self.stdout),
            stderr: std::mem::take(&mut self.stderr),
            exit_code,
            control_flow,
        })
    }

    fn run_block<'a>(&'a mut self, nodes: &'a [Node]) -> BlockFuture<'a> {
        Box::pin(async move {
            for node in nodes {
                let flow = self.run_node(node).await?;
                if flow != ControlFlow::None {
                    return Ok(flow);
                }
            }
            Ok(ControlFlow::None)
        })
    }

    async fn run_node(&mut self, node: &Node) -> Result<ControlFlow> {
        match node {
            Node::Command(line) => self.run_logical_line(line).await,
            Node::Assignment { name, value } => {
                self.assign_raw(name, value);
                Ok(ControlFlow::None)
            }
            Node::If {
                branches,
                else_body,
            } => {
                for branch in branches {
                    if builtins::evaluate(&branch.condition, &self.variables) {
                        tracing::debug!(
                            condition = %self.log_config.redact_value(&branch.condition),
                            "if branch taken"
                        );
                        return self.run_block(&branch.body).await;
                    }
                }
                match else_body {
                    Some(body) => self.run_block(body).await,
                    None => Ok(ControlFlow::None),
                }
            }
            Node::For { var, values, body } => {
                let values = expand(values, &self.variables);
                for value in values.split_whitespace() {
                    self.variables.set(var, value);
                    let flow = self.run_block(body).await?;
                    if flow != ControlFlow::None {
                        return Ok(flow);
                    }
                }
                Ok(ControlFlow::None)
            }
            Node::While { condition, body } => {
                let mut counter = LoopCounter::new(&self.limits);
                while self.loop_condition_holds(condition) {
                    if let Err(e) = counter.tick() {
                        tracing::warn!(
                            condition = %self.log_config.redact_value(condition),
                            error = %e,
                            "while loop stopped"
                        );
                        break;
                    }
                    let flow = self.run_block(body).await?;
                    if flow != ControlFlow::None {
                        return Ok(flow);
                    }
                }
                tracing::debug!(iterations = counter.iterations(), "while loop finished");
                Ok(ControlFlow::None)
            }
            Node::Case { subject, arms } => {
                let expanded = expand(subject, &self.variables);
                let value = strip_quotes(&expanded);
                match arms.iter().find(|arm| arm.matches(value)) {
                    Some(arm) => {
                        tracing::debug!(pattern = %arm.pattern, "case arm matched");
                        self.run_block(&arm.body).await
                    }
                    None => Ok(ControlFlow::None),
                }
            }
        }
    }

    /// `while` conditions are re-expanded before each pass; `if` conditions
    /// only expand their `$` tokens inside the evaluator.
    fn loop_condition_holds(&self, condition: &str) -> bool {
        let expanded = expand(condition, &self.variables);
        builtins::evaluate(&expanded, &self.variables)
    }

    /// Run one logical line through the sequencer.
    ///
    /// A whole-line `NAME=$((EXPR))` is evaluated directly. Otherwise `&&`
    /// takes priority over `||`: the line splits at the first `&&` (or, with
    /// none, the first `||`), the `;` list to its left runs, and the
    /// remainder runs only if the status allows it.
    pub async fn run_logical_line(&mut self, line: &str) -> Result<ControlFlow> {
        let mut rest = line;
        loop {
            if self.try_arithmetic_assignment(rest) {
                return Ok(ControlFlow::None);
            }

            let Some((pos, connective)) = find_connective(rest) else {
                return self.run_list(rest).await;
            };

            let flow = self.run_list(&rest[..pos]).await?;
            if flow != ControlFlow::None {
                return Ok(flow);
            }

            let status = self.variables.exit_status();
            if !connective.proceeds(status) {
                tracing::debug!(?connective, status, "short-circuit");
                return Ok(ControlFlow::None);
            }
            rest = &rest[pos + 2..];
        }
    }

    /// Run each `;`-separated segment in order.
    async fn run_list(&mut self, list: &str) -> Result<ControlFlow> {
        for segment in split_unquoted(list, ";") {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let flow = self.run_segment(segment).await?;
            if flow != ControlFlow::None {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::None)
    }

    async fn run_segment(&mut self, segment: &str) -> Result<ControlFlow> {
        if self.try_arithmetic_assignment(segment) {
            return Ok(ControlFlow::None);
        }
        tracing::debug!(segment = %self.log_config.redact_value(segment), "run segment");
        if let Some((name, value)) = split_assignment(segment) {
            self.assign_raw(name, value);
            return Ok(ControlFlow::None);
        }
        let command = expand(segment, &self.variables);
        self.dispatch(command.trim()).await
    }

    /// Evaluate `NAME=$((EXPR))` if `line` has that shape.
    fn try_arithmetic_assignment(&mut self, line: &str) -> bool {
        let Some((name, expr)) = split_arithmetic_assignment(line) else {
            return false;
        };
        let expr = expand(expr, &self.variables);
        let expr = expand_arithmetic(&expr, &self.variables);
        let value = evaluate_arithmetic(&expr);
        self.assign(name, &value.to_string());
        true
    }

    /// Assign an unexpanded `NAME=value` right-hand side: one layer of quotes
    /// is stripped, then the rest is expanded.
    fn assign_raw(&mut self, name: &str, raw: &str) {
        let value = expand(strip_quotes(raw), &self.variables);
        self.assign(name, &value);
    }

    fn assign(&mut self, name: &str, value: &str) {
        tracing::debug!(
            name,
            value = %self.log_config.redact_assignment(name, value),
            "assign"
        );
        self.variables.set(name, value);
        self.variables.set_exit_status(0);
    }

    /// Route an expanded command to a builtin or the runner.
    async fn dispatch(&mut self, command: &str) -> Result<ControlFlow> {
        if command.is_empty() {
            return Ok(ControlFlow::None);
        }

        let (name, args) = split_command(command);
        if let Some(builtin) = self.builtins.get(name) {
            tracing::debug!(builtin = name, "dispatch builtin");
            let ctx = builtins::Context {
                args,
                variables: &mut self.variables,
                stdin: &mut *self.stdin,
            };
            let result = builtin.execute(ctx).await?;
            self.emit(&result).await?;
            self.variables.set_exit_status(result.exit_code);
            return Ok(result.control_flow);
        }

        tracing::debug!(
            program = %self.log_config.redact_value(name),
            args_len = args.len(),
            "dispatch external"
        );
        let status = self.runner.run(command).await;
        self.variables.set_exit_status(status);
        Ok(ControlFlow::None)
    }

    async fn emit(&mut self, result: &ExecResult) -> Result<()> {
        match self.output {
            OutputMode::Capture => {
                self.stdout.push_str(&result.stdout);
                self.stderr.push_str(&result.stderr);
            }
            OutputMode::Inherit => {
                if !result.stdout.is_empty() {
                    let mut out = tokio::io::stdout();
                    out.write_all(result.stdout.as_bytes()).await?;
                    out.flush().await?;
                }
                if !result.stderr.is_empty() {
                    let mut err = tokio::io::stderr();
                    err.write_all(result.stderr.as_bytes()).await?;
                    err.flush().await?;
                }
            }
        }
        Ok(())
    }
}
