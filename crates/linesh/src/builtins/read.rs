//! read builtin - read a line of input

use async_trait::async_trait;
use tokio::io::AsyncBufReadExt;

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::ExecResult;
use crate::interpreter::variables::is_valid_name;

/// read builtin - read a line of input into variables
///
/// With one name the whole line is stored. With several, the line is split
/// on whitespace and the last name gets the remaining words. With none, the
/// line goes to `REPLY`.
pub struct Read;

#[async_trait]
impl Builtin for Read {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let names: Vec<&str> = match ctx.args.split_whitespace().collect::<Vec<_>>() {
            names if names.is_empty() => vec!["REPLY"],
            names => names,
        };

        if let Some(bad) = names.iter().find(|n| !is_valid_name(n)) {
            return Ok(ExecResult::err(
                format!("read: `{bad}': not a valid identifier\n"),
                1,
            ));
        }

        let mut line = String::new();
        match ctx.stdin.read_line(&mut line).await {
            Ok(0) => return Ok(ExecResult::status(1)),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "read failed");
                return Ok(ExecResult::err(format!("read: {e}\n"), 1));
            }
        }
        let line = line.trim_end_matches(['\n', '\r']);

        if let [name] = names.as_slice() {
            ctx.variables.set(name, line);
            return Ok(ExecResult::status(0));
        }

        let mut rest = line.trim_start();
        let last = names.len() - 1;
        for (i, name) in names.iter().enumerate() {
            if i == last {
                ctx.variables.set(name, rest.trim_end());
                break;
            }
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            ctx.variables.set(name, &rest[..end]);
            rest = rest[end..].trim_start();
        }

        Ok(ExecResult::status(0))
    }
}
