//! echo builtin command

use async_trait::async_trait;

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::ExecResult;
use crate::interpreter::expand::strip_quotes;

/// The echo builtin command.
///
/// Prints its (already expanded) argument text with one layer of matching
/// surrounding quotes removed. Inner spacing is preserved.
pub struct Echo;

#[async_trait]
impl Builtin for Echo {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let text = strip_quotes(ctx.args);
        Ok(ExecResult::ok(format!("{text}\n")))
    }
}
