//! Flow control builtins (exit)

use async_trait::async_trait;

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::ExecResult;
use crate::interpreter::arithmetic::parse_status;

/// The exit builtin - stop the script with a status code.
pub struct Exit;

#[async_trait]
impl Builtin for Exit {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let exit_code = ctx
            .words()
            .first()
            .map(|code| parse_status(code))
            .unwrap_or(0);
        Ok(ExecResult::exit(exit_code))
    }
}
