//! Navigation builtins (cd, pwd)
//!
//! Both operate on the host process working directory.

use async_trait::async_trait;

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::ExecResult;
use crate::interpreter::expand::strip_quotes;

/// The cd builtin - change directory.
pub struct Cd;

#[async_trait]
impl Builtin for Cd {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let target = if !ctx.args.is_empty() {
            strip_quotes(ctx.args).to_string()
        } else if ctx.variables.contains("HOME") {
            ctx.variables.get("HOME").into_owned()
        } else if let Ok(home) = std::env::var("HOME") {
            home
        } else {
            return Ok(ExecResult::err("cd: HOME not set\n", 1));
        };

        let old = std::env::current_dir().ok();
        if let Err(e) = std::env::set_current_dir(&target) {
            tracing::debug!(error = %e, "cd failed");
            return Ok(ExecResult::err(format!("cd: {target}: {e}\n"), 1));
        }

        if let Some(old) = old {
            ctx.variables
                .set("OLDPWD", old.to_string_lossy().into_owned());
        }
        if let Ok(new) = std::env::current_dir() {
            ctx.variables.set("PWD", new.to_string_lossy().into_owned());
        }
        Ok(ExecResult::ok(""))
    }
}

/// The pwd builtin - print working directory.
pub struct Pwd;

#[async_trait]
impl Builtin for Pwd {
    async fn execute(&self, _ctx: Context<'_>) -> Result<ExecResult> {
        match std::env::current_dir() {
            Ok(cwd) => Ok(ExecResult::ok(format!("{}\n", cwd.display()))),
            Err(e) => Ok(ExecResult::err(format!("pwd: {e}\n"), 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::testing::run;
    use crate::interpreter::VariableStore;
    use serial_test::serial;

    struct RestoreCwd(std::path::PathBuf);

    impl Drop for RestoreCwd {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn guard() -> RestoreCwd {
        RestoreCwd(std::env::current_dir().unwrap())
    }

    #[tokio::test]
    #[serial]
    async fn test_pwd_matches_process_cwd() {
        let mut vars = VariableStore::new();
        let result = run(&Pwd, "", &mut vars, "").await;
        let expected = format!("{}\n", std::env::current_dir().unwrap().display());
        assert_eq!(result.stdout, expected);
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    #[serial]
    async fn test_cd_changes_directory() {
        let _restore = guard();
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let mut vars = VariableStore::new();

        let arg = canonical.to_string_lossy().into_owned();
        let result = run(&Cd, &arg, &mut vars, "").await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(std::env::current_dir().unwrap().canonicalize().unwrap(), canonical);
        assert!(vars.contains("OLDPWD"));
        assert!(vars.contains("PWD"));
    }

    #[tokio::test]
    #[serial]
    async fn test_cd_quoted_path() {
        let _restore = guard();
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let mut vars = VariableStore::new();

        let arg = format!("\"{}\"", canonical.display());
        assert_eq!(run(&Cd, &arg, &mut vars, "").await.exit_code, 0);
        assert_eq!(std::env::current_dir().unwrap().canonicalize().unwrap(), canonical);
    }

    #[tokio::test]
    #[serial]
    async fn test_cd_home_variable() {
        let _restore = guard();
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let mut vars = VariableStore::new();
        vars.set("HOME", canonical.to_string_lossy().into_owned());

        assert_eq!(run(&Cd, "", &mut vars, "").await.exit_code, 0);
        assert_eq!(std::env::current_dir().unwrap().canonicalize().unwrap(), canonical);
    }

    #[tokio::test]
    #[serial]
    async fn test_cd_missing_directory() {
        let _restore = guard();
        let before = std::env::current_dir().unwrap();
        let mut vars = VariableStore::new();

        let result = run(&Cd, "/definitely/not/a/real/dir", &mut vars, "").await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.starts_with("cd: /definitely/not/a/real/dir:"));
        assert_eq!(std::env::current_dir().unwrap(), before);
        assert!(!vars.contains("OLDPWD"));
    }
}
