//! test builtin command ([ and test)
//!
//! Conditions are exactly three tokens, `lhs op rhs`. Anything else is false.

use std::borrow::Cow;

use async_trait::async_trait;

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::arithmetic::parse_int;
use crate::interpreter::expand::{expand, strip_quotes};
use crate::interpreter::{ExecResult, VariableStore};

/// Comparison operators accepted in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` or `==`
    StrEq,
    /// `!=`
    StrNe,
    /// `-eq`
    Eq,
    /// `-ne`
    Ne,
    /// `-gt`
    Gt,
    /// `-lt`
    Lt,
    /// `-ge`
    Ge,
    /// `-le`
    Le,
}

impl Operator {
    /// Parse an operator token.
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "=" | "==" => Self::StrEq,
            "!=" => Self::StrNe,
            "-eq" => Self::Eq,
            "-ne" => Self::Ne,
            "-gt" => Self::Gt,
            "-lt" => Self::Lt,
            "-ge" => Self::Ge,
            "-le" => Self::Le,
            _ => return None,
        })
    }

    fn apply(self, lhs: &str, rhs: &str) -> bool {
        match self {
            Self::StrEq => lhs == rhs,
            Self::StrNe => lhs != rhs,
            numeric => {
                let (a, b) = (parse_int(lhs), parse_int(rhs));
                match numeric {
                    Self::Eq => a == b,
                    Self::Ne => a != b,
                    Self::Gt => a > b,
                    Self::Lt => a < b,
                    Self::Ge => a >= b,
                    _ => a <= b,
                }
            }
        }
    }
}

/// A parsed `lhs op rhs` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition<'a> {
    pub lhs: Cow<'a, str>,
    pub op: Operator,
    pub rhs: Cow<'a, str>,
}

impl<'a> Condition<'a> {
    /// Parse `[ lhs op rhs ]` (brackets optional).
    ///
    /// Returns `None` for a wrong token count or an unknown operator.
    pub fn parse(raw: &'a str, vars: &VariableStore) -> Option<Self> {
        let mut inner = raw.trim();
        inner = inner.strip_prefix('[').unwrap_or(inner);
        inner = inner.strip_suffix(']').unwrap_or(inner);

        let tokens: Vec<&str> = inner.split_whitespace().collect();
        let &[lhs, op, rhs] = tokens.as_slice() else {
            tracing::debug!(tokens = tokens.len(), "condition is not a three-token test");
            return None;
        };

        let Some(op) = Operator::parse(op) else {
            tracing::debug!(op, "unknown test operator");
            return None;
        };

        Some(Self {
            lhs: operand(lhs, vars),
            op,
            rhs: operand(rhs, vars),
        })
    }

    /// Apply the operator.
    pub fn holds(&self) -> bool {
        self.op.apply(&self.lhs, &self.rhs)
    }
}

/// A `$`-prefixed token is expanded; otherwise one quote layer is stripped.
fn operand<'a>(token: &'a str, vars: &VariableStore) -> Cow<'a, str> {
    if token.starts_with('$') {
        Cow::Owned(expand(token, vars))
    } else {
        Cow::Borrowed(strip_quotes(token))
    }
}

/// Evaluate a test expression. Malformed input is false.
pub fn evaluate(raw: &str, vars: &VariableStore) -> bool {
    Condition::parse(raw, vars).is_some_and(|c| c.holds())
}

fn status_of(result: bool) -> ExecResult {
    ExecResult::status(if result { 0 } else { 1 })
}

/// The [ builtin.
pub struct Bracket;

#[async_trait]
impl Builtin for Bracket {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        Ok(status_of(evaluate(ctx.args, ctx.variables)))
    }
}

/// The test builtin (same as [ without the brackets).
pub struct Test;

#[async_trait]
impl Builtin for Test {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        Ok(status_of(evaluate(ctx.args, ctx.variables)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> VariableStore {
        let mut store = VariableStore::new();
        for (k, v) in pairs {
            store.set(k, *v);
        }
        store
    }

    #[test]
    fn test_string_comparison() {
        let store = vars(&[]);
        assert!(evaluate("[ a = a ]", &store));
        assert!(evaluate("[ a == a ]", &store));
        assert!(!evaluate("[ a = b ]", &store));
        assert!(evaluate("[ a != b ]", &store));
        assert!(evaluate("[ \"a\" = 'a' ]", &store));
    }

    #[test]
    fn test_numeric_comparison() {
        let store = vars(&[]);
        assert!(evaluate("[ 3 -eq 3 ]", &store));
        assert!(evaluate("[ 3 -ne 4 ]", &store));
        assert!(evaluate("[ 5 -gt 4 ]", &store));
        assert!(evaluate("[ -5 -lt 4 ]", &store));
        assert!(evaluate("[ 4 -ge 4 ]", &store));
        assert!(evaluate("[ 4 -le 4 ]", &store));
        assert!(evaluate("[ abc -eq 0 ]", &store));
        assert!(!evaluate("[ 10 -lt 9 ]", &store));
    }

    #[test]
    fn test_dollar_tokens_expand() {
        let store = vars(&[("n", "7"), ("s", "x")]);
        assert!(evaluate("[ $n -gt 5 ]", &store));
        assert!(evaluate("[ $s = x ]", &store));
        assert!(evaluate("[ $unset = $unset ]", &store));
    }

    #[test]
    fn test_quoted_dollar_is_not_expanded() {
        let store = vars(&[("a", "1")]);
        assert!(!evaluate("[ \"$a\" = $a ]", &store));
        assert!(evaluate("[ \"$a\" = '$a' ]", &store));
    }

    #[test]
    fn test_malformed_is_false() {
        let store = vars(&[]);
        assert!(!evaluate("[ a = ]", &store));
        assert!(!evaluate("[ ]", &store));
        assert!(!evaluate("[ a = b c ]", &store));
        assert!(!evaluate("[ a -foo a ]", &store));
        assert!(!evaluate("", &store));
    }

    #[test]
    fn test_brackets_optional() {
        let store = vars(&[]);
        assert!(evaluate("1 -lt 2", &store));
        assert!(evaluate("  [1 -lt 2]  ", &store));
    }

    #[test]
    fn test_parse_exposes_triple() {
        let store = vars(&[("x", "hi")]);
        let cond = Condition::parse("[ $x != 'there' ]", &store).unwrap();
        assert_eq!(cond.lhs, "hi");
        assert_eq!(cond.op, Operator::StrNe);
        assert_eq!(cond.rhs, "there");
        assert!(cond.holds());
    }
}
