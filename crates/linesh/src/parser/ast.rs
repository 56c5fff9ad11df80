//! AST types for parsed linesh scripts
//!
//! Leaves keep their raw, unexpanded text. Expansion happens when the
//! interpreter reaches them, so loop bodies see the current variables on
//! every pass.

/// A complete script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub nodes: Vec<Node>,
}

/// A single statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A logical line for the sequencer (`;`, `&&`, `||` lists included)
    Command(String),

    /// A standalone `NAME=value` line
    Assignment { name: String, value: String },

    /// `if` / `elif` / `else` / `fi`
    If {
        branches: Vec<Branch>,
        else_body: Option<Vec<Node>>,
    },

    /// `for VAR in VALUES; do ...; done`
    For {
        var: String,
        /// Raw value list, expanded once when the loop starts
        values: String,
        body: Vec<Node>,
    },

    /// `while COND; do ...; done`
    While { condition: String, body: Vec<Node> },

    /// `case SUBJECT in ...) ...;; esac`
    Case { subject: String, arms: Vec<CaseArm> },
}

/// One `if` or `elif` arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub condition: String,
    pub body: Vec<Node>,
}

/// One `pattern)` arm of a case statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseArm {
    /// Pattern with quotes stripped; `*` matches anything
    pub pattern: String,
    pub body: Vec<Node>,
}

impl CaseArm {
    /// Whether this arm accepts the (expanded) subject.
    pub fn matches(&self, value: &str) -> bool {
        self.pattern == "*" || self.pattern == value
    }
}
