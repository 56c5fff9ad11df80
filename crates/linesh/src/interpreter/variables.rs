//! Variable store
//!
//! User variables live in an unbounded map. The special names `? $ # * @`
//! are backed by dedicated cells and intercepted before the map is consulted.

use std::borrow::Cow;
use std::collections::HashMap;

use super::arithmetic::{parse_int, parse_status};

/// Names whose values are computed from interpreter state.
pub const SPECIAL_NAMES: [char; 5] = ['?', '$', '#', '*', '@'];

/// Returns true for a special single-character variable name.
pub fn is_special(c: char) -> bool {
    SPECIAL_NAMES.contains(&c)
}

/// Returns true if `name` is a valid user variable name (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split `NAME=value` into its parts when NAME is a valid identifier.
pub fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once('=')?;
    is_valid_name(name).then_some((name, value))
}

/// Mapping from name to value plus the special pseudo-variables.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    vars: HashMap<String, String>,
    exit_status: i32,
    process_id: u32,
    arg_count: i64,
    arg_list: String,
}

impl VariableStore {
    /// Create a freshly reset store.
    pub fn new() -> Self {
        let mut store = Self::default();
        store.reset();
        store
    }

    /// Re-initialize every cell and drop all user variables.
    pub fn reset(&mut self) {
        self.vars.clear();
        self.exit_status = 0;
        self.process_id = std::process::id();
        self.arg_count = 0;
        self.arg_list.clear();
    }

    /// Look up a variable. Unknown names resolve to the empty string.
    pub fn get(&self, name: &str) -> Cow<'_, str> {
        match name {
            "?" => Cow::Owned(self.exit_status.to_string()),
            "$" => Cow::Owned(self.process_id.to_string()),
            "#" => Cow::Owned(self.arg_count.to_string()),
            "*" | "@" => Cow::Borrowed(&self.arg_list),
            _ => self
                .vars
                .get(name)
                .map(|v| Cow::Borrowed(v.as_str()))
                .unwrap_or(Cow::Borrowed("")),
        }
    }

    /// Assign a variable, overwriting any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match name {
            "?" => self.exit_status = parse_status(&value),
            "#" => self.arg_count = parse_int(&value),
            "*" | "@" => self.arg_list = value,
            "$" => tracing::debug!("ignoring write to read-only variable $"),
            _ => {
                self.vars.insert(name.to_string(), value);
            }
        }
    }

    /// Whether a user variable has been assigned.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Status of the most recently dispatched command.
    pub fn exit_status(&self) -> i32 {
        self.exit_status
    }

    /// Record the status of the most recently dispatched command.
    pub fn set_exit_status(&mut self, status: i32) {
        self.exit_status = status;
    }

    /// Install script name and positional arguments (`$0`, `$1`.., `$#`, `$*`, `$@`).
    pub fn set_positional(&mut self, script_name: &str, args: &[String]) {
        self.vars.insert("0".to_string(), script_name.to_string());
        for (i, arg) in args.iter().enumerate() {
            self.vars.insert((i + 1).to_string(), arg.clone());
        }
        self.arg_count = args.len() as i64;
        self.arg_list = args.join(" ");
    }

    /// Number of user variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no user variable has been assigned.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
