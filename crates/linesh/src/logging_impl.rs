//! Log hygiene for linesh
//!
//! The interpreter emits `tracing` events at these levels:
//!
//! - **INFO**: script start and finish
//! - **DEBUG**: command dispatch, assignments, control-flow decisions
//! - **TRACE**: expansion sizes (never the expanded text)
//! - **WARN**: loop bound reached, command runner could not spawn
//!
//! Scripts routinely carry credentials in variables (`TOKEN=...`), so values
//! pass through [`LogConfig`] before they are attached to an event.

use std::borrow::Cow;
use std::collections::HashSet;

/// Placeholder written instead of a redacted value.
pub const REDACTED: &str = "[REDACTED]";

/// Configuration for what ends up in log events
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether to redact sensitive data from logs (default: true)
    pub redact_sensitive: bool,

    /// Variable name fragments whose values are always redacted (upper-case)
    pub redact_var_patterns: HashSet<String>,

    /// Whether to include script text in logs (default: false)
    pub log_script_content: bool,

    /// Maximum length of logged values before truncation (default: 200)
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        let redact_var_patterns = [
            "PASSWORD",
            "PASSWD",
            "SECRET",
            "TOKEN",
            "KEY",
            "CREDENTIAL",
            "AUTH",
            "PRIVATE",
            "SESSION",
            "COOKIE",
            "DATABASE_URL",
            "CONNECTION_STRING",
        ]
        .iter()
        .map(|p| p.to_string())
        .collect();

        Self {
            redact_sensitive: true,
            redact_var_patterns,
            log_script_content: false,
            max_value_length: 200,
        }
    }
}

impl LogConfig {
    /// Create a new log configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable redaction (debugging only, values may leak into logs)
    pub fn unsafe_disable_redaction(mut self) -> Self {
        self.redact_sensitive = false;
        self
    }

    /// Add a variable name fragment to redact
    pub fn redact_var(mut self, pattern: &str) -> Self {
        self.redact_var_patterns.insert(pattern.to_uppercase());
        self
    }

    /// Include full script text in the start-of-script event
    pub fn unsafe_log_scripts(mut self) -> Self {
        self.log_script_content = true;
        self
    }

    /// Set maximum length for logged values
    pub fn max_value_length(mut self, len: usize) -> Self {
        self.max_value_length = len;
        self
    }

    /// Check if a variable's value must never be logged
    pub fn should_redact_var(&self, name: &str) -> bool {
        if !self.redact_sensitive {
            return false;
        }
        let upper = name.to_uppercase();
        self.redact_var_patterns
            .iter()
            .any(|pattern| upper.contains(pattern.as_str()))
    }

    /// Loggable form of a variable assignment's value
    pub fn redact_assignment<'a>(&self, name: &str, value: &'a str) -> Cow<'a, str> {
        if self.should_redact_var(name) {
            return Cow::Borrowed(REDACTED);
        }
        self.redact_value(value)
    }

    /// Loggable form of an arbitrary value (command line, expansion result)
    pub fn redact_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.redact_sensitive && looks_like_secret(value) {
            return Cow::Borrowed(REDACTED);
        }
        self.truncate(value)
    }

    /// Truncate at a char boundary at or before `max_value_length`
    fn truncate<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.len() <= self.max_value_length {
            return Cow::Borrowed(value);
        }
        let mut end = self.max_value_length;
        while end > 0 && !value.is_char_boundary(end) {
            end -= 1;
        }
        Cow::Owned(format!(
            "{}...[truncated {} bytes]",
            &value[..end],
            value.len() - end
        ))
    }
}

/// Token prefixes used by common API key formats.
const KEY_PREFIXES: &[&str] = &[
    "sk-", "pk-", "sk_live_", "sk_test_", "ghp_", "gho_", "ghs_", "xoxb-", "xoxp-", "AKIA", "eyJ",
];

/// True when the value, or any whitespace-separated word of it, looks like
/// a credential.
fn looks_like_secret(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    if lower.contains("password=") || lower.contains("bearer ") {
        return true;
    }
    value.split_whitespace().any(word_looks_like_secret)
}

fn word_looks_like_secret(word: &str) -> bool {
    let trimmed = word.trim_matches(|c| c == '"' || c == '\'');
    if KEY_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix) && trimmed.len() > prefix.len() + 10)
    {
        return true;
    }

    // Long single-token strings with many distinct characters are usually
    // generated credentials
    if trimmed.len() >= 32
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        let unique: HashSet<char> = trimmed.chars().collect();
        return unique.len() > 15 && unique.len() * 2 > trimmed.len();
    }

    false
}

/// Escape control characters so a value cannot forge extra log lines.
pub fn sanitize_for_log(input: &str) -> String {
    input
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Summarize a script for the start-of-script event
pub fn format_script_for_log(script: &str, config: &LogConfig) -> String {
    if !config.log_script_content {
        return format!(
            "[script: {} lines, {} bytes]",
            script.lines().count(),
            script.len()
        );
    }
    config.truncate(&sanitize_for_log(script)).into_owned()
}
