//! Integer arithmetic for `$((...))`
//!
//! Evaluation is strictly left to right with no operator precedence:
//! `2 + 3 * 4` is `(2 + 3) * 4 = 20`. Operators and operands must be
//! separated by whitespace.

/// Parse the leading integer of `s` the way C's `atoi` does.
///
/// Leading whitespace and one sign are accepted, then as many digits as are
/// present. Anything unparseable yields 0; out-of-range values saturate.
pub fn parse_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative { -value } else { value }
}

/// Parse a status code with [`parse_int`], clamping to the `i32` range.
pub fn parse_status(s: &str) -> i32 {
    let value = parse_int(s);
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Match a whole line of the shape `NAME=$((EXPR))`, returning `(NAME, EXPR)`.
///
/// Without the closing `))` at the very end the line is not an arithmetic
/// assignment and goes through normal sequencing.
pub fn split_arithmetic_assignment(line: &str) -> Option<(&str, &str)> {
    let (name, value) = super::variables::split_assignment(line.trim())?;
    let expr = value.strip_prefix("$((")?.strip_suffix("))")?;
    (!expr.contains("))")).then_some((name, expr))
}

/// Evaluate a whitespace-separated `operand (op operand)*` expression.
///
/// Division by zero leaves the accumulator untouched. A pair with an unknown
/// operator is skipped; a dangling operator ends evaluation.
pub fn evaluate_arithmetic(expr: &str) -> i64 {
    let mut tokens = expr.split_whitespace();
    let Some(first) = tokens.next() else {
        return 0;
    };

    let mut acc = parse_int(first);
    while let Some(op) = tokens.next() {
        let Some(operand) = tokens.next() else {
            break;
        };
        let rhs = parse_int(operand);
        match op {
            "+" => acc = acc.wrapping_add(rhs),
            "-" => acc = acc.wrapping_sub(rhs),
            "*" => acc = acc.wrapping_mul(rhs),
            "/" => {
                if rhs != 0 {
                    acc = acc.wrapping_div(rhs);
                }
            }
            other => tracing::trace!(op = other, "skipping unknown arithmetic operator"),
        }
    }
    acc
}
