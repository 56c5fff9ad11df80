//! Parser module for linesh
//!
//! A recursive block reader over the logical lines produced by [`Lexer`].
//! Each control keyword pulls the lines of its block from the same cursor,
//! so nested constructs are read by recursion and an inner `fi` never closes
//! an outer `if`. A missing terminator ends the block at end of input.

mod ast;
mod lexer;

pub use ast::*;
use lexer::{KEYWORDS, Lexer, first_word};

use crate::interpreter::expand::{find_unquoted, strip_quotes};
use crate::interpreter::variables::split_assignment;

/// Parser for linesh scripts.
pub struct Parser<I> {
    lexer: Lexer<I>,
}

impl<'a> Parser<std::str::Lines<'a>> {
    /// Create a parser over script text.
    pub fn from_script(script: &'a str) -> Self {
        Self::new(script.lines())
    }
}

impl<I> Parser<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    /// Create a parser over physical lines.
    pub fn new(lines: I) -> Self {
        Self {
            lexer: Lexer::new(lines),
        }
    }

    /// Parse the whole input.
    pub fn parse(mut self) -> Script {
        let (nodes, _) = self.parse_block(&[]);
        tracing::debug!(
            nodes = nodes.len(),
            lines = self.lexer.line_number(),
            "parsed script"
        );
        Script { nodes }
    }

    /// Read nodes until a line whose first word is in `terminators`.
    ///
    /// Returns the nodes and the consumed terminator line, or `None` when the
    /// input ran out first.
    fn parse_block(&mut self, terminators: &[&str]) -> (Vec<Node>, Option<String>) {
        let mut nodes = Vec::new();
        while let Some(line) = self.lexer.next_line() {
            let word = first_word(&line);
            if terminators.contains(&word) {
                return (nodes, Some(line));
            }
            if let Some(node) = self.parse_node(line) {
                nodes.push(node);
            }
        }
        (nodes, None)
    }

    /// Turn one logical line into a node, reading further lines for blocks.
    fn parse_node(&mut self, line: String) -> Option<Node> {
        match first_word(&line) {
            "if" => Some(self.parse_if(&line)),
            "for" => Some(self.parse_for(&line)),
            "while" => Some(self.parse_while(&line)),
            "case" => Some(self.parse_case(&line)),
            word if KEYWORDS.contains(&word) || word == ";;" => {
                tracing::debug!(
                    keyword = word,
                    line = self.lexer.line_number(),
                    "ignoring stray keyword"
                );
                None
            }
            _ => Some(classify(line)),
        }
    }

    fn parse_if(&mut self, header: &str) -> Node {
        let mut branches = Vec::new();
        let mut else_body = None;
        let mut condition = condition_of(header, "if", "then");
        self.skip_keyword("then");

        loop {
            let (body, terminator) = self.parse_block(&["elif", "else", "fi"]);
            branches.push(Branch { condition, body });

            let Some(terminator) = terminator else {
                tracing::debug!("if block ended at end of input");
                break;
            };
            match first_word(&terminator) {
                "elif" => {
                    condition = condition_of(&terminator, "elif", "then");
                    self.skip_keyword("then");
                }
                "else" => {
                    let (body, _) = self.parse_block(&["fi"]);
                    else_body = Some(body);
                    break;
                }
                _ => break,
            }
        }

        Node::If {
            branches,
            else_body,
        }
    }

    fn parse_for(&mut self, header: &str) -> Node {
        let mut words = header.split_whitespace().skip(1);
        let var = words.next().unwrap_or_default().to_string();

        let mut values = Vec::new();
        let mut inline_do = false;
        if words.next() == Some("in") {
            for word in words {
                if word == "do" {
                    inline_do = true;
                    break;
                }
                values.push(word);
            }
        }
        let mut values = values.join(" ");
        if let Some(stripped) = values.strip_suffix(';') {
            values = stripped.trim_end().to_string();
        }

        if !inline_do {
            self.skip_keyword("do");
        }
        let (body, _) = self.parse_block(&["done"]);
        Node::For { var, values, body }
    }

    fn parse_while(&mut self, header: &str) -> Node {
        let condition = condition_of(header, "while", "do");
        self.skip_keyword("do");
        let (body, _) = self.parse_block(&["done"]);
        Node::While { condition, body }
    }

    fn parse_case(&mut self, header: &str) -> Node {
        let mut subject = header.trim()["case".len()..].trim();
        if let Some(stripped) = subject.strip_suffix("in") {
            if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
                subject = stripped.trim_end();
            }
        }
        let subject = subject.to_string();

        let mut arms = Vec::new();
        while let Some(line) = self.lexer.next_line() {
            if first_word(&line) == "esac" {
                break;
            }
            let Some((pattern, rest)) = line.split_once(')') else {
                tracing::debug!(line = self.lexer.line_number(), "skipping line outside a case arm");
                continue;
            };
            let pattern = strip_quotes(pattern.trim()).to_string();
            let (body, closed) = self.parse_arm_body(rest.trim());
            arms.push(CaseArm { pattern, body });
            if closed {
                break;
            }
        }

        Node::Case { subject, arms }
    }

    /// Read one arm body through `;;`. Returns true if `esac` closed it.
    fn parse_arm_body(&mut self, inline: &str) -> (Vec<Node>, bool) {
        let mut body = Vec::new();

        let mut next = (!inline.is_empty()).then(|| inline.to_string());
        loop {
            let line = match next.take() {
                Some(line) => line,
                None => match self.lexer.next_line() {
                    Some(line) => line,
                    None => return (body, true),
                },
            };

            if line == ";;" {
                return (body, false);
            }
            if first_word(&line) == "esac" {
                return (body, true);
            }
            if let Some(command) = line.strip_suffix(";;") {
                let command = command.trim();
                if !command.is_empty() {
                    body.extend(self.parse_node(command.to_string()));
                }
                return (body, false);
            }
            body.extend(self.parse_node(line));
        }
    }

    /// Consume the next line if it is exactly `keyword`.
    fn skip_keyword(&mut self, keyword: &str) {
        if self.lexer.peek_line() == Some(keyword) {
            self.lexer.next_line();
        }
    }
}

/// Strip the opening keyword and a trailing `; then`/`then` style suffix.
fn condition_of(header: &str, keyword: &str, suffix: &str) -> String {
    let mut condition = header.trim()[keyword.len()..].trim();
    if let Some(stripped) = condition.strip_suffix(suffix) {
        if stripped.is_empty() || stripped.ends_with(char::is_whitespace) || stripped.ends_with(';')
        {
            condition = stripped.trim_end();
        }
    }
    condition.strip_suffix(';').unwrap_or(condition).trim().to_string()
}

/// A plain logical line: standalone assignment or sequencer command.
fn classify(line: String) -> Node {
    let standalone = [";", "&&", "||"]
        .iter()
        .all(|sep| find_unquoted(&line, sep).is_none());

    if standalone {
        if let Some((name, value)) = split_assignment(&line) {
            if !value.starts_with("$((") {
                return Node::Assignment {
                    name: name.to_string(),
                    value: value.to_string(),
                };
            }
        }
    }
    Node::Command(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(script: &str) -> Vec<Node> {
        Parser::from_script(script).parse().nodes
    }

    fn cmd(s: &str) -> Node {
        Node::Command(s.to_string())
    }

    #[test]
    fn test_commands_and_assignments() {
        assert_eq!(
            parse("x=5\necho $x\ny=$((x + 1))\na=1; b=2"),
            vec![
                Node::Assignment {
                    name: "x".into(),
                    value: "5".into()
                },
                cmd("echo $x"),
                cmd("y=$((x + 1))"),
                cmd("a=1; b=2"),
            ]
        );
    }

    #[test]
    fn test_quoted_assignment_value_is_raw() {
        assert_eq!(
            parse("msg=\"a; b\""),
            vec![Node::Assignment {
                name: "msg".into(),
                value: "\"a; b\"".into()
            }]
        );
    }

    #[test]
    fn test_if_elif_else() {
        let script = "if [ $a = 1 ]; then\n  echo one\nelif [ $a = 2 ]\nthen\n  echo two\nelse\n  echo other\nfi\necho after";
        assert_eq!(
            parse(script),
            vec![
                Node::If {
                    branches: vec![
                        Branch {
                            condition: "[ $a = 1 ]".into(),
                            body: vec![cmd("echo one")],
                        },
                        Branch {
                            condition: "[ $a = 2 ]".into(),
                            body: vec![cmd("echo two")],
                        },
                    ],
                    else_body: Some(vec![cmd("echo other")]),
                },
                cmd("echo after"),
            ]
        );
    }

    #[test]
    fn test_nested_if_does_not_close_outer() {
        let script = "if [ 1 = 1 ]\nthen\nif [ 2 = 2 ]; then\necho inner\nfi\necho outer\nfi";
        let nodes = parse(script);
        assert_eq!(nodes.len(), 1);
        let Node::If { branches, .. } = &nodes[0] else {
            panic!("expected if");
        };
        assert_eq!(branches[0].body.len(), 2);
        assert!(matches!(branches[0].body[0], Node::If { .. }));
        assert_eq!(branches[0].body[1], cmd("echo outer"));
    }

    #[test]
    fn test_trailing_then_without_semicolon() {
        let nodes = parse("if [ a = a ] then\necho y\nfi");
        let Node::If { branches, .. } = &nodes[0] else {
            panic!("expected if");
        };
        assert_eq!(branches[0].condition, "[ a = a ]");
    }

    #[test]
    fn test_for_forms() {
        let expected = Node::For {
            var: "i".into(),
            values: "1 2 3".into(),
            body: vec![cmd("echo $i")],
        };
        assert_eq!(parse("for i in 1 2 3; do\necho $i\ndone"), vec![expected.clone()]);
        assert_eq!(parse("for i in 1 2 3\ndo\necho $i\ndone"), vec![expected.clone()]);
        assert_eq!(parse("for i in 1 2 3; do echo $i; done"), vec![expected]);
    }

    #[test]
    fn test_while() {
        assert_eq!(
            parse("while [ $i -lt 3 ]; do\ni=$((i + 1))\ndone"),
            vec![Node::While {
                condition: "[ $i -lt 3 ]".into(),
                body: vec![cmd("i=$((i + 1))")],
            }]
        );
    }

    #[test]
    fn test_case_multi_line() {
        let script = "case \"$x\" in\n  a)\n    echo A\n    ;;\n  'b') echo B ;;\n  *) echo D;;\nesac";
        assert_eq!(
            parse(script),
            vec![Node::Case {
                subject: "\"$x\"".into(),
                arms: vec![
                    CaseArm {
                        pattern: "a".into(),
                        body: vec![cmd("echo A")],
                    },
                    CaseArm {
                        pattern: "b".into(),
                        body: vec![cmd("echo B")],
                    },
                    CaseArm {
                        pattern: "*".into(),
                        body: vec![cmd("echo D")],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_case_one_line() {
        let nodes = parse("case $x in a) echo A;; *) echo D;; esac\necho next");
        assert_eq!(nodes.len(), 2);
        let Node::Case { subject, arms } = &nodes[0] else {
            panic!("expected case");
        };
        assert_eq!(subject, "$x");
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[1].pattern, "*");
        assert_eq!(nodes[1], cmd("echo next"));
    }

    #[test]
    fn test_unterminated_blocks_end_at_eof() {
        assert_eq!(parse("while [ 1 = 1 ]\ndo\necho x").len(), 1);
        assert_eq!(parse("if [ 1 = 1 ]; then\necho x").len(), 1);
        assert_eq!(parse("case a in\na) echo a").len(), 1);
    }

    #[test]
    fn test_stray_terminators_ignored() {
        assert_eq!(parse("fi\necho a\ndone"), vec![cmd("echo a")]);
    }

    #[test]
    fn test_nested_loop_in_case_arm() {
        let script = "case go in\ngo)\nfor i in 1 2; do\necho $i\ndone\n;;\nesac";
        let nodes = parse(script);
        let Node::Case { arms, .. } = &nodes[0] else {
            panic!("expected case");
        };
        assert!(matches!(arms[0].body[0], Node::For { .. }));
    }
}
