//! Text form of [`ConfigNode`].
//!
//! ```text
//! NAME
//! {
//! 	key = value
//! 	CHILD
//! 	{
//! 	}
//! }
//! ```
//!
//! A line is a value when the text before its first `=` holds no brace and
//! no `//`; the value is the rest of the line, trimmed. On any other line `//`
//! starts a comment, `{` opens a node named by the preceding word (on the same
//! line or the previous one) and `}` closes the innermost node.
//!
//! Names, keys and values are normalised on insertion so that
//! [`render_into`] and [`parse`] are exact inverses.

use super::ConfigNode;
use crate::error::NodeError;

/// Strip everything that would change the meaning of a name or key line.
pub fn clean_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '=' | '\n' | '\r'))
        .collect();
    while name.contains("//") {
        name = name.replace("//", "");
    }
    name.trim().to_owned()
}

/// Values are single-line and carry no surrounding whitespace.
pub fn clean_value(raw: &str) -> String {
    raw.replace(['\n', '\r'], " ").trim().to_owned()
}

pub(crate) fn render_into(node: &ConfigNode, depth: usize, out: &mut String) {
    let indent = "\t".repeat(depth);
    out.push_str(&indent);
    out.push_str(&node.name);
    out.push('\n');
    out.push_str(&indent);
    out.push_str("{\n");
    for (key, value) in &node.values {
        out.push_str(&indent);
        out.push('\t');
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
    for child in &node.nodes {
        render_into(child, depth + 1, out);
    }
    out.push_str(&indent);
    out.push_str("}\n");
}

fn split_value_line(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=')?;
    let key = &line[..eq];
    if key.contains(['{', '}']) || key.contains("//") {
        return None;
    }
    Some((key.trim(), line[eq + 1..].trim()))
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

pub(crate) fn parse(source: &str) -> Result<ConfigNode, NodeError> {
    // stack[0] is the document root
    let mut stack = vec![ConfigNode::default()];
    let mut pending: Option<String> = None;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if let Some((key, value)) = split_value_line(line) {
            pending = None;
            if let Some(top) = stack.last_mut() {
                top.push_raw_value(key.to_owned(), value.to_owned());
            }
            continue;
        }

        let mut rest = strip_comment(line).trim();
        while !rest.is_empty() {
            let Some(pos) = rest.find(['{', '}']) else {
                pending = Some(rest.to_owned());
                break;
            };
            let word = rest[..pos].trim();
            if !word.is_empty() {
                pending = Some(word.to_owned());
            }
            if rest.as_bytes()[pos] == b'{' {
                stack.push(ConfigNode::name_raw(pending.take().unwrap_or_default()));
            } else {
                pending = None;
                if stack.len() < 2 {
                    return Err(NodeError::UnexpectedClose { line: index + 1 });
                }
                if let Some(done) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.nodes.push(done);
                    }
                }
            }
            rest = rest[pos + 1..].trim_start();
        }
    }

    if stack.len() > 1 {
        let name = stack.last().map(|n| n.name.clone()).unwrap_or_default();
        return Err(NodeError::Unclosed { name });
    }
    Ok(stack.pop().unwrap_or_default())
}
