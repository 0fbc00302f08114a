//! Parses the indented parse-tree dump the upstream parser hands to the
//! semantic analyzer. Indentation alone marks depth: each node starts on
//! its own line, indented strictly deeper than its parent. A branch line
//! is the nonterminal's symbol by itself (conventionally `<name>`); a leaf
//! line is three whitespace-separated fields, `SYMBOL line lexeme`.

use std::iter::Peekable;
use std::str::Lines;

use frisc_util::Line;

use crate::error::{Result, TreeError};
use crate::node::{Branch, Leaf, Node};

/// Parses a full indented dump into its root node.
pub fn parse(source: &str) -> Result<Node> {
    let mut lines = source.lines().peekable();
    let root_line = loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => break line,
            None => return Err(TreeError::Empty),
        }
    };

    let mut root = Branch { symbol: root_line.trim_start().to_string(), children: Vec::new() };
    let root_indent = root_line.len() - root_line.trim_start().len();
    parse_children(&mut lines, &mut root, root_indent, 2)?;
    Ok(Node::Branch(root))
}

/// Consumes every line more deeply indented than `depth`, attaching them as
/// `branch`'s children (recursing into nested branches). Stops at the first
/// line indented at or above `depth`, leaving it for the caller.
fn parse_children(
    lines: &mut Peekable<Lines<'_>>,
    branch: &mut Branch,
    depth: usize,
    mut lineno: usize,
) -> Result<usize> {
    loop {
        let Some(line) = lines.peek() else { return Ok(lineno) };
        if line.trim().is_empty() {
            lines.next();
            lineno += 1;
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        if indent <= depth {
            return Ok(lineno);
        }
        let line = lines.next().unwrap();
        let content = &line[indent..];

        if content.starts_with('<') {
            let mut child = Branch { symbol: content.to_string(), children: Vec::new() };
            lineno = parse_children(lines, &mut child, indent, lineno + 1)?;
            branch.children.push(Node::Branch(child));
        } else {
            branch.children.push(Node::Leaf(parse_leaf(content, lineno)?));
            lineno += 1;
        }
    }
}

fn parse_leaf(content: &str, lineno: usize) -> Result<Leaf> {
    let mut parts = content.splitn(3, ' ');
    let symbol = parts.next().filter(|s| !s.is_empty()).ok_or(TreeError::MalformedLeaf(lineno))?;
    let line_text = parts.next().ok_or(TreeError::MalformedLeaf(lineno))?;
    let lexeme = parts.next().unwrap_or("");

    let line_no: u32 = line_text
        .parse()
        .map_err(|_| TreeError::InvalidLineNumber { line: lineno, text: line_text.to_string() })?;

    Ok(Leaf { symbol: symbol.to_string(), line: Line::new(line_no), lexeme: lexeme.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_branch_with_leaf_children() {
        let dump = "<izraz>\n  IDN 1 x\n  PLUS 1 +\n  BROJ 1 2\n";
        let tree = parse(dump).unwrap();
        let branch = tree.as_branch().unwrap();
        assert_eq!(branch.symbol, "<izraz>");
        assert_eq!(branch.children.len(), 3);
        let first = branch.children[0].as_leaf().unwrap();
        assert_eq!(first.symbol, "IDN");
        assert_eq!(first.line.get(), 1);
        assert_eq!(first.lexeme, "x");
    }

    #[test]
    fn parses_nested_branches() {
        let dump = "<naredba>\n  <izraz>\n    IDN 3 y\n";
        let tree = parse(dump).unwrap();
        let branch = tree.as_branch().unwrap();
        assert_eq!(branch.children.len(), 1);
        let nested = branch.children[0].as_branch().unwrap();
        assert_eq!(nested.symbol, "<izraz>");
        assert_eq!(nested.children[0].as_leaf().unwrap().symbol, "IDN");
    }

    #[test]
    fn indentation_depth_need_not_be_a_fixed_unit() {
        // Only the comparison against the parent's indent matters, so any
        // deeper indentation (not just a fixed step) is valid.
        let dump = "<a>\n     IDN 1 x\n";
        let tree = parse(dump).unwrap();
        assert_eq!(tree.children().len(), 1);
    }

    #[test]
    fn round_trips_through_to_dump() {
        let dump = "<a>\n  <b>\n    IDN 1 x\n  BROJ 2 7\n";
        let tree = parse(dump).unwrap();
        let redumped = tree.to_dump();
        let reparsed = parse(&redumped).unwrap();
        assert_eq!(tree, reparsed);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse(""), Err(TreeError::Empty)));
    }

    #[test]
    fn leaf_missing_line_number_is_an_error() {
        let dump = "<a>\n  IDN\n";
        assert!(matches!(parse(dump), Err(TreeError::MalformedLeaf(2))));
    }
}
