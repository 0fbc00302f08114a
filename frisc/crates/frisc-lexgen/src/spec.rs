//! Parses the lexer-generator specification language: named regular
//! definitions, the list of lex states, the list of lexical unit names,
//! and the per-state rules that bind a regex to an action.

use frisc_util::FxHashMap;

use crate::error::{LexGenError, Result};
use crate::rewrite::{rewrite_operators, splice_named, validate_groups};
use crate::token::RegexTokens;

/// One `STATE> regex { ... }` rule as written in the specification.
pub struct RawRule {
    pub lex_state: String,
    pub regex: RegexTokens,
    pub unit_to_add: String,
    pub new_line: bool,
    pub enter_state: Option<String>,
    pub go_back: u32,
}

/// The specification after named definitions have been rewritten and
/// spliced into every regex that references them.
pub struct ParsedSpec {
    pub lex_states: Vec<String>,
    pub units: Vec<String>,
    pub rules: Vec<RawRule>,
}

/// Parses `source`, which must have the shape:
///
/// ```text
/// {name} regex
/// {name} regex
/// ...
/// % STATE1 STATE2 ...
/// UNIT1 UNIT2 ...
/// <STATE>regex
/// {
/// UNIT_TO_ADD
/// NOVI_REDAK
/// UDJI_U_STANJE OTHER_STATE
/// VRATI_SE n
/// }
/// ...
/// ```
///
/// `%` terminates the block of named definitions; what follows it on the
/// same line lists the lex states, the following line lists the lexical
/// unit names, and every remaining line pair/block is a rule.
pub fn parse(source: &str) -> Result<ParsedSpec> {
    let mut lines = source.lines().enumerate().peekable();
    let mut defs: FxHashMap<String, RegexTokens> = FxHashMap::default();

    let mut header_line = None;
    while let Some(&(lineno, line)) = lines.peek() {
        if line.trim_start().starts_with('%') {
            header_line = Some(line);
            lines.next();
            break;
        }
        lines.next();
        let (name, raw_regex) = parse_definition(line, lineno)?;
        let tokens = rewrite_operators(raw_regex);
        let spliced = splice_named(&tokens, &defs)?;
        validate_groups(&spliced)?;
        defs.insert(name, spliced);
    }

    let header = header_line.ok_or_else(|| LexGenError::MalformedSpec {
        line: 0,
        reason: "missing `%` line listing lex states".to_string(),
    })?;
    let lex_states: Vec<String> = header
        .trim_start_matches('%')
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let (_units_lineno, units_line) = lines.next().ok_or_else(|| LexGenError::MalformedSpec {
        line: 0,
        reason: "missing lexical unit name line".to_string(),
    })?;
    let units: Vec<String> = units_line.split_whitespace().map(str::to_string).collect();

    let mut rules = Vec::new();
    while let Some((lineno, line)) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        let (lex_state, raw_regex) = parse_rule_header(line, lineno)?;
        let tokens = rewrite_operators(raw_regex);
        let regex = splice_named(&tokens, &defs)?;
        validate_groups(&regex)?;

        expect_line(&mut lines, lineno, "{")?;
        let (_, unit_to_add) = lines.next().ok_or_else(|| LexGenError::MalformedSpec {
            line: lineno,
            reason: "rule body missing UNIT_TO_ADD line".to_string(),
        })?;

        let mut new_line = false;
        let mut enter_state = None;
        let mut go_back = 0u32;
        loop {
            let (action_lineno, action_line) = lines.next().ok_or_else(|| LexGenError::MalformedSpec {
                line: lineno,
                reason: "unterminated rule body".to_string(),
            })?;
            if action_line == "}" {
                break;
            } else if action_line == "NOVI_REDAK" {
                new_line = true;
            } else if let Some(rest) = action_line.strip_prefix("UDJI_U_STANJE ") {
                enter_state = Some(rest.to_string());
            } else if let Some(rest) = action_line.strip_prefix("VRATI_SE ") {
                go_back = rest.trim().parse().map_err(|_| LexGenError::MalformedSpec {
                    line: action_lineno,
                    reason: "VRATI_SE argument is not an integer".to_string(),
                })?;
            } else if !action_line.trim().is_empty() {
                return Err(LexGenError::MalformedSpec {
                    line: action_lineno,
                    reason: format!("unrecognized rule action `{action_line}`"),
                });
            }
        }

        rules.push(RawRule {
            lex_state,
            regex,
            unit_to_add: unit_to_add.to_string(),
            new_line,
            enter_state,
            go_back,
        });
    }

    Ok(ParsedSpec { lex_states, units, rules })
}

fn parse_definition(line: &str, lineno: usize) -> Result<(String, &str)> {
    let open = line.find('{').ok_or_else(|| LexGenError::MalformedSpec {
        line: lineno,
        reason: "named definition missing `{`".to_string(),
    })?;
    let close = line.find('}').ok_or_else(|| LexGenError::MalformedSpec {
        line: lineno,
        reason: "named definition missing `}`".to_string(),
    })?;
    let name = line[open + 1..close].to_string();
    let regex = line[close + 1..].trim_start();
    Ok((name, regex))
}

fn parse_rule_header(line: &str, lineno: usize) -> Result<(String, &str)> {
    let rest = line.strip_prefix('<').ok_or_else(|| LexGenError::MalformedSpec {
        line: lineno,
        reason: "rule header must start with `<STATE>regex`".to_string(),
    })?;
    let close = rest.find('>').ok_or_else(|| LexGenError::MalformedSpec {
        line: lineno,
        reason: "rule header missing `>` after lex state name".to_string(),
    })?;
    Ok((rest[..close].to_string(), &rest[close + 1..]))
}

fn expect_line<'a>(
    lines: &mut std::iter::Peekable<impl Iterator<Item = (usize, &'a str)>>,
    lineno: usize,
    expected: &str,
) -> Result<()> {
    match lines.next() {
        Some((_, line)) if line == expected => Ok(()),
        _ => Err(LexGenError::MalformedSpec {
            line: lineno,
            reason: format!("expected `{expected}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "{digit}0|1|2|3|4|5|6|7|8|9\n\
% START COMMENT\n\
BROJ\n\
<START>{digit}*\n\
{\n\
BROJ\n\
}\n\
<START>\\_\n\
{\n\
-\n\
}\n";

    #[test]
    fn parses_states_units_and_rules() {
        let parsed = parse(SAMPLE).unwrap();
        assert_eq!(parsed.lex_states, vec!["START", "COMMENT"]);
        assert_eq!(parsed.units, vec!["BROJ"]);
        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.rules[0].unit_to_add, "BROJ");
        assert_eq!(parsed.rules[1].unit_to_add, "-");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(parse("{digit}0\nSTART\n").is_err());
    }
}
