//! Turns a rule's raw regex text into [`RegexTokens`] and splices in named
//! definitions (`{name}`) recursively.

use frisc_util::FxHashMap;

use crate::error::{LexGenError, Result};
use crate::token::{self, RegexTokens};

/// Rewrites operators to reserved tokens and resolves escapes.
///
/// `\n`, `\t` and `\_` map to a newline placeholder, a tab byte and a space
/// byte respectively; any other `\X` escapes the literal byte `X`,
/// including the operator characters themselves. A bare `$` is the
/// epsilon operator (matches the empty string).
pub fn rewrite_operators(source: &str) -> RegexTokens {
    let bytes = source.as_bytes();
    let mut tokens = RegexTokens::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => {
                tokens.push(match bytes[i + 1] {
                    b'n' => token::NEWLINE_LITERAL,
                    b't' => b'\t' as i16,
                    b'_' => b' ' as i16,
                    other => other as i16,
                });
                i += 2;
            }
            b'\\' => i += 1,
            b'(' => {
                tokens.push(token::LPAREN);
                i += 1;
            }
            b')' => {
                tokens.push(token::RPAREN);
                i += 1;
            }
            b'{' => {
                tokens.push(token::LBRACE);
                i += 1;
            }
            b'}' => {
                tokens.push(token::RBRACE);
                i += 1;
            }
            b'|' => {
                tokens.push(token::ALT);
                i += 1;
            }
            b'*' => {
                tokens.push(token::STAR);
                i += 1;
            }
            b'$' => {
                tokens.push(token::EPSILON);
                i += 1;
            }
            other => {
                tokens.push(other as i16);
                i += 1;
            }
        }
    }
    tokens
}

/// Replaces every `{name}` reference with `( <definition> )`, so the named
/// definition is treated as a parenthesized group by the Thompson
/// construction. `defs` must already contain the fully-spliced token
/// stream of every definition `tokens` can reference.
pub fn splice_named(tokens: &RegexTokens, defs: &FxHashMap<String, RegexTokens>) -> Result<RegexTokens> {
    let mut out = RegexTokens::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == token::LBRACE {
            let start = i;
            let end = tokens[start + 1..]
                .iter()
                .position(|&t| t == token::RBRACE)
                .map(|p| start + 1 + p)
                .ok_or(LexGenError::UnterminatedReference { index: start })?;
            let name = decode_name(&tokens[start + 1..end]);
            let def = defs
                .get(&name)
                .ok_or_else(|| LexGenError::UnknownDefinition { name: name.clone() })?;
            out.push(token::LPAREN);
            out.extend_from_slice(def);
            out.push(token::RPAREN);
            i = end + 1;
        } else {
            out.push(tokens[i]);
            i += 1;
        }
    }
    Ok(out)
}

fn decode_name(tokens: &[i16]) -> String {
    tokens.iter().map(|&t| (t as u8) as char).collect()
}

/// Rejects unbalanced `(`/`)` groups. The Thompson construction assumes
/// every `LPAREN` has a match, so this runs once per fully-spliced regex
/// before any automaton is built.
pub fn validate_groups(tokens: &RegexTokens) -> Result<()> {
    let mut open = Vec::new();
    for (i, &t) in tokens.iter().enumerate() {
        match t {
            token::LPAREN => open.push(i),
            token::RPAREN => {
                if open.pop().is_none() {
                    return Err(LexGenError::UnterminatedGroup { index: i });
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&index) => Err(LexGenError::UnterminatedGroup { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_become_reserved_tokens() {
        let tokens = rewrite_operators("a(b|c)*");
        assert_eq!(
            tokens,
            vec![
                b'a' as i16,
                token::LPAREN,
                b'b' as i16,
                token::ALT,
                b'c' as i16,
                token::RPAREN,
                token::STAR,
            ]
        );
    }

    #[test]
    fn escaped_operator_is_literal() {
        let tokens = rewrite_operators(r"\(\)");
        assert_eq!(tokens, vec![b'(' as i16, b')' as i16]);
    }

    #[test]
    fn escape_specials() {
        let tokens = rewrite_operators(r"\n\t\_");
        assert_eq!(tokens, vec![token::NEWLINE_LITERAL, b'\t' as i16, b' ' as i16]);
    }

    #[test]
    fn bare_dollar_is_epsilon_and_escaped_dollar_is_literal() {
        assert_eq!(rewrite_operators("a|$"), vec![b'a' as i16, token::ALT, token::EPSILON]);
        assert_eq!(rewrite_operators(r"\$"), vec![b'$' as i16]);
    }

    #[test]
    fn splices_named_definition_as_group() {
        let mut defs = FxHashMap::default();
        defs.insert("digit".to_string(), rewrite_operators("0|1"));
        let tokens = rewrite_operators("{digit}*");
        let spliced = splice_named(&tokens, &defs).unwrap();
        assert_eq!(
            spliced,
            vec![
                token::LPAREN,
                b'0' as i16,
                token::ALT,
                b'1' as i16,
                token::RPAREN,
                token::STAR,
            ]
        );
    }

    #[test]
    fn unknown_definition_is_an_error() {
        let defs = FxHashMap::default();
        let tokens = rewrite_operators("{nope}");
        assert!(matches!(
            splice_named(&tokens, &defs),
            Err(LexGenError::UnknownDefinition { .. })
        ));
    }

    #[test]
    fn unbalanced_groups_are_rejected() {
        assert!(validate_groups(&rewrite_operators("(ab")).is_err());
        assert!(validate_groups(&rewrite_operators("ab)")).is_err());
        assert!(validate_groups(&rewrite_operators("(a(b)*)")).is_ok());
    }
}
