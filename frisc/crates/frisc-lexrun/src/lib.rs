//! frisc-lexrun - L1-Run, the table-driven lexical analyzer runtime.
//!
//! Loads a [`frisc_lexgen::LexTable`] produced by `frisc-lexgen` and
//! simulates, in parallel, every rule's ε-NFA for the current lex state
//! against the unconsumed suffix of the source. The rule reporting the
//! longest match wins; ties go to whichever rule was declared first. A
//! byte that no rule can start matching is reported and skipped so the
//! run can continue past a single bad character.

pub mod error;
pub mod simulate;

pub use error::{LexRunError, Result};

use frisc_lexgen::LexTable;
use frisc_util::Line;
use simulate::Simulation;
use tracing::{trace, warn};

/// One outcome of stepping the runtime forward by a single rule match (or
/// a single unrecognized byte).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A rule matched and named a lexical unit to emit.
    Token { unit: String, line: Line, lexeme: String },
    /// No rule in the current lex state could start a match here; the
    /// byte is reported and the cursor advances past it.
    UnrecognizedByte { byte: u8, line: Line },
}

/// Runs `table` over `source` from its starting lex state to end of
/// input, returning every token emitted and every byte that had to be
/// skipped.
pub fn analyze(table: &LexTable, source: &[u8]) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut current_state = table.starting_state.clone();
    let mut line = 1u32;
    let mut start = 0usize;

    while start < source.len() {
        let rules = table
            .states
            .get(&current_state)
            .ok_or_else(|| LexRunError::UnknownLexState(current_state.clone()))?;

        let mut best_len = 0usize;
        let mut best_rule = None;
        for rule in rules {
            let matched = Simulation::new(&rule.nfa).longest_match(&source[start..]);
            if matched > best_len {
                best_len = matched;
                best_rule = Some(rule);
            }
        }

        match best_rule {
            Some(rule) => {
                let consumed = if rule.action.go_back > 0 {
                    rule.action.go_back as usize
                } else {
                    best_len
                };
                if let Some(unit) = &rule.action.unit_to_add {
                    let lexeme = String::from_utf8_lossy(&source[start..start + consumed]).into_owned();
                    trace!(unit = %unit, line, lexeme = %lexeme, "emitting token");
                    events.push(Event::Token { unit: unit.clone(), line: Line::new(line), lexeme });
                }
                start += consumed;
                if rule.action.new_line {
                    line += 1;
                }
                if let Some(next_state) = &rule.action.enter_state {
                    current_state = next_state.clone();
                }
            }
            None => {
                warn!(byte = source[start], line, "no rule matches; skipping one byte");
                events.push(Event::UnrecognizedByte { byte: source[start], line: Line::new(line) });
                start += 1;
            }
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frisc_lexgen::generate;

    const SPEC: &str = "{digit}0|1|2|3|4|5|6|7|8|9\n\
% START\n\
BROJ RAZMAK\n\
<START>{digit}{digit}*\n\
{\n\
BROJ\n\
}\n\
<START>\\_\n\
{\n\
-\n\
}\n";

    #[test]
    fn tokenizes_numbers_and_skips_spaces() {
        let table = generate(SPEC).unwrap();
        let events = analyze(&table, b"12 34").unwrap();
        assert_eq!(
            events,
            vec![
                Event::Token { unit: "BROJ".to_string(), line: Line::new(1), lexeme: "12".to_string() },
                Event::Token { unit: "BROJ".to_string(), line: Line::new(1), lexeme: "34".to_string() },
            ]
        );
    }

    #[test]
    fn unrecognized_byte_is_reported_and_skipped() {
        let table = generate(SPEC).unwrap();
        let events = analyze(&table, b"1@2").unwrap();
        assert_eq!(
            events,
            vec![
                Event::Token { unit: "BROJ".to_string(), line: Line::new(1), lexeme: "1".to_string() },
                Event::UnrecognizedByte { byte: b'@', line: Line::new(1) },
                Event::Token { unit: "BROJ".to_string(), line: Line::new(1), lexeme: "2".to_string() },
            ]
        );
    }
}
