//! The on-disk lex table (`enfa.txt`): one starting lex-state name, then a
//! run of lex-state blocks, each holding the rules (ε-NFA + action) that
//! apply while the runtime is in that state.
//!
//! # Grammar
//!
//! ```text
//! <starting-lex-state>
//! (<lex-state-name>
//!  (<num-states>
//!   (<state-id> <num-transitions>
//!    (<label> <num-targets> <target>...)*)*
//!   <unit-to-add>
//!   <new-line: 0|1>
//!   <enter-state>        ; empty line if absent
//!   <go-back>)+
//!  -
//! )*
//! ```
//!
//! Every count is written explicitly so a reader never has to infer a
//! block's end from a blank line, the way the hand-written tool this
//! format is modeled on did.

use std::io::{self, BufRead, Write};

use indexmap::IndexMap;

use frisc_util::Idx;

use crate::error::{LexGenError, Result};
use crate::nfa::{Nfa, StateId};
use crate::token;

/// What the runtime does when a rule wins the longest-match arbitration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleAction {
    /// The lexical unit name to emit, or `None` to suppress output
    /// entirely (the `-` sentinel in the specification language).
    pub unit_to_add: Option<String>,
    /// Whether matching this rule advances the source line counter.
    pub new_line: bool,
    /// The lex state to switch to, if any.
    pub enter_state: Option<String>,
    /// `VRATI_SE n`: consume only `n` bytes of the match and roll the
    /// cursor back, instead of consuming the full matched prefix. Zero
    /// means "consume the whole match".
    pub go_back: u32,
}

/// One rule: an ε-NFA fragment plus the action to take when it wins.
#[derive(Clone, Debug)]
pub struct LexRule {
    pub nfa: Nfa,
    pub action: RuleAction,
}

/// A compiled lexer: every lex state's rule set, plus which state the
/// runtime starts in.
#[derive(Clone, Debug)]
pub struct LexTable {
    pub starting_state: String,
    pub states: IndexMap<String, Vec<LexRule>>,
}

impl LexTable {
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "{}", self.starting_state)?;
        for (state_name, rules) in &self.states {
            writeln!(w, "{state_name}")?;
            for rule in rules {
                writeln!(w, "{}", rule.nfa.len())?;
                for state_id in rule.nfa.iter_states() {
                    let transitions: Vec<_> = rule.nfa.transitions(state_id).collect();
                    writeln!(w, "{} {}", state_id.0, transitions.len())?;
                    for (label, targets) in transitions {
                        write!(w, "{label} {}", targets.len())?;
                        for t in targets {
                            write!(w, " {}", t.0)?;
                        }
                        writeln!(w)?;
                    }
                }
                writeln!(w, "{}", rule.action.unit_to_add.as_deref().unwrap_or("-"))?;
                writeln!(w, "{}", rule.action.new_line as u8)?;
                writeln!(w, "{}", rule.action.enter_state.as_deref().unwrap_or(""))?;
                writeln!(w, "{}", rule.action.go_back)?;
            }
            writeln!(w, "-")?;
        }
        Ok(())
    }

    pub fn read_from(r: &mut impl BufRead) -> Result<Self> {
        let mut lines = r.lines();
        let starting_state = next_line(&mut lines, "starting state")?;
        let mut states = IndexMap::new();

        loop {
            let Some(state_name) = try_next_line(&mut lines)? else {
                break;
            };
            let mut rules = Vec::new();
            loop {
                let marker = next_line(&mut lines, "rule marker or lex-state terminator")?;
                if marker == "-" {
                    break;
                }
                let num_states: usize = parse_usize(&marker, "state count")?;
                let mut nfa = Nfa::new();
                for _ in 0..num_states {
                    let header = next_line(&mut lines, "state header")?;
                    let (id_str, count_str) = split_two(&header, "state header")?;
                    let id: usize = parse_usize(id_str, "state id")?;
                    let num_transitions: usize = parse_usize(count_str, "transition count")?;
                    while nfa.len() <= id {
                        nfa.new_state();
                    }
                    let from = StateId::from_usize(id);
                    for _ in 0..num_transitions {
                        let line = next_line(&mut lines, "transition")?;
                        let mut parts = line.split(' ');
                        let label: i16 = parts
                            .next()
                            .ok_or_else(|| malformed("transition missing label"))?
                            .parse()
                            .map_err(|_| malformed("transition label is not an integer"))?;
                        let label = if label == token::NEWLINE_LITERAL {
                            b'\n' as i16
                        } else {
                            label
                        };
                        let num_targets: usize = parts
                            .next()
                            .ok_or_else(|| malformed("transition missing target count"))?
                            .parse()
                            .map_err(|_| malformed("transition target count is not an integer"))?;
                        for _ in 0..num_targets {
                            let target: usize = parts
                                .next()
                                .ok_or_else(|| malformed("transition missing target"))?
                                .parse()
                                .map_err(|_| malformed("transition target is not an integer"))?;
                            while nfa.len() <= target {
                                nfa.new_state();
                            }
                            nfa.add_transition(from, label, StateId::from_usize(target));
                        }
                    }
                }
                let unit_to_add = next_line(&mut lines, "unit-to-add")?;
                let new_line = next_line(&mut lines, "new-line flag")? == "1";
                let enter_state = next_line(&mut lines, "enter-state")?;
                let go_back: u32 = parse_usize(&next_line(&mut lines, "go-back")?, "go-back")? as u32;
                rules.push(LexRule {
                    nfa,
                    action: RuleAction {
                        unit_to_add: (unit_to_add != "-").then_some(unit_to_add),
                        new_line,
                        enter_state: (!enter_state.is_empty()).then_some(enter_state),
                        go_back,
                    },
                });
            }
            states.insert(state_name, rules);
        }

        Ok(Self { starting_state, states })
    }
}

fn malformed(reason: &str) -> LexGenError {
    LexGenError::MalformedSpec { line: 0, reason: reason.to_string() }
}

fn next_line(lines: &mut std::io::Lines<impl BufRead>, context: &str) -> Result<String> {
    lines
        .next()
        .transpose()
        .map_err(|e| malformed(&format!("I/O error reading {context}: {e}")))?
        .ok_or_else(|| malformed(&format!("unexpected end of table while reading {context}")))
}

fn try_next_line(lines: &mut std::io::Lines<impl BufRead>) -> Result<Option<String>> {
    lines
        .next()
        .transpose()
        .map_err(|e| malformed(&format!("I/O error: {e}")))
}

fn split_two<'a>(s: &'a str, context: &str) -> Result<(&'a str, &'a str)> {
    s.split_once(' ').ok_or_else(|| malformed(&format!("expected two fields in {context}")))
}

fn parse_usize(s: &str, context: &str) -> Result<usize> {
    s.parse().map_err(|_| malformed(&format!("expected an integer for {context}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::rewrite_operators;
    use crate::thompson::transform;
    use std::io::Cursor;

    fn sample_table() -> LexTable {
        let mut nfa = Nfa::new();
        transform(&rewrite_operators("a(b|c)*"), &mut nfa);
        let mut states = IndexMap::new();
        states.insert(
            "START".to_string(),
            vec![LexRule {
                nfa,
                action: RuleAction {
                    unit_to_add: Some("IDENT".to_string()),
                    new_line: false,
                    enter_state: None,
                    go_back: 0,
                },
            }],
        );
        LexTable { starting_state: "START".to_string(), states }
    }

    #[test]
    fn round_trips_through_the_text_format() {
        let table = sample_table();
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        let loaded = LexTable::read_from(&mut cursor).unwrap();

        assert_eq!(loaded.starting_state, table.starting_state);
        assert_eq!(loaded.states.len(), table.states.len());
        let original_rule = &table.states["START"][0];
        let loaded_rule = &loaded.states["START"][0];
        assert_eq!(loaded_rule.action, original_rule.action);
        assert_eq!(loaded_rule.nfa.len(), original_rule.nfa.len());
    }

    #[test]
    fn suppressed_unit_round_trips_as_none() {
        let mut nfa = Nfa::new();
        transform(&rewrite_operators(" "), &mut nfa);
        let mut states = IndexMap::new();
        states.insert(
            "START".to_string(),
            vec![LexRule {
                nfa,
                action: RuleAction {
                    unit_to_add: None,
                    new_line: true,
                    enter_state: Some("COMMENT".to_string()),
                    go_back: 3,
                },
            }],
        );
        let table = LexTable { starting_state: "START".to_string(), states };

        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        let loaded = LexTable::read_from(&mut Cursor::new(buf)).unwrap();
        let action = &loaded.states["START"][0].action;
        assert_eq!(action.unit_to_add, None);
        assert!(action.new_line);
        assert_eq!(action.enter_state.as_deref(), Some("COMMENT"));
        assert_eq!(action.go_back, 3);
    }
}
