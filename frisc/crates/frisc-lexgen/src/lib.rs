//! frisc-lexgen - L1-Gen, the regex-to-ε-NFA lexer table generator.
//!
//! Reads a lexer specification (named regular definitions, lex states,
//! lexical unit names, and the rules binding a regex to an action in each
//! state) and compiles every rule's regex into a Thompson-construction
//! ε-NFA. The result is a [`table::LexTable`] that can be serialized to
//! the on-disk format `frisc-lexrun` loads at startup.
//!
//! Pipeline: [`spec::parse`] → [`rewrite`] (operator rewriting + named
//! definition splicing, already folded into `parse`) → [`thompson::transform`]
//! per rule → [`table::LexTable`].

pub mod error;
pub mod nfa;
pub mod rewrite;
pub mod spec;
pub mod table;
pub mod thompson;
pub mod token;

use indexmap::IndexMap;
use tracing::debug;

pub use error::{LexGenError, Result};
pub use nfa::{Nfa, StateId};
pub use table::{LexRule, LexTable, RuleAction};

/// Compiles a full lexer specification into a [`LexTable`].
pub fn generate(source: &str) -> Result<LexTable> {
    let parsed = spec::parse(source)?;
    let starting_state = parsed
        .lex_states
        .first()
        .cloned()
        .ok_or_else(|| LexGenError::MalformedSpec {
            line: 0,
            reason: "specification declares no lex states".to_string(),
        })?;

    let mut states: IndexMap<String, Vec<LexRule>> =
        parsed.lex_states.iter().map(|s| (s.clone(), Vec::new())).collect();

    for rule in parsed.rules {
        let mut nfa = Nfa::new();
        thompson::transform(&rule.regex, &mut nfa);
        debug!(
            lex_state = %rule.lex_state,
            states = nfa.len(),
            unit = %rule.unit_to_add,
            "compiled rule regex to an epsilon-NFA"
        );
        let entry = states.entry(rule.lex_state).or_default();
        entry.push(LexRule {
            nfa,
            action: RuleAction {
                unit_to_add: (rule.unit_to_add != "-").then_some(rule.unit_to_add),
                new_line: rule.new_line,
                enter_state: rule.enter_state,
                go_back: rule.go_back,
            },
        });
    }

    Ok(LexTable { starting_state, states })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "{digit}0|1|2|3|4|5|6|7|8|9\n\
% START\n\
BROJ RAZMAK\n\
<START>{digit}*\n\
{\n\
BROJ\n\
}\n\
<START>\\_\n\
{\n\
-\n\
}\n";

    #[test]
    fn generates_a_table_with_one_rule_per_lex_state_entry() {
        let table = generate(SAMPLE).unwrap();
        assert_eq!(table.starting_state, "START");
        assert_eq!(table.states["START"].len(), 2);
        assert_eq!(table.states["START"][0].action.unit_to_add.as_deref(), Some("BROJ"));
        assert_eq!(table.states["START"][1].action.unit_to_add, None);
    }

    #[test]
    fn missing_lex_states_is_an_error() {
        assert!(generate("% \nUNIT\n").is_err());
    }
}
