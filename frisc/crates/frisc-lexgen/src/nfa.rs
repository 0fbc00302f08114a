//! The ε-NFA fragment built for a single rule's regex.

use frisc_util::{define_idx, FxHashMap, IndexVec};

define_idx!(StateId);

/// A Thompson-construction ε-NFA: one bitset-friendly vector of states,
/// each with a map from input label to the set of states it leads to.
///
/// Labels are either [`crate::token::EPSILON`] or a literal byte
/// (`0..=255`, plus the transient [`crate::token::NEWLINE_LITERAL`]
/// sentinel that is only ever resolved once the table is loaded back by
/// `frisc-lexrun`).
#[derive(Clone, Debug, Default)]
pub struct Nfa {
    states: IndexVec<StateId, FxHashMap<i16, Vec<StateId>>>,
}

impl Nfa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fresh state with no outgoing transitions and returns its id.
    pub fn new_state(&mut self) -> StateId {
        self.states.push(FxHashMap::default())
    }

    /// Adds a transition `from --label--> to`.
    pub fn add_transition(&mut self, from: StateId, label: i16, to: StateId) {
        self.states[from].entry(label).or_default().push(to);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn transitions(&self, state: StateId) -> impl Iterator<Item = (i16, &[StateId])> {
        self.states[state].iter().map(|(&label, to)| (label, to.as_slice()))
    }

    pub fn iter_states(&self) -> impl Iterator<Item = StateId> {
        self.states.indices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::EPSILON;

    #[test]
    fn new_states_start_with_no_transitions() {
        let mut nfa = Nfa::new();
        let s = nfa.new_state();
        assert_eq!(nfa.transitions(s).count(), 0);
    }

    #[test]
    fn add_transition_is_visible_by_label() {
        let mut nfa = Nfa::new();
        let a = nfa.new_state();
        let b = nfa.new_state();
        nfa.add_transition(a, EPSILON, b);
        let targets: Vec<StateId> = nfa.transitions(a).find(|(l, _)| *l == EPSILON).unwrap().1.to_vec();
        assert_eq!(targets, vec![b]);
    }
}
