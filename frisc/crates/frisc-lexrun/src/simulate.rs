//! Parallel bitset simulation of a single rule's ε-NFA.
//!
//! Two bit-sets drive each step: `X` holds the current state set, `Y` is
//! scratch space for the next one, and an explicit stack computes the
//! ε-closure after every step instead of recursing (so a long chain of
//! ε-transitions can't blow the call stack).

use frisc_lexgen::{token, Nfa, StateId};
use frisc_util::Idx;

pub struct Simulation<'a> {
    nfa: &'a Nfa,
    x: Vec<bool>,
    y: Vec<bool>,
    stack: Vec<StateId>,
}

impl<'a> Simulation<'a> {
    pub fn new(nfa: &'a Nfa) -> Self {
        let n = nfa.len();
        Self {
            nfa,
            x: vec![false; n],
            y: vec![false; n],
            stack: Vec::new(),
        }
    }

    /// A freshly built table still carries the `\n` placeholder label; a
    /// table reloaded from disk has it resolved to the literal byte. Match
    /// either spelling so both paths lex newlines identically.
    fn label_matches(l: i16, label: i16) -> bool {
        l == label || (l == token::NEWLINE_LITERAL && label == b'\n' as i16)
    }

    fn step(&mut self, label: i16) {
        for i in 0..self.x.len() {
            if self.x[i] {
                for (l, targets) in self.nfa.transitions(StateId::from_usize(i)) {
                    if Self::label_matches(l, label) {
                        for &t in targets {
                            self.stack.push(t);
                            self.y[t.index()] = true;
                        }
                    }
                }
            }
        }

        while let Some(top) = self.stack.pop() {
            for (l, targets) in self.nfa.transitions(top) {
                if l == token::EPSILON {
                    for &t in targets {
                        if !self.y[t.index()] {
                            self.stack.push(t);
                            self.y[t.index()] = true;
                        }
                    }
                }
            }
        }

        self.x.iter_mut().for_each(|b| *b = false);
        std::mem::swap(&mut self.x, &mut self.y);
    }

    /// Feeds `input` byte by byte from the start state (always index 0),
    /// tracking the longest prefix for which the accept state (always
    /// index 1, by construction of `frisc_lexgen::thompson::transform`)
    /// was reached. Returns that prefix's length, or `0` for no match.
    pub fn longest_match(&mut self, input: &[u8]) -> usize {
        if self.x.is_empty() {
            return 0;
        }
        self.x.iter_mut().for_each(|b| *b = false);
        self.y.iter_mut().for_each(|b| *b = false);
        self.x[0] = true;
        self.step(token::EPSILON);

        let mut recognized = 0;
        let mut pos = 0;
        while pos < input.len() {
            if !self.x.iter().any(|&b| b) {
                break;
            }
            self.step(input[pos] as i16);
            pos += 1;
            if self.x.len() > 1 && self.x[1] {
                recognized = pos;
            }
        }
        recognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frisc_lexgen::rewrite::rewrite_operators;
    use frisc_lexgen::thompson::transform;

    fn build(pattern: &str) -> Nfa {
        let mut nfa = Nfa::new();
        transform(&rewrite_operators(pattern), &mut nfa);
        nfa
    }

    #[test]
    fn matches_longest_prefix() {
        let nfa = build("a*");
        let mut sim = Simulation::new(&nfa);
        assert_eq!(sim.longest_match(b"aaab"), 3);
    }

    #[test]
    fn no_match_returns_zero() {
        let nfa = build("a");
        let mut sim = Simulation::new(&nfa);
        assert_eq!(sim.longest_match(b"bbb"), 0);
    }

    #[test]
    fn alternation_picks_whichever_prefix_is_present() {
        let nfa = build("cat|car");
        let mut sim = Simulation::new(&nfa);
        assert_eq!(sim.longest_match(b"car "), 3);
        assert_eq!(sim.longest_match(b"cat "), 3);
    }

    #[test]
    fn newline_placeholder_matches_a_real_newline() {
        let nfa = build(r"\n");
        let mut sim = Simulation::new(&nfa);
        assert_eq!(sim.longest_match(b"\nx"), 1);
    }

    #[test]
    fn epsilon_operator_contributes_no_input() {
        // `a|$` can match the empty string, which reports as length 0 (the
        // arbitration layer treats that the same as no match).
        let nfa = build("(a|$)b");
        let mut sim = Simulation::new(&nfa);
        assert_eq!(sim.longest_match(b"b"), 1);
        assert_eq!(sim.longest_match(b"ab"), 2);
    }
}
