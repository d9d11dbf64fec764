// FIRST-Set Engine: fixed-point computation of FIRST(X) for every symbol,
// plus FIRST(alpha) for arbitrary right-hand-side sequences.

use std::collections::{BTreeMap, BTreeSet};

use crate::grammar::Grammar;

#[derive(Debug, Clone)]
pub struct FirstSets {
    table: BTreeMap<u32, BTreeSet<u32>>,
    epsilon_id: u32,
}

impl FirstSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let registry = &grammar.registry;
        let mut table: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();

        for terminal_id in 0..registry.terminal_count() {
            table.insert(terminal_id, [terminal_id].into_iter().collect());
        }
        table.insert(registry.epsilon_id(), [registry.epsilon_id()].into_iter().collect());
        for (non_terminal_id, _) in registry.non_terminals() {
            table.entry(non_terminal_id).or_default();
        }

        loop {
            let mut changed = false;
            for production in &grammar.productions {
                let mut addition: BTreeSet<u32> = BTreeSet::new();
                let mut all_nullable = true;
                for symbol in &production.rhs {
                    let first_of_symbol = table.get(symbol).cloned().unwrap_or_default();
                    for s in first_of_symbol.iter().filter(|s| **s != registry.epsilon_id()) {
                        addition.insert(*s);
                    }
                    if !first_of_symbol.contains(&registry.epsilon_id()) {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable {
                    addition.insert(registry.epsilon_id());
                }
                let entry = table.entry(production.lhs).or_default();
                let before = entry.len();
                entry.extend(addition);
                if entry.len() != before {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        Self {
            table,
            epsilon_id: registry.epsilon_id(),
        }
    }

    pub fn of(&self, symbol: u32) -> BTreeSet<u32> {
        self.table.get(&symbol).cloned().unwrap_or_default()
    }

    /// FIRST of a sequence of symbols (e.g. a production's remaining
    /// right-hand side, possibly followed by a synthetic trailing terminal
    /// standing in for a lookahead).
    pub fn of_sequence(&self, sequence: &[u32]) -> BTreeSet<u32> {
        let mut result = BTreeSet::new();
        let mut all_nullable = true;
        for symbol in sequence {
            let first = self.of(*symbol);
            for s in first.iter().filter(|s| **s != self.epsilon_id) {
                result.insert(*s);
            }
            if !first.contains(&self.epsilon_id) {
                all_nullable = false;
                break;
            }
        }
        if all_nullable {
            result.insert(self.epsilon_id);
        }
        result
    }

    /// FIRST(beta a): the lookahead set for an item produced by closing over
    /// `[A -> alpha . B beta, a]`, where `beta` is the tail following `B`
    /// and `a` is the current item's own lookahead terminal.
    pub fn of_tail_with_lookahead(&self, tail: &[u32], lookahead: u32) -> BTreeSet<u32> {
        let mut sequence: Vec<u32> = tail.to_vec();
        sequence.push(lookahead);
        self.of_sequence(&sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    #[test]
    fn first_of_terminal_is_itself() {
        let (grammar, _) = Grammar::load_str("A -> i32\n");
        let first = FirstSets::compute(&grammar);
        let i32_id = grammar.registry.id_of("i32").unwrap();
        assert_eq!(first.of(i32_id), [i32_id].into_iter().collect());
    }

    #[test]
    fn nullable_chain_propagates_epsilon() {
        let (grammar, _) = Grammar::load_str("A -> B C\nB -> None\nC -> None\n");
        let first = FirstSets::compute(&grammar);
        let a = grammar.registry.id_of("A").unwrap();
        assert!(first.of(a).contains(&grammar.registry.epsilon_id()));
    }

    #[test]
    fn first_stops_at_first_non_nullable_symbol() {
        let (grammar, _) = Grammar::load_str("A -> B C\nB -> None\nC -> i32\n");
        let first = FirstSets::compute(&grammar);
        let a = grammar.registry.id_of("A").unwrap();
        let i32_id = grammar.registry.id_of("i32").unwrap();
        assert!(first.of(a).contains(&i32_id));
        assert!(!first.of(a).contains(&grammar.registry.epsilon_id()));
    }

    #[test]
    fn of_tail_with_lookahead_substitutes_when_nullable() {
        let (grammar, _) = Grammar::load_str("A -> B\nB -> None\n");
        let first = FirstSets::compute(&grammar);
        let b = grammar.registry.id_of("B").unwrap();
        let hash = grammar.registry.end_marker_id();
        let result = first.of_tail_with_lookahead(&[b], hash);
        assert_eq!(result, [hash].into_iter().collect());
    }
}
