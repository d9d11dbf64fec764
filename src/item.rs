// LR(1) items: a production with a dot marking progress and a single
// lookahead terminal. Sets of items are plain `BTreeSet`s, which gives
// structural dedup and sorted-equality for free — exactly the identity rule
// the canonical collection relies on (kernel plus closure, compared as a
// whole).

use std::collections::BTreeSet;

use crate::grammar::Grammar;
use crate::production::Production;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LR1Item {
    pub production_id: u32,
    pub dot: usize,
    pub lookahead: u32,
}

impl LR1Item {
    pub fn new(production_id: u32, dot: usize, lookahead: u32) -> Self {
        Self {
            production_id,
            dot,
            lookahead,
        }
    }

    pub fn start(production_id: u32, lookahead: u32) -> Self {
        Self::new(production_id, 0, lookahead)
    }

    fn production<'a>(&self, grammar: &'a Grammar) -> &'a Production {
        &grammar.productions[self.production_id as usize]
    }

    /// The grammar symbol immediately after the dot, or `None` if the dot is
    /// at the end of the right-hand side.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<u32> {
        self.production(grammar).rhs.get(self.dot).copied()
    }

    /// The symbols after the dot's immediate successor (used to compute a
    /// closure lookahead set via FIRST(beta a)).
    pub fn tail_after_next(&self, grammar: &Grammar) -> Vec<u32> {
        let rhs = &self.production(grammar).rhs;
        if self.dot + 1 < rhs.len() {
            rhs[self.dot + 1..].to_vec()
        } else {
            Vec::new()
        }
    }

    pub fn shifted(&self) -> Self {
        Self::new(self.production_id, self.dot + 1, self.lookahead)
    }

    /// True when the item is a completed reduction: the dot has moved past
    /// the whole right-hand side, or the production is the singleton
    /// `A -> None` (which is always reducible, independent of dot position).
    pub fn is_reducible(&self, grammar: &Grammar) -> bool {
        let production = self.production(grammar);
        if production.is_epsilon(&grammar.registry) {
            return true;
        }
        self.dot >= production.rhs.len()
    }
}

pub type ItemSet = BTreeSet<LR1Item>;

/// Closes a kernel item set under the usual LR(1) closure rule: for every
/// item `[A -> alpha . B beta, a]` with `B` a non-terminal, for every
/// production `B -> gamma` and terminal `b` in FIRST(beta a), add
/// `[B -> . gamma, b]`.
pub fn closure(
    grammar: &Grammar,
    first_sets: &crate::first::FirstSets,
    kernel: ItemSet,
) -> ItemSet {
    let mut items = kernel;
    loop {
        let mut additions = ItemSet::new();
        for item in items.iter() {
            let next = match item.next_symbol(grammar) {
                Some(s) => s,
                None => continue,
            };
            if !grammar.registry.is_non_terminal(next) {
                continue;
            }
            let tail = item.tail_after_next(grammar);
            let lookaheads = first_sets.of_tail_with_lookahead(&tail, item.lookahead);
            for production in grammar
                .productions
                .iter()
                .filter(|p| p.lhs == next)
            {
                for lookahead in &lookaheads {
                    let new_item = LR1Item::start(production.id, *lookahead);
                    if !items.contains(&new_item) {
                        additions.insert(new_item);
                    }
                }
            }
        }
        if additions.is_empty() {
            break;
        }
        items.extend(additions);
    }
    items
}

/// GOTO(I, X): shift every item whose symbol after the dot is `X`, then take
/// the closure of the result. Returns an empty set if no item in `items`
/// shifts on `X`.
pub fn goto(
    grammar: &Grammar,
    first_sets: &crate::first::FirstSets,
    items: &ItemSet,
    symbol: u32,
) -> ItemSet {
    let shifted: ItemSet = items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(|item| item.shifted())
        .collect();
    if shifted.is_empty() {
        shifted
    } else {
        closure(grammar, first_sets, shifted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::FirstSets;

    #[test]
    fn closure_adds_productions_of_symbol_after_dot() {
        let (grammar, _) = Grammar::load_str("A -> B\nB -> i32\n");
        let first = FirstSets::compute(&grammar);
        let hash = grammar.registry.end_marker_id();
        let mut kernel = ItemSet::new();
        kernel.insert(LR1Item::start(0, hash));
        let closed = closure(&grammar, &first, kernel);
        assert!(closed.iter().any(|i| i.production_id == 1));
    }

    #[test]
    fn goto_on_absent_symbol_is_empty() {
        let (grammar, _) = Grammar::load_str("A -> i32\n");
        let first = FirstSets::compute(&grammar);
        let hash = grammar.registry.end_marker_id();
        let mut kernel = ItemSet::new();
        kernel.insert(LR1Item::start(0, hash));
        let closed = closure(&grammar, &first, kernel);
        let let_id = grammar.registry.id_of("let").unwrap();
        assert!(goto(&grammar, &first, &closed, let_id).is_empty());
    }

    #[test]
    fn epsilon_production_is_always_reducible() {
        let (grammar, _) = Grammar::load_str("A -> None\n");
        let item = LR1Item::start(0, grammar.registry.end_marker_id());
        assert!(item.is_reducible(&grammar));
    }
}
