// LR(1) Item-Set Builder: constructs the canonical collection of item sets
// via CLOSURE and GOTO, producing the state transition graph. A worklist
// walk over states, in the `first_unprocessed_state` / `new_parser_state`
// shape, but comparing states by full item-set equality rather than merging
// lookaheads into congruent kernels the way LALR construction would.

use std::collections::{BTreeMap, VecDeque};

use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::item::{self, ItemSet, LR1Item};

pub const START_STATE: u32 = 0;

#[derive(Debug, Clone)]
pub struct State {
    pub id: u32,
    pub items: ItemSet,
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalCollection {
    pub states: Vec<State>,
    /// `transitions[state][symbol] = next_state`, covering both terminal
    /// shifts and non-terminal gotos; the Table Builder splits them apart.
    pub transitions: Vec<BTreeMap<u32, u32>>,
    /// The augmenting production `S' -> Program` appended after load.
    pub augmenting_production: u32,
    pub augmenting_symbol: u32,
}

/// Builds the canonical collection for `grammar`, after appending the
/// synthetic augmenting production `S' -> Program`. Returns the augmented
/// grammar (with the extra production) alongside the collection, since the
/// Table Builder and Parse Driver both need to see it too.
pub fn build(grammar: &Grammar, first_sets: &FirstSets) -> (Grammar, CanonicalCollection) {
    let mut augmented = grammar.clone();
    let augmenting_symbol = augmented.registry.register_non_terminal("S'");
    let augmenting_id = augmented.productions.len() as u32;
    augmented.productions.push(crate::production::Production::new(
        augmenting_id,
        augmenting_symbol,
        vec![grammar.start_symbol],
    ));

    let hash = augmented.registry.end_marker_id();
    let mut kernel = ItemSet::new();
    kernel.insert(LR1Item::start(augmenting_id, hash));
    let start_items = item::closure(&augmented, first_sets, kernel);

    let mut states = vec![State {
        id: START_STATE,
        items: start_items,
    }];
    let mut transitions = vec![BTreeMap::new()];
    let mut worklist: VecDeque<u32> = VecDeque::new();
    worklist.push_back(START_STATE);

    while let Some(state_id) = worklist.pop_front() {
        let items = states[state_id as usize].items.clone();
        let mut symbols: Vec<u32> = items
            .iter()
            .filter_map(|i| i.next_symbol(&augmented))
            .filter(|s| !augmented.registry.is_epsilon(*s))
            .collect();
        symbols.sort_unstable();
        symbols.dedup();

        for symbol in symbols {
            let goto_items = item::goto(&augmented, first_sets, &items, symbol);
            if goto_items.is_empty() {
                continue;
            }
            let existing = states.iter().find(|s| s.items == goto_items).map(|s| s.id);
            let target = match existing {
                Some(id) => id,
                None => {
                    let id = states.len() as u32;
                    states.push(State {
                        id,
                        items: goto_items,
                    });
                    transitions.push(BTreeMap::new());
                    worklist.push_back(id);
                    id
                }
            };
            transitions[state_id as usize].insert(symbol, target);
        }
    }

    (
        augmented,
        CanonicalCollection {
            states,
            transitions,
            augmenting_production: augmenting_id,
            augmenting_symbol,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_state_kernel_is_augmenting_item() {
        let (grammar, _) = Grammar::load_str("Program -> i32\n");
        let first = FirstSets::compute(&grammar);
        let (augmented, collection) = build(&grammar, &first);
        let hash = augmented.registry.end_marker_id();
        assert!(collection.states[START_STATE as usize]
            .items
            .contains(&LR1Item::start(collection.augmenting_production, hash)));
    }

    #[test]
    fn build_is_deterministic_in_state_count() {
        let (grammar, _) = Grammar::load_str("Program -> A A\nA -> i32\n");
        let first = FirstSets::compute(&grammar);
        let (_augmented, collection) = build(&grammar, &first);
        let (grammar2, _) = Grammar::load_str("Program -> A A\nA -> i32\n");
        let first2 = FirstSets::compute(&grammar2);
        let (_augmented2, collection2) = build(&grammar2, &first2);
        assert_eq!(collection.states.len(), collection2.states.len());
    }

    #[test]
    fn every_transition_target_is_a_valid_state() {
        let (grammar, _) = Grammar::load_str("Program -> if i32 { Program } | None\n");
        let first = FirstSets::compute(&grammar);
        let (_augmented, collection) = build(&grammar, &first);
        for row in &collection.transitions {
            for target in row.values() {
                assert!((*target as usize) < collection.states.len());
            }
        }
    }
}
