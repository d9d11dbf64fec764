// Table Builder: derives ACTION and GOTO tables from the canonical
// collection, checking for shift/reduce and reduce/reduce conflicts.

use std::collections::BTreeMap;
use std::io::{stderr, Write};

use crate::error::TableError;
use crate::grammar::Grammar;
use crate::state::CanonicalCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    Shift(u32),
    Reduce(u32),
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: u32,
    pub terminal: u32,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub action: BTreeMap<(u32, u32), Vec<Action>>,
    pub goto: BTreeMap<(u32, u32), u32>,
}

impl Tables {
    pub fn action_for(&self, state: u32, terminal: u32) -> Option<&Action> {
        self.action.get(&(state, terminal)).and_then(|v| v.first())
    }

    pub fn goto_for(&self, state: u32, non_terminal: u32) -> Option<u32> {
        self.goto.get(&(state, non_terminal)).copied()
    }
}

/// Builds ACTION/GOTO tables from a canonical collection. Always returns the
/// raw conflict list alongside the tables; callers decide via
/// `TableBuilder::build` whether conflicts are fatal.
pub fn derive(grammar: &Grammar, collection: &CanonicalCollection) -> (Tables, Vec<Conflict>) {
    let mut tables = Tables::default();

    for (state_id, row) in collection.transitions.iter().enumerate() {
        for (symbol, target) in row {
            if grammar.registry.is_terminal(*symbol) {
                push_action(&mut tables, state_id as u32, *symbol, Action::Shift(*target));
            } else {
                tables.goto.insert((state_id as u32, *symbol), *target);
            }
        }
    }

    for state in &collection.states {
        for item in &state.items {
            if !item.is_reducible(grammar) {
                continue;
            }
            let production = &grammar.productions[item.production_id as usize];
            if production.id == collection.augmenting_production
                && item.lookahead == grammar.registry.end_marker_id()
            {
                push_action(&mut tables, state.id, item.lookahead, Action::Accept);
            } else {
                push_action(
                    &mut tables,
                    state.id,
                    item.lookahead,
                    Action::Reduce(production.id),
                );
            }
        }
    }

    let mut conflicts = Vec::new();
    for (&(state, terminal), actions) in &tables.action {
        if actions.len() > 1 {
            let conflict = Conflict {
                state,
                terminal,
                actions: actions.clone(),
            };
            eprintln!(
                "conflict in state {} on terminal {}: {:?}",
                state,
                grammar.registry.name_of(terminal).unwrap_or("?"),
                conflict.actions
            );
            conflicts.push(conflict);
        }
    }

    (tables, conflicts)
}

fn push_action(tables: &mut Tables, state: u32, terminal: u32, action: Action) {
    let entry = tables.action.entry((state, terminal)).or_default();
    if !entry.contains(&action) {
        entry.push(action);
    }
}

pub struct TableBuilder;

impl TableBuilder {
    /// Builds tables, refusing grammars with unresolved conflicts unless
    /// `allow_conflicts` is set — resolving the open question of whether a
    /// conflicted grammar should be allowed to run at all.
    pub fn build(
        grammar: &Grammar,
        collection: &CanonicalCollection,
        allow_conflicts: bool,
    ) -> Result<(Tables, Vec<Conflict>), TableError> {
        let (tables, conflicts) = derive(grammar, collection);
        if !conflicts.is_empty() && !allow_conflicts {
            let _ = writeln!(
                stderr(),
                "refusing to build a parser for a grammar with {} conflict(s); pass --allow-conflicts to proceed anyway",
                conflicts.len()
            );
            return Err(TableError::from_conflicts(&conflicts));
        }
        Ok((tables, conflicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::FirstSets;
    use crate::state;

    #[test]
    fn accept_action_present_at_end_marker() {
        let (grammar, _) = Grammar::load_str("Program -> i32\n");
        let first = FirstSets::compute(&grammar);
        let (augmented, collection) = state::build(&grammar, &first);
        let (tables, conflicts) = derive(&augmented, &collection);
        assert!(conflicts.is_empty());
        let hash = augmented.registry.end_marker_id();
        let has_accept = tables
            .action
            .values()
            .any(|actions| actions.contains(&Action::Accept));
        assert!(has_accept, "expected an Accept action somewhere, hash={}", hash);
    }

    #[test]
    fn dangling_else_produces_shift_reduce_conflict() {
        let text = "\
Program -> IfStmt
IfStmt -> if i32 Program | if i32 Program else Program | None
";
        let (grammar, _) = Grammar::load_str(text);
        let first = FirstSets::compute(&grammar);
        let (augmented, collection) = state::build(&grammar, &first);
        let (_tables, conflicts) = derive(&augmented, &collection);
        assert!(!conflicts.is_empty());
    }

    #[test]
    fn allow_conflicts_false_rejects_conflicted_grammar() {
        let text = "\
Program -> IfStmt
IfStmt -> if i32 Program | if i32 Program else Program | None
";
        let (grammar, _) = Grammar::load_str(text);
        let first = FirstSets::compute(&grammar);
        let (augmented, collection) = state::build(&grammar, &first);
        assert!(TableBuilder::build(&augmented, &collection, false).is_err());
        assert!(TableBuilder::build(&augmented, &collection, true).is_ok());
    }
}
