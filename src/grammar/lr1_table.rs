use std::collections::hash_map::Entry;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::lr_dfa::Automaton;
use super::{Grammar, Rule, Symbol};
use crate::error::GrammarConflictError;
use crate::ordered_set::SequenceLike;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "lowercase")]
pub enum Action {
    Shift(usize),
    Reduce(#[serde(serialize_with = "serialize_rule")] Rule),
    Accept,
}

fn serialize_rule<S: serde::Serializer>(rule: &Rule, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(rule)
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "shift {state}"),
            Action::Reduce(rule) => write!(f, "reduce {rule}"),
            Action::Accept => f.write_str("accept"),
        }
    }
}

pub type ActionTable = FxHashMap<(usize, Symbol), Action>;

fn claim(
    actions: &mut ActionTable,
    state: usize,
    lookahead: &Symbol,
    incoming: Action,
) -> Result<(), GrammarConflictError> {
    match actions.entry((state, lookahead.clone())) {
        Entry::Vacant(slot) => {
            slot.insert(incoming);
            Ok(())
        }
        Entry::Occupied(slot) if *slot.get() == incoming => Ok(()),
        Entry::Occupied(slot) => Err(GrammarConflictError {
            state,
            lookahead: lookahead.clone(),
            existing: slot.get().clone(),
            incoming,
        }),
    }
}

impl Grammar {
    /// Fills the ACTION table from a finished automaton.
    ///
    /// Shifts come from GOTO edges on terminals, reductions from completed
    /// items on their follower, and accept from the completed root item at end
    /// of input. The first slot claimed twice aborts construction.
    #[tracing::instrument(level = "debug", skip_all, fields(states = automaton.closures.len()))]
    pub fn lr1_actions(&self, automaton: &Automaton) -> Result<ActionTable, GrammarConflictError> {
        let mut actions = ActionTable::default();
        for (state, closure) in automaton.closures.iter().enumerate() {
            for token in self.tokens() {
                if let Some(&target) = automaton.gotos.get(&(state, token.clone())) {
                    claim(&mut actions, state, token, Action::Shift(target))?;
                }
            }
            for item in closure.iter().filter(|item| item.is_complete()) {
                if !item.rule.is_root() {
                    claim(
                        &mut actions,
                        state,
                        &item.follower,
                        Action::Reduce(item.rule.clone()),
                    )?;
                } else if item.follower.is_null() {
                    claim(&mut actions, state, &Symbol::Null, Action::Accept)?;
                }
            }
        }
        tracing::debug!(actions = actions.len(), "action table built");
        Ok(actions)
    }
}
