use rustc_hash::FxHashMap;

use super::{Grammar, Rule, Symbol};
use crate::ordered_set::{FrozenOrderedSet, MutableSetLike, OrderedSet, SequenceLike};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LR1Item {
    pub dot: usize,
    pub rule: Rule,
    pub follower: Symbol,
}

impl LR1Item {
    pub fn new(dot: usize, rule: Rule, follower: Symbol) -> Self {
        Self {
            dot,
            rule,
            follower,
        }
    }

    /// The symbol right after the dot.
    pub fn next(&self) -> Option<&Symbol> {
        self.rule.body.get(self.dot)
    }

    /// Body symbols after the one the dot points at.
    pub fn tail(&self) -> &[Symbol] {
        self.rule.body.get(self.dot + 1..).unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.dot >= self.rule.body.len()
    }

    pub fn advance(&self) -> Self {
        Self::new(self.dot + 1, self.rule.clone(), self.follower.clone())
    }
}

pub type Gotos = FxHashMap<(usize, Symbol), usize>;

/// The canonical LR(1) collection.
///
/// `item_sets[i]` is the core (kernel) of state `i` and `closures[i]` its
/// LR(1) closure. State 0 is the start state.
#[derive(Debug, Clone)]
pub struct Automaton {
    pub item_sets: FrozenOrderedSet<FrozenOrderedSet<LR1Item>>,
    pub closures: Vec<FrozenOrderedSet<LR1Item>>,
    pub gotos: Gotos,
}

impl Grammar {
    /// Saturates `core_items` with every item reachable through a
    /// nonterminal right after a dot.
    ///
    /// Items appended while walking are visited too: the cursor only stops
    /// once it catches up with the end of the growing set.
    pub fn lr1_closure(&self, core_items: &FrozenOrderedSet<LR1Item>) -> FrozenOrderedSet<LR1Item> {
        let mut item_set: OrderedSet<LR1Item> = core_items.iter().cloned().collect();
        let mut cursor = 0;
        while let Some(item) = item_set.get(cursor).cloned() {
            cursor += 1;
            let Some(rules) = item.next().and_then(|next| self.rules_for(next)) else {
                continue;
            };
            let mut sequence = item.tail().to_vec();
            sequence.push(item.follower.clone());
            let followers = self.get_sequence_prefixes(&sequence);
            for rule in rules {
                for follower in &followers {
                    item_set.add(LR1Item::new(0, rule.clone(), follower.clone()));
                }
            }
        }
        item_set.freeze()
    }

    /// Builds the canonical collection and GOTO function for `start`.
    ///
    /// States are processed in discovery order and symbols in
    /// [`Grammar::symbols`] order, so numbering is the same on every run.
    #[tracing::instrument(level = "debug", skip_all, fields(start = %start))]
    pub fn lr1_automaton(&self, start: &Symbol) -> Automaton {
        let root = LR1Item::new(0, Rule::root(start.clone()), Symbol::Null);
        let mut item_sets: OrderedSet<FrozenOrderedSet<LR1Item>> = OrderedSet::new();
        item_sets.push(std::iter::once(root).collect());

        let mut closures = Vec::new();
        let mut gotos = Gotos::default();
        let mut state = 0;
        while let Some(core) = item_sets.get(state) {
            let closure = self.lr1_closure(core);
            for symbol in self.symbols() {
                let next_set: OrderedSet<LR1Item> = closure
                    .iter()
                    .filter(|item| item.next() == Some(symbol))
                    .map(LR1Item::advance)
                    .collect();
                if next_set.is_empty() {
                    continue;
                }
                let target = item_sets.push(next_set.freeze());
                gotos.insert((state, symbol.clone()), target);
            }
            closures.push(closure);
            state += 1;
        }

        tracing::debug!(states = item_sets.len(), gotos = gotos.len(), "automaton built");
        Automaton {
            item_sets: item_sets.freeze(),
            closures,
            gotos,
        }
    }
}
