use rustc_hash::FxHashMap;

use super::{Grammar, Symbol};
use crate::ordered_set::{FrozenOrderedSet, MutableSetLike, OrderedSet, SequenceLike, SetLike};

impl Grammar {
    /// FIRST sets with nullability: for every symbol, the terminals a
    /// derivation of it can start with, plus [`Symbol::Null`] if it can derive
    /// the empty string.
    pub fn prefixes(&self) -> &FxHashMap<Symbol, FrozenOrderedSet<Symbol>> {
        self.prefixes.get_or_init(|| self.calculate_prefixes())
    }

    fn calculate_prefixes(&self) -> FxHashMap<Symbol, FrozenOrderedSet<Symbol>> {
        let mut prefixes: FxHashMap<Symbol, OrderedSet<Symbol>> = FxHashMap::default();
        for node in self.nodes() {
            prefixes.insert(node.clone(), OrderedSet::new());
        }
        for token in self.tokens() {
            prefixes.insert(token.clone(), std::iter::once(token.clone()).collect());
        }

        // Sets only grow and are bounded by the terminal alphabet, so this
        // terminates.
        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;
            for rule in self.rule_list() {
                let mut nullable = true;
                for symbol in rule.body.iter() {
                    let Some(symbol_prefixes) = prefixes.get(symbol) else {
                        nullable = false;
                        break;
                    };
                    let firsts: Vec<Symbol> = symbol_prefixes
                        .iter()
                        .filter(|first| !first.is_null())
                        .cloned()
                        .collect();
                    let symbol_nullable = symbol_prefixes.contains(&Symbol::Null);

                    let head_prefixes = prefixes.entry(rule.head.clone()).or_default();
                    for first in firsts {
                        changed |= head_prefixes.add(first);
                    }
                    if !symbol_nullable {
                        nullable = false;
                        break;
                    }
                }
                if nullable {
                    changed |= prefixes
                        .entry(rule.head.clone())
                        .or_default()
                        .add(Symbol::Null);
                }
            }
        }
        tracing::debug!(rounds, symbols = prefixes.len(), "prefix sets converged");

        prefixes
            .into_iter()
            .map(|(symbol, set)| (symbol, set.freeze()))
            .collect()
    }

    /// Prefixes of a whole sequence of symbols.
    ///
    /// Starts from `{Null}` and, while the sequence so far is nullable, swaps
    /// the marker for the prefixes of the next symbol. A [`Symbol::Null`]
    /// inside `sequence` stands for end of input and ends the scan with the
    /// marker still present.
    pub fn get_sequence_prefixes(&self, sequence: &[Symbol]) -> OrderedSet<Symbol> {
        let mut prefixes: OrderedSet<Symbol> = std::iter::once(Symbol::Null).collect();
        let mut rest = sequence.iter();
        while prefixes.contains(&Symbol::Null) {
            let Some(symbol) = rest.next() else { break };
            if symbol.is_null() {
                break;
            }
            prefixes.remove(&Symbol::Null);
            match self.prefixes().get(symbol) {
                Some(symbol_prefixes) => prefixes.extend(symbol_prefixes.iter().cloned()),
                None => {
                    prefixes.add(symbol.clone());
                }
            }
        }
        prefixes
    }

    pub fn is_nullable(&self, symbol: &Symbol) -> bool {
        self.prefixes()
            .get(symbol)
            .is_some_and(|set| set.contains(&Symbol::Null))
    }
}
