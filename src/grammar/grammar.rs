use std::fmt;
use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;

use super::lr1_parser::LR1Parser;
use super::scanner::{builtin_scanner, keyword_scanner, Scanner};
use super::{Symbol, EPSILON};
use crate::error::GrammarError;
use crate::ordered_set::{FrozenOrderedSet, MutableSetLike, OrderedSet, SequenceLike, SetLike};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub head: Symbol,
    pub body: Arc<[Symbol]>,
}

impl Rule {
    pub fn new<H, B, S>(head: H, body: B) -> Self
    where
        H: Into<Symbol>,
        B: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Self {
            head: head.into(),
            body: body.into_iter().map(Into::into).collect(),
        }
    }

    /// The synthetic rule `Null -> start` the automaton is seeded with.
    pub(crate) fn root(start: Symbol) -> Self {
        Self {
            head: Symbol::Null,
            body: Arc::from([start]),
        }
    }

    pub fn is_root(&self) -> bool {
        self.head.is_null()
    }

    /// Printable head; the root rule borrows its start symbol's name with a
    /// prime.
    pub fn head_name(&self) -> String {
        match (&self.head, self.body.first()) {
            (Symbol::Null, Some(start)) => format!("{start}'"),
            (head, _) => head.to_string(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> ", self.head_name())?;
        if self.body.is_empty() {
            return f.write_str(EPSILON);
        }
        let body = self
            .body
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&body)
    }
}

/// Rules plus one scanner per terminal.
///
/// Everything derived from the rules is computed on first request and then
/// kept; a `Grammar` never changes after construction otherwise.
pub struct Grammar {
    rule_list: Vec<Rule>,
    token_scanners: Vec<(Symbol, Scanner)>,
    nodes: OnceLock<FrozenOrderedSet<Symbol>>,
    symbols: OnceLock<FrozenOrderedSet<Symbol>>,
    tokens: OnceLock<FrozenOrderedSet<Symbol>>,
    rules_by_head: OnceLock<FxHashMap<Symbol, FrozenOrderedSet<Rule>>>,
    pub(super) prefixes: OnceLock<FxHashMap<Symbol, FrozenOrderedSet<Symbol>>>,
}

impl Grammar {
    /// Builds a grammar from explicit rules.
    ///
    /// Every terminal gets a scanner: the one in `extra_scanners` if given,
    /// else a built-in one for `""` and `" "`, else one matching the
    /// terminal's own text. Scanners are registered in the order terminals
    /// first appear in rule bodies, which is also the tie-break order of
    /// [`Grammar::scan_token`].
    pub fn from_rules<I, K>(rules: Vec<Rule>, extra_scanners: I) -> Self
    where
        I: IntoIterator<Item = (K, Scanner)>,
        K: Into<Symbol>,
    {
        let mut extra: FxHashMap<Symbol, Scanner> = extra_scanners
            .into_iter()
            .map(|(token, scanner)| (token.into(), scanner))
            .collect();

        let mut g = Self {
            rule_list: rules,
            token_scanners: Vec::new(),
            nodes: OnceLock::new(),
            symbols: OnceLock::new(),
            tokens: OnceLock::new(),
            rules_by_head: OnceLock::new(),
            prefixes: OnceLock::new(),
        };

        let token_scanners = g
            .tokens()
            .iter()
            .filter_map(|token| {
                let name = token.name()?;
                let scanner = extra
                    .remove(token)
                    .or_else(|| builtin_scanner(name))
                    .unwrap_or_else(|| keyword_scanner(name));
                Some((token.clone(), scanner))
            })
            .collect();
        g.token_scanners = token_scanners;

        tracing::debug!(
            rules = g.rule_list.len(),
            tokens = g.token_scanners.len(),
            "grammar built"
        );
        g
    }

    pub fn rule_list(&self) -> &[Rule] {
        &self.rule_list
    }

    pub(super) fn token_scanners(&self) -> &[(Symbol, Scanner)] {
        &self.token_scanners
    }

    /// Nonterminals, in order of their first rule.
    pub fn nodes(&self) -> &FrozenOrderedSet<Symbol> {
        self.nodes.get_or_init(|| {
            self.rule_list
                .iter()
                .map(|rule| rule.head.clone())
                .collect()
        })
    }

    /// Every body symbol in order of first appearance, then any head that
    /// never appears in a body.
    pub fn symbols(&self) -> &FrozenOrderedSet<Symbol> {
        self.symbols.get_or_init(|| {
            let mut symbols: OrderedSet<Symbol> = self
                .rule_list
                .iter()
                .flat_map(|rule| rule.body.iter().cloned())
                .collect();
            symbols.extend(self.nodes().iter().cloned());
            symbols.freeze()
        })
    }

    /// Terminals: symbols that head no rule.
    pub fn tokens(&self) -> &FrozenOrderedSet<Symbol> {
        self.tokens.get_or_init(|| {
            let nodes = self.nodes();
            self.symbols()
                .iter()
                .filter(|symbol| !nodes.contains(symbol))
                .cloned()
                .collect()
        })
    }

    pub fn rules_by_head(&self) -> &FxHashMap<Symbol, FrozenOrderedSet<Rule>> {
        self.rules_by_head.get_or_init(|| {
            let mut rules: FxHashMap<Symbol, OrderedSet<Rule>> = FxHashMap::default();
            for rule in &self.rule_list {
                rules.entry(rule.head.clone()).or_default().add(rule.clone());
            }
            rules
                .into_iter()
                .map(|(head, set)| (head, set.freeze()))
                .collect()
        })
    }

    /// Rules whose head is `node`; `None` for terminals.
    pub fn rules_for(&self, node: &Symbol) -> Option<&FrozenOrderedSet<Rule>> {
        self.rules_by_head().get(node)
    }

    pub fn is_node(&self, symbol: &Symbol) -> bool {
        self.nodes().contains(symbol)
    }

    /// Head of the first rule, the usual start symbol.
    pub fn first_node(&self) -> Option<&Symbol> {
        self.rule_list.first().map(|rule| &rule.head)
    }

    pub fn get_parser_for(&self, node: &str) -> Result<LR1Parser<'_>, GrammarError> {
        let start = Symbol::new(node);
        if !self.is_node(&start) {
            return Err(GrammarError::UnknownStart(node.to_string()));
        }
        Ok(LR1Parser::new(self, start))
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("rule_list", &self.rule_list)
            .field(
                "scanned_tokens",
                &self
                    .token_scanners
                    .iter()
                    .map(|(token, _)| token)
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn names(set: &FrozenOrderedSet<Symbol>) -> Vec<String> {
        set.iter().map(ToString::to_string).collect()
    }

    fn assignment() -> Grammar {
        Grammar::from_rules(
            vec![
                Rule::new("stmts", ["identifier", "=", "expr"]),
                Rule::new("expr", ["identifier"]),
                Rule::new("expr", ["(", "expr", ")"]),
            ],
            Vec::<(&str, Scanner)>::new(),
        )
    }

    #[test]
    fn derived_sets_follow_rule_order() {
        let g = assignment();
        assert_eq!(names(g.nodes()), vec!["stmts", "expr"]);
        assert_eq!(
            names(g.symbols()),
            vec!["identifier", "=", "expr", "(", ")", "stmts"]
        );
        assert_eq!(names(g.tokens()), vec!["identifier", "=", "(", ")"]);
    }

    #[test]
    fn rules_grouped_by_head() {
        let g = assignment();
        let expr = g.rules_for(&Symbol::new("expr")).unwrap();
        assert_eq!(expr.len(), 2);
        assert_eq!(expr.get(1).unwrap().to_string(), "expr -> ( expr )");
        assert!(g.rules_for(&Symbol::new("identifier")).is_none());
    }

    #[test]
    fn duplicate_rules_collapse() {
        let g = Grammar::from_rules(
            vec![Rule::new("s", ["a"]), Rule::new("s", ["a"])],
            Vec::<(&str, Scanner)>::new(),
        );
        assert_eq!(g.rule_list().len(), 2);
        assert_eq!(g.rules_for(&Symbol::new("s")).unwrap().len(), 1);
    }

    #[test]
    fn every_token_has_a_scanner() {
        let g = assignment();
        let scanned: Vec<String> = g
            .token_scanners()
            .iter()
            .map(|(token, _)| token.to_string())
            .collect();
        assert_eq!(scanned, names(g.tokens()));
    }

    #[test]
    fn start_must_be_a_nonterminal() {
        let g = assignment();
        assert!(g.get_parser_for("stmts").is_ok());
        assert_eq!(
            g.get_parser_for("identifier").err(),
            Some(GrammarError::UnknownStart("identifier".to_string()))
        );
    }

    #[test]
    fn root_rule_prints_with_prime() {
        let root = Rule::root(Symbol::new("stmts"));
        assert!(root.is_root());
        assert_eq!(root.to_string(), "stmts' -> stmts");
        assert_eq!(Rule::new("a", Vec::<&str>::new()).to_string(), "a -> ε");
    }
}
