use std::sync::OnceLock;

use rustc_hash::FxHashSet;

use super::lr1_table::{Action, ActionTable};
use super::lr_dfa::{Automaton, Gotos, LR1Item};
use super::node::{Node, Span};
use super::scanner::Token;
use super::{Grammar, Symbol};
use crate::error::{GrammarConflictError, ParseError};
use crate::ordered_set::{FrozenOrderedSet, SequenceLike};

/// An LR(1) parser for one start nonterminal of a grammar.
///
/// The automaton and the ACTION table are built on first use and then shared
/// by every later call; each `parse` owns its own stack and tree, so a parser
/// can be used from several threads at once.
#[derive(Debug)]
pub struct LR1Parser<'g> {
    grammar: &'g Grammar,
    root_node: Symbol,
    automaton: OnceLock<Automaton>,
    actions: OnceLock<Result<ActionTable, GrammarConflictError>>,
}

impl<'g> LR1Parser<'g> {
    pub(crate) fn new(grammar: &'g Grammar, root_node: Symbol) -> Self {
        Self {
            grammar,
            root_node,
            automaton: OnceLock::new(),
            actions: OnceLock::new(),
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn root_node(&self) -> &Symbol {
        &self.root_node
    }

    fn automaton(&self) -> &Automaton {
        self.automaton
            .get_or_init(|| self.grammar.lr1_automaton(&self.root_node))
    }

    /// Cores of the canonical collection; the index of a core is its state.
    pub fn item_sets(&self) -> &FrozenOrderedSet<FrozenOrderedSet<LR1Item>> {
        &self.automaton().item_sets
    }

    /// The LR(1) closure of every state, in state order.
    pub fn closures(&self) -> &[FrozenOrderedSet<LR1Item>] {
        &self.automaton().closures
    }

    pub fn gotos(&self) -> &Gotos {
        &self.automaton().gotos
    }

    /// The ACTION table, or the conflict that makes this grammar unusable.
    pub fn actions(&self) -> Result<&ActionTable, GrammarConflictError> {
        self.actions
            .get_or_init(|| self.grammar.lr1_actions(self.automaton()))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn action(&self, state: usize, token: &Symbol) -> Result<Option<&Action>, GrammarConflictError> {
        Ok(self.actions()?.get(&(state, token.clone())))
    }

    /// Tokens with an action in `state`: terminals in grammar order, then
    /// end of input.
    pub fn expected_tokens(&self, state: usize) -> Result<Vec<Symbol>, GrammarConflictError> {
        let actions = self.actions()?;
        Ok(self
            .grammar
            .tokens()
            .iter()
            .chain(std::iter::once(&Symbol::Null))
            .filter(|token| actions.contains_key(&(state, (*token).clone())))
            .cloned()
            .collect())
    }

    pub fn parse(&self, source: &str) -> Result<Node, ParseError> {
        self.parse_from(source, 0)
    }

    /// Shift-reduce parse of `source` starting at byte `offset`.
    ///
    /// Fails if the grammar has a conflict, if no scanner recognizes the text
    /// at some position, or if a token has no action in the current state.
    /// Shifting an empty token twice from the same state without consuming
    /// input in between is [`ParseError::NoProgress`], since the parse would
    /// never end.
    #[tracing::instrument(level = "debug", skip_all, fields(start = %self.root_node, len = source.len(), offset = offset))]
    pub fn parse_from(&self, source: &str, offset: usize) -> Result<Node, ParseError> {
        let actions = self.actions()?;
        let gotos = self.gotos();

        let mut states: Vec<usize> = vec![0];
        let mut nodes: Vec<Node> = Vec::new();
        // States an empty token was shifted from since input was last consumed.
        let mut empty_shifts: FxHashSet<usize> = FxHashSet::default();
        let mut token = self.grammar.scan_token(source, offset)?;
        loop {
            let state = states.last().copied().unwrap_or_default();
            let Some(action) = actions.get(&(state, token.symbol.clone())) else {
                return Err(self.unexpected(state, token)?);
            };
            match action {
                Action::Shift(target) => {
                    if !token.span.is_empty() {
                        empty_shifts.clear();
                    } else if !empty_shifts.insert(state) {
                        tracing::debug!(token = %token.symbol, state, "empty token shifted twice from one state");
                        return Err(ParseError::NoProgress {
                            offset: token.span.start,
                            token: token.symbol,
                        });
                    }
                    tracing::trace!(token = %token.symbol, span = %token.span, target, "shift");
                    let text = source
                        .get(token.span.start..token.span.end)
                        .unwrap_or_default();
                    nodes.push(Node::leaf(token.symbol.clone(), token.span, text));
                    states.push(*target);
                    token = self.grammar.scan_token(source, token.span.end)?;
                }
                Action::Reduce(rule) => {
                    tracing::trace!(%rule, "reduce");
                    let n = rule.body.len();
                    let children = nodes.split_off(nodes.len() - n);
                    states.truncate(states.len() - n);
                    let span = match (children.first(), children.last()) {
                        (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
                        _ => Span::new(token.span.start, token.span.start),
                    };
                    let exposed = states.last().copied().unwrap_or_default();
                    let Some(&target) = gotos.get(&(exposed, rule.head.clone())) else {
                        return Err(self.unexpected(state, token)?);
                    };
                    nodes.push(Node::interior(rule.head.clone(), span, children));
                    states.push(target);
                }
                Action::Accept => {
                    tracing::debug!(states = states.len(), "accept");
                    return match nodes.pop() {
                        Some(root) => Ok(root),
                        None => Err(self.unexpected(state, token)?),
                    };
                }
            }
        }
    }

    fn unexpected(&self, state: usize, token: Token) -> Result<ParseError, GrammarConflictError> {
        Ok(ParseError::UnexpectedToken {
            span: token.span,
            token: token.symbol,
            expected: self.expected_tokens(state)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::node::NodeValue;
    use crate::grammar::scanner::{identifier, scanner, Scanner};
    use crate::grammar::Rule;

    fn assignment(extra: &[&str]) -> Grammar {
        let mut rules = vec!["stmts identifier = expr", "expr identifier"];
        rules.extend_from_slice(extra);
        Grammar::from_description(rules, [("identifier", scanner(identifier))]).unwrap()
    }

    fn leaf(name: &str, start: usize, end: usize, text: &str) -> Node {
        Node::leaf(Symbol::new(name), Span::new(start, end), text)
    }

    fn interior(name: &str, start: usize, end: usize, children: Vec<Node>) -> Node {
        Node::interior(Symbol::new(name), Span::new(start, end), children)
    }

    #[test]
    fn parses_assignment() {
        let g = assignment(&[]);
        let parser = g.get_parser_for("stmts").unwrap();
        let tree = parser.parse("x=fuy").unwrap();
        assert_eq!(
            tree,
            interior(
                "stmts",
                0,
                5,
                vec![
                    leaf("identifier", 0, 1, "x"),
                    leaf("=", 1, 2, "="),
                    interior("expr", 2, 5, vec![leaf("identifier", 2, 5, "fuy")]),
                ]
            )
        );
        assert_eq!(tree.children().len(), 3);
        assert_eq!(tree.children()[2].children()[0].text(), Some("fuy"));
    }

    #[test]
    fn tables_are_reused_across_parses() {
        let g = assignment(&[]);
        let parser = g.get_parser_for("stmts").unwrap();
        let first = parser.parse("a=b").unwrap();
        let states = parser.item_sets().len();
        let second = parser.parse("a=b").unwrap();
        assert_eq!(first, second);
        assert_eq!(parser.item_sets().len(), states);
        assert!(std::ptr::eq(parser.item_sets(), parser.item_sets()));
    }

    #[test]
    fn unexpected_token_reports_expected_set() {
        let g = assignment(&["expr @ identifier"]);
        let parser = g.get_parser_for("stmts").unwrap();
        let err = parser.parse("x@y").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                span: Span::new(1, 2),
                token: Symbol::new("@"),
                expected: vec![Symbol::new("=")],
            }
        );
        assert_eq!(
            err.to_string(),
            "unexpected token at [1..2]: @; expected one of: ="
        );
    }

    #[test]
    fn unknown_character_is_a_tokenization_error() {
        let g = assignment(&[]);
        let parser = g.get_parser_for("stmts").unwrap();
        assert_eq!(
            parser.parse("x@y"),
            Err(ParseError::Tokenization { offset: 1 })
        );
    }

    #[test]
    fn premature_end_of_input() {
        let g = assignment(&[]);
        let parser = g.get_parser_for("stmts").unwrap();
        match parser.parse("x=") {
            Err(ParseError::UnexpectedToken { span, token, expected }) => {
                assert_eq!(span, Span::new(2, 2));
                assert_eq!(token, Symbol::Null);
                assert_eq!(expected, vec![Symbol::new("identifier")]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn conflicting_grammar_refuses_to_parse() {
        let g = Grammar::from_rules(
            vec![
                Rule::new("S", ["A"]),
                Rule::new("S", ["B"]),
                Rule::new("A", ["a"]),
                Rule::new("B", ["a"]),
            ],
            Vec::<(&str, Scanner)>::new(),
        );
        let parser = g.get_parser_for("S").unwrap();
        assert!(parser.actions().is_err());
        assert!(matches!(parser.parse("a"), Err(ParseError::Conflict(_))));
        assert!(matches!(parser.parse(""), Err(ParseError::Conflict(_))));
    }

    #[test]
    fn empty_rules_get_empty_spans() {
        let g = Grammar::from_description(
            ["call identifier ( args )", "args", "args identifier args"],
            [("identifier", scanner(identifier))],
        )
        .unwrap();
        let parser = g.get_parser_for("call").unwrap();

        let tree = parser.parse("f()").unwrap();
        assert_eq!(tree.children()[2], interior("args", 2, 2, vec![]));

        let tree = parser.parse("f(ab)").unwrap();
        let args = &tree.children()[2];
        assert_eq!(args.span, Span::new(2, 4));
        assert_eq!(args.children()[0], leaf("identifier", 2, 4, "ab"));
        assert_eq!(args.children()[1], interior("args", 4, 4, vec![]));
    }

    #[test]
    fn whitespace_terminals_from_double_separators() {
        let g = Grammar::from_description(
            ["stmts identifier  =  expr", "expr identifier"],
            [("identifier", scanner(identifier))],
        )
        .unwrap();
        let parser = g.get_parser_for("stmts").unwrap();
        let tree = parser.parse("x = fuy").unwrap();
        let names: Vec<String> = tree.children().iter().map(|c| c.name.to_string()).collect();
        assert_eq!(names, vec!["identifier", "\"\"", "=", "\"\"", "expr"]);
        assert_eq!(tree.children()[1].text(), Some(" "));
        assert_eq!(tree.span, Span::new(0, 7));
    }

    #[test]
    fn repeated_empty_token_stops_the_parse() {
        let g = Grammar::from_rules(
            vec![
                Rule::new("S", ["L", "y"]),
                Rule::new("L", ["L", ""]),
                Rule::new("L", ["x"]),
            ],
            Vec::<(&str, Scanner)>::new(),
        );
        let parser = g.get_parser_for("S").unwrap();
        assert!(parser.actions().is_ok());

        let tree = parser.parse("x y").unwrap();
        assert_eq!(tree.span, Span::new(0, 3));
        assert_eq!(tree.children()[0].children()[1], leaf("", 1, 2, " "));

        assert_eq!(
            parser.parse("x@"),
            Err(ParseError::NoProgress {
                offset: 1,
                token: Symbol::new(""),
            })
        );
    }

    #[test]
    fn left_recursive_list() {
        let g = Grammar::from_description(
            ["sum sum + term", "sum term", "term identifier"],
            [("identifier", scanner(identifier))],
        )
        .unwrap();
        let parser = g.get_parser_for("sum").unwrap();
        let tree = parser.parse("a+b+c").unwrap();
        assert_eq!(tree.span, Span::new(0, 5));
        let left = &tree.children()[0];
        assert_eq!(left.span, Span::new(0, 3));
        assert_eq!(left.children()[0].children()[0].children()[0].text(), Some("a"));
    }

    #[test]
    fn parse_from_offset() {
        let g = assignment(&[]);
        let parser = g.get_parser_for("stmts").unwrap();
        let tree = parser.parse_from("..x=y", 2).unwrap();
        assert_eq!(tree.span, Span::new(2, 5));
    }

    #[test]
    fn trees_serialize_to_json() {
        let g = assignment(&[]);
        let parser = g.get_parser_for("stmts").unwrap();
        let tree = parser.parse("a=b").unwrap();
        let json: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "stmts");
        assert_eq!(json["span"]["end"], 3);
        assert_eq!(json["value"][1]["value"], "=");
        assert!(matches!(tree.value, NodeValue::Children(_)));
    }

    #[test]
    fn parser_is_shared_between_threads() {
        let g = assignment(&[]);
        let parser = &g.get_parser_for("stmts").unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = ["a=b", "cd=ef", "g=h"]
                .into_iter()
                .map(|text| scope.spawn(move || parser.parse(text).map(|tree| tree.span)))
                .collect();
            for (handle, len) in handles.into_iter().zip([3, 5, 3]) {
                assert_eq!(handle.join().unwrap(), Ok(Span::new(0, len)));
            }
        });
    }
}
