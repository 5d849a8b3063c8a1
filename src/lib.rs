extern crate wasm_bindgen;

use std::sync::Once;

use wasm_bindgen::prelude::*;

pub mod error;
pub mod grammar;
pub mod ordered_set;

pub use error::{GrammarConflictError, GrammarError, ParseError, SetError};
pub use grammar::{Grammar, LR1Parser, Node, Rule, Symbol};

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber for debug output.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=lr1_syntax=trace`.
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}

fn error_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

/// Resolves `start`, falling back to the head of the first rule when empty.
fn parser_for<'g>(g: &'g Grammar, start: &str) -> Result<LR1Parser<'g>, GrammarError> {
    if start.is_empty() {
        let first = g.first_node().and_then(Symbol::name).unwrap_or_default();
        g.get_parser_for(first)
    } else {
        g.get_parser_for(start)
    }
}

#[wasm_bindgen]
pub fn item_sets_to_json(grammar: &str, start: &str) -> String {
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };
    let parser = match parser_for(&g, start) {
        Ok(parser) => parser,
        Err(e) => return error_json(e),
    };
    parser.to_item_sets_output().to_json().unwrap_or_else(error_json)
}

#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, start: &str, source: &str) -> String {
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };
    let parser = match parser_for(&g, start) {
        Ok(parser) => parser,
        Err(e) => return error_json(e),
    };
    match parser.parse(source) {
        Ok(tree) => tree.to_json().unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}

#[cfg(test)]
mod parse_tests {
    use crate::grammar::scanner::{identifier, scanner};
    use crate::grammar::Span;
    use crate::ordered_set::SequenceLike;
    use crate::{Grammar, ParseError, Symbol};

    const ASSIGNMENT: &str = "@token identifier [A-Za-z_][A-Za-z0-9_]*\n\
                              stmts identifier = expr\n\
                              expr identifier";

    #[test]
    fn simple_parse() {
        let g = Grammar::from_description(
            ["stmts identifier = expr", "expr identifier"],
            [("identifier", scanner(identifier))],
        )
        .unwrap();
        let tree = g.get_parser_for("stmts").unwrap().parse("x=fuy").unwrap();

        assert_eq!(tree.name, Symbol::new("stmts"));
        assert_eq!(tree.span, Span::new(0, 5));
        let names: Vec<String> = tree.children().iter().map(|n| n.name.to_string()).collect();
        assert_eq!(names, vec!["identifier", "=", "expr"]);
    }

    #[test]
    fn simple_parse_with_space() {
        let g = Grammar::from_description(
            ["stmts identifier  =  expr", "expr identifier"],
            [("identifier", scanner(identifier))],
        )
        .unwrap();
        let tree = g.get_parser_for("stmts").unwrap().parse("x = y").unwrap();
        assert_eq!(tree.children().len(), 5);
        assert_eq!(tree.children()[1].text(), Some(" "));
        assert_eq!(tree.children()[3].text(), Some(" "));
    }

    #[test]
    fn empty_grammar() {
        let g = Grammar::parse("  \n# nothing\n  ").unwrap();
        assert!(g.rule_list().is_empty());
        assert!(g.symbols().is_empty());
        assert!(g.get_parser_for("stmts").is_err());
    }

    #[test]
    fn bad_input() {
        let g = Grammar::parse(ASSIGNMENT).unwrap();
        let parser = g.get_parser_for("stmts").unwrap();
        assert!(matches!(
            parser.parse("x=1"),
            Err(ParseError::Tokenization { offset: 2 })
        ));
        assert!(matches!(
            parser.parse("x y"),
            Err(ParseError::Tokenization { offset: 1 })
        ));
    }

    #[test]
    fn parse_to_json() {
        let json = crate::parse_to_json(ASSIGNMENT, "", "x=y");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "stmts");
        assert_eq!(value["span"]["end"], 3);
        assert_eq!(value["value"][2]["value"][0]["value"], "y");
    }

    #[test]
    fn parse_to_json_reports_errors() {
        let json = crate::parse_to_json(ASSIGNMENT, "stmts", "x=");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["error"],
            "unexpected token at [2..2]: $; expected one of: identifier"
        );

        let json = crate::parse_to_json(ASSIGNMENT, "nope", "x=y");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "\"nope\" is not a nonterminal of this grammar");
    }

    #[test]
    fn item_sets_to_json() {
        let json = crate::item_sets_to_json(ASSIGNMENT, "stmts");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["start"], "stmts");
        assert_eq!(value["states"].as_array().map(Vec::len), Some(6));
        assert_eq!(value["states"][0]["core"][0], "stmts' ⟶ • stmts, $");

        let json = crate::item_sets_to_json("@bogus", "s");
        assert!(json.starts_with("{\"error\":"));
    }
}
