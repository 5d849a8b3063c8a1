pub mod grammar;
pub mod lr1_parser;
pub mod lr1_table;
pub mod lr_dfa;
pub mod node;
pub mod parse;
pub mod prefixes;
pub mod pretty_print;
pub mod scanner;
pub mod symbol;

pub use grammar::{Grammar, Rule};
pub use lr1_parser::LR1Parser;
pub use lr1_table::{Action, ActionTable};
pub use lr_dfa::{Automaton, Gotos, LR1Item};
pub use node::{Node, NodeValue, Span};
pub use parse::{split_rule, RuleDescription};
pub use scanner::{NoMatch, ScanResult, Scanner, Token};
pub use symbol::Symbol;

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
