use thiserror::Error;

use crate::grammar::{lr1_table::Action, node::Span, Symbol};

/// A positional or value mutation of an `OrderedSet` that would break
/// uniqueness or address a slot that does not exist. The set is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    #[error("value is already in the set at index {index}")]
    Duplicate { index: usize },
    #[error("index {index} is out of range for a set of length {len}")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("rule {index}: empty rule description")]
    EmptyRule { index: usize },
    #[error("rule separator must not be empty")]
    EmptySeparator,
    #[error("{0:?} is not a nonterminal of this grammar")]
    UnknownStart(String),
    #[error("line {line}: unknown directive {directive:?}")]
    UnknownDirective { line: usize, directive: String },
    #[error("line {line}: bad token pattern: {message}")]
    BadRegex { line: usize, message: String },
}

/// Two different actions claim the same ACTION table slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grammar is not LR(1): state {state} on {lookahead} has both {existing} and {incoming}")]
pub struct GrammarConflictError {
    pub state: usize,
    pub lookahead: Symbol,
    pub existing: Action,
    pub incoming: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Conflict(#[from] GrammarConflictError),
    #[error("unrecognized token at position {offset}")]
    Tokenization { offset: usize },
    /// Empty tokens at `offset` keep leading the parser back into a state it
    /// already shifted one from, without consuming input.
    #[error("no progress at position {offset}: {token} keeps matching the empty string")]
    NoProgress { offset: usize, token: Symbol },
    #[error("unexpected token at [{span}]: {token}; expected one of: {}", display_expected(.expected))]
    UnexpectedToken {
        span: Span,
        token: Symbol,
        expected: Vec<Symbol>,
    },
}

fn display_expected(expected: &[Symbol]) -> String {
    expected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
