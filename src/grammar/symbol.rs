use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::END_MARK;

/// A terminal or nonterminal name, or the reserved [`Symbol::Null`].
///
/// `Null` plays three parts: the nullability marker inside prefix sets, the
/// end-of-input lookahead, and the head of the synthetic root rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Null,
    Name(Arc<str>),
}

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol::Name(Arc::from(name))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Symbol::Null)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Symbol::Null => None,
            Symbol::Name(name) => Some(name),
        }
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol::Name(Arc::from(name))
    }
}

impl From<&String> for Symbol {
    fn from(name: &String) -> Self {
        Symbol::new(name)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.name() == Some(other)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.name() == Some(*other)
    }
}

/// Names that are empty or contain whitespace are quoted, so the whitespace
/// terminals stay visible.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Null => f.write_str(END_MARK),
            Symbol::Name(name) if name.is_empty() || name.chars().any(char::is_whitespace) => {
                write!(f, "{:?}", &**name)
            }
            Symbol::Name(name) => f.write_str(name),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}
