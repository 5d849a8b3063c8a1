use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use super::node::Span;
use super::{Grammar, Symbol};
use crate::error::ParseError;

/// A scanner does not recognize its terminal at the given offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no match")]
pub struct NoMatch;

pub type ScanResult = Result<usize, NoMatch>;

/// Recognizes one terminal: given the whole text and a byte offset, returns
/// how many bytes the terminal consumes there. Zero is a valid length.
pub type Scanner = Arc<dyn Fn(&str, usize) -> ScanResult + Send + Sync>;

pub fn scanner<F>(f: F) -> Scanner
where
    F: Fn(&str, usize) -> ScanResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Matches `keyword` literally.
pub fn keyword_scanner(keyword: &str) -> Scanner {
    let keyword = keyword.to_string();
    scanner(move |text, offset| match text.get(offset..) {
        Some(rest) if rest.starts_with(keyword.as_str()) => Ok(keyword.len()),
        _ => Err(NoMatch),
    })
}

fn skip_while(text: &str, offset: usize, skip: &[u8]) -> ScanResult {
    let bytes = text.as_bytes().get(offset..).unwrap_or_default();
    Ok(bytes.iter().take_while(|b| skip.contains(b)).count())
}

/// Skips zero or more spaces and tabs.
pub fn ignore_spaces(text: &str, offset: usize) -> ScanResult {
    skip_while(text, offset, b" \t")
}

/// Skips zero or more spaces, tabs and newlines.
pub fn ignore_spaces_and_newlines(text: &str, offset: usize) -> ScanResult {
    skip_while(text, offset, b" \t\n")
}

/// Scanners known by terminal name: `""` skips spaces and tabs, `" "` also
/// skips newlines.
pub fn builtin_scanner(name: &str) -> Option<Scanner> {
    match name {
        "" => Some(scanner(ignore_spaces)),
        " " => Some(scanner(ignore_spaces_and_newlines)),
        _ => None,
    }
}

/// A letter or underscore followed by letters, digits and underscores. Not
/// registered by default; pass it as an extra scanner.
pub fn identifier(text: &str, offset: usize) -> ScanResult {
    let rest = text.get(offset..).ok_or(NoMatch)?;
    if !rest.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        return Err(NoMatch);
    }
    Ok(rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len()))
}

/// Matches `pattern` starting exactly at the scan offset.
pub fn regex_scanner(pattern: &str) -> Result<Scanner, regex::Error> {
    let re = Regex::new(&format!(r"\A(?:{pattern})"))?;
    Ok(scanner(move |text, offset| {
        text.get(offset..)
            .and_then(|rest| re.find(rest))
            .map(|m| m.end())
            .ok_or(NoMatch)
    }))
}

/// A scanned terminal. `symbol` is [`Symbol::Null`] at end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    pub span: Span,
}

impl Grammar {
    /// Longest-match tokenizer.
    ///
    /// Every registered scanner is tried at `offset`; the longest match wins
    /// and, among equally long ones, the scanner registered first. A scanner
    /// reporting a length that runs past the text or ends inside a character
    /// counts as not matching.
    pub fn scan_token(&self, source: &str, offset: usize) -> Result<Token, ParseError> {
        if offset >= source.len() {
            return Ok(Token {
                symbol: Symbol::Null,
                span: Span::new(offset, offset),
            });
        }

        let mut best: Option<(&Symbol, usize)> = None;
        for (token, scan) in self.token_scanners() {
            let Ok(length) = scan(source, offset) else {
                tracing::trace!(%token, offset, "no match");
                continue;
            };
            let fits = offset
                .checked_add(length)
                .is_some_and(|end| source.is_char_boundary(end));
            if !fits {
                tracing::warn!(%token, offset, length, "scanner length ignored: not a character boundary");
                continue;
            }
            tracing::trace!(%token, offset, length, "match");
            if best.map_or(true, |(_, best_length)| length > best_length) {
                best = Some((token, length));
            }
        }

        match best {
            Some((token, length)) => Ok(Token {
                symbol: token.clone(),
                span: Span::new(offset, offset + length),
            }),
            None => Err(ParseError::Tokenization { offset }),
        }
    }
}
