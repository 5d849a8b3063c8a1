use super::scanner::{regex_scanner, Scanner};
use super::{Grammar, Rule, Symbol};
use crate::error::GrammarError;

/// One entry of a grammar description: an explicit rule or the shorthand
/// `"head sym sym ..."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleDescription {
    Text(String),
    Rule(Rule),
}

impl From<&str> for RuleDescription {
    fn from(text: &str) -> Self {
        RuleDescription::Text(text.to_string())
    }
}

impl From<String> for RuleDescription {
    fn from(text: String) -> Self {
        RuleDescription::Text(text)
    }
}

impl From<Rule> for RuleDescription {
    fn from(rule: Rule) -> Self {
        RuleDescription::Rule(rule)
    }
}

/// Splits a shorthand rule on `sep`.
///
/// A run of separators is not just a gap: two separators in a row yield the
/// empty-named symbol, and every further separator in the run adds one
/// separator to that symbol's name. With the default `" "`, `"a  b"` is
/// `["a", "", "b"]` and `"a   b"` is `["a", " ", "b"]`, which are the two
/// built-in whitespace terminals.
pub fn split_rule(text: &str, sep: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for word in text.split(sep) {
        if word.is_empty() {
            if let Some(last) = result.last_mut() {
                if last.is_empty() || last.starts_with(sep) {
                    last.push_str(sep);
                    continue;
                }
            }
        }
        result.push(word.to_string());
    }
    result
}

impl Grammar {
    /// Builds a grammar from rules and shorthand strings split on `" "`.
    pub fn from_description<R, D, I, K>(rules: R, extra_scanners: I) -> Result<Self, GrammarError>
    where
        R: IntoIterator<Item = D>,
        D: Into<RuleDescription>,
        I: IntoIterator<Item = (K, Scanner)>,
        K: Into<Symbol>,
    {
        Self::from_description_with_separator(rules, " ", extra_scanners)
    }

    pub fn from_description_with_separator<R, D, I, K>(
        rules: R,
        sep: &str,
        extra_scanners: I,
    ) -> Result<Self, GrammarError>
    where
        R: IntoIterator<Item = D>,
        D: Into<RuleDescription>,
        I: IntoIterator<Item = (K, Scanner)>,
        K: Into<Symbol>,
    {
        if sep.is_empty() {
            return Err(GrammarError::EmptySeparator);
        }
        let real_rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| match rule.into() {
                RuleDescription::Rule(rule) => Ok(rule),
                RuleDescription::Text(text) if text.is_empty() => {
                    Err(GrammarError::EmptyRule { index })
                }
                RuleDescription::Text(text) => {
                    let mut words = split_rule(&text, sep).into_iter();
                    let head = words.next().unwrap_or_default();
                    Ok(Rule::new(head, words))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_rules(real_rules, extra_scanners))
    }

    /// Reads a grammar file.
    ///
    /// Each line is a shorthand rule. Blank lines and lines starting with `#`
    /// are skipped. `@token NAME PATTERN` gives terminal `NAME` a regex
    /// scanner; the pattern is the rest of the line.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut rules: Vec<&str> = Vec::new();
        let mut scanners: Vec<(String, Scanner)> = Vec::new();

        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(char::is_whitespace) || line.starts_with('#') {
                continue;
            }
            let Some(directive) = line.strip_prefix('@') else {
                rules.push(line);
                continue;
            };

            let mut parts = directive.trim_start().splitn(3, char::is_whitespace);
            match (parts.next(), parts.next(), parts.next()) {
                (Some("token"), Some(name), Some(pattern)) if !name.is_empty() => {
                    let scanner = regex_scanner(pattern.trim()).map_err(|e| GrammarError::BadRegex {
                        line: i + 1,
                        message: e.to_string(),
                    })?;
                    scanners.push((name.to_string(), scanner));
                }
                _ => {
                    return Err(GrammarError::UnknownDirective {
                        line: i + 1,
                        directive: line.to_string(),
                    })
                }
            }
        }

        Self::from_description(rules, scanners)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ordered_set::SequenceLike;

    #[test]
    fn split_plain_words() {
        assert_eq!(split_rule("stmts identifier = expr", " "), vec!["stmts", "identifier", "=", "expr"]);
    }

    #[test]
    fn split_separator_runs() {
        assert_eq!(split_rule("a  b", " "), vec!["a", "", "b"]);
        assert_eq!(split_rule("a   b", " "), vec!["a", " ", "b"]);
        assert_eq!(split_rule("a    b", " "), vec!["a", "  ", "b"]);
        assert_eq!(split_rule("a b ", " "), vec!["a", "b", ""]);
        assert_eq!(split_rule("a b  ", " "), vec!["a", "b", " "]);
        assert_eq!(split_rule("a,,b", ","), vec!["a", "", "b"]);
        assert_eq!(split_rule("a,,,b", ","), vec!["a", ",", "b"]);
    }

    #[test]
    fn description_mixes_text_and_rules() {
        let g = Grammar::from_description(
            vec![
                RuleDescription::from("s a  b"),
                RuleDescription::from(Rule::new("s", ["c"])),
                RuleDescription::from("e"),
            ],
            Vec::<(&str, Scanner)>::new(),
        )
        .unwrap();
        assert_eq!(g.rule_list()[0], Rule::new("s", ["a", "", "b"]));
        assert_eq!(g.rule_list()[1], Rule::new("s", ["c"]));
        assert_eq!(g.rule_list()[2], Rule::new("e", Vec::<&str>::new()));
    }

    #[test]
    fn custom_separator() {
        let g = Grammar::from_description_with_separator(
            ["stmt|if|cond|then"],
            "|",
            Vec::<(&str, Scanner)>::new(),
        )
        .unwrap();
        assert_eq!(g.rule_list()[0], Rule::new("stmt", ["if", "cond", "then"]));
    }

    #[test]
    fn empty_descriptions_are_rejected() {
        let none = Vec::<(&str, Scanner)>::new();
        assert_eq!(
            Grammar::from_description(["s a", ""], none.clone()).err(),
            Some(GrammarError::EmptyRule { index: 1 })
        );
        assert_eq!(
            Grammar::from_description_with_separator(["s a"], "", none).err(),
            Some(GrammarError::EmptySeparator)
        );
    }

    #[test]
    fn grammar_file_with_tokens() {
        let g = Grammar::parse(
            "# assignments\n\
             @token identifier [A-Za-z_][A-Za-z0-9_]*\n\
             @token number \\d+\n\
             \n\
             stmts identifier = expr\n\
             expr identifier\n\
             expr number\n",
        )
        .unwrap();
        assert_eq!(g.rule_list().len(), 3);
        assert_eq!(g.tokens().len(), 3);

        let parser = g.get_parser_for("stmts").unwrap();
        let tree = parser.parse("answer=42").unwrap();
        assert_eq!(tree.children()[2].children()[0].name, Symbol::new("number"));
        assert_eq!(tree.children()[2].children()[0].text(), Some("42"));
    }

    #[test]
    fn grammar_file_errors_carry_line_numbers() {
        assert_eq!(
            Grammar::parse("s a\n@lexer x y").err(),
            Some(GrammarError::UnknownDirective {
                line: 2,
                directive: "@lexer x y".to_string()
            })
        );
        assert!(matches!(
            Grammar::parse("@token a (\ns a").err(),
            Some(GrammarError::BadRegex { line: 1, .. })
        ));
        assert!(matches!(
            Grammar::parse("@token a").err(),
            Some(GrammarError::UnknownDirective { line: 1, .. })
        ));
    }
}
