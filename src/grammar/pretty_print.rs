use std::fmt;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    lr1_parser::LR1Parser, lr1_table::Action, lr_dfa::LR1Item, node::Node, Grammar, Symbol,
    EPSILON,
};
use crate::error::GrammarConflictError;
use crate::ordered_set::{SequenceLike, SetLike};

impl fmt::Display for LR1Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ⟶", self.rule.head_name())?;
        for (i, s) in self.rule.body.iter().enumerate() {
            if i == self.dot {
                f.write_str(" •")?;
            }
            write!(f, " {s}")?;
        }
        if self.is_complete() {
            f.write_str(" •")?;
        }
        write!(f, ", {}", self.follower)
    }
}

impl LR1Item {
    pub fn to_latex(&self) -> String {
        let mut right: Vec<String> = Vec::new();
        for (i, s) in self.rule.body.iter().enumerate() {
            if i == self.dot {
                right.push("\\bullet".to_string());
            }
            right.push(escape::tex(s.to_string()).to_string());
        }
        if self.is_complete() {
            right.push("\\bullet".to_string());
        }
        format!(
            "${} \\rightarrow {}$, {}",
            escape::tex(self.rule.head_name()),
            right.join(" "),
            escape::tex(self.follower.to_string())
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ItemSetOutput {
    pub state: usize,
    pub core: Vec<String>,
    pub closure: Vec<String>,
    pub gotos: Vec<(String, usize)>,
}

impl ItemSetOutput {
    pub fn to_plaintext(&self) -> String {
        let core = self.core.join("\n");

        let extend = if self.closure.len() > self.core.len() {
            format!("\n---\n{}", self.closure[self.core.len()..].join("\n"))
        } else {
            String::new()
        };

        let edges = if !self.gotos.is_empty() {
            format!(
                "\n===\n{}",
                self.gotos
                    .iter()
                    .map(|(k, v)| format!("- {} -> {}", k, v))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        format!("I{}\n{}{}{}", self.state, core, extend, edges)
    }

    fn node_to_latex(&self, items: &[String]) -> String {
        let id = self.state;
        format!(
            "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
            id,
            if id > 0 {
                if id % 2 == 0 {
                    format!(" [below of = I_{}] ", id - 2)
                } else {
                    format!(" [right of = I_{}] ", id - 1)
                }
            } else {
                String::new()
            },
            id,
            items.join(" \\\\ \n")
        )
    }

    fn edge_to_latex(&self) -> String {
        let id = self.state;
        self.gotos
            .iter()
            .map(|(e, v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == *v { "[loop left]" } else { "[right]" },
                    escape::tex(e.as_str()),
                    v
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Every state of a parser's canonical collection, ready for printing.
#[derive(Debug, Serialize)]
pub struct ItemSetsOutput {
    pub start: String,
    pub states: Vec<ItemSetOutput>,
    #[serde(skip)]
    latex_items: Vec<Vec<String>>,
}

impl ItemSetsOutput {
    pub fn to_plaintext(&self) -> String {
        self.states
            .iter()
            .map(ItemSetOutput::to_plaintext)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            self.states
                .iter()
                .zip(self.latex_items.iter())
                .map(|(s, items)| s.node_to_latex(items))
                .chain(self.states.iter().map(ItemSetOutput::edge_to_latex))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl LR1Parser<'_> {
    pub fn to_item_sets_output(&self) -> ItemSetsOutput {
        let symbols = self.grammar().symbols();
        let gotos = self.gotos();
        let mut states: Vec<ItemSetOutput> = Vec::new();
        let mut latex_items: Vec<Vec<String>> = Vec::new();
        for (state, (core, closure)) in self.item_sets().iter().zip(self.closures()).enumerate() {
            let edges: Vec<(String, usize)> = symbols
                .iter()
                .filter_map(|symbol| {
                    gotos
                        .get(&(state, symbol.clone()))
                        .map(|&target| (symbol.to_string(), target))
                })
                .collect();
            states.push(ItemSetOutput {
                state,
                core: core.iter().map(ToString::to_string).collect(),
                closure: closure.iter().map(ToString::to_string).collect(),
                gotos: edges,
            });
            latex_items.push(closure.iter().map(LR1Item::to_latex).collect());
        }
        ItemSetsOutput {
            start: self.root_node().to_string(),
            states,
            latex_items,
        }
    }
}

impl Action {
    pub fn to_plaintext(&self) -> String {
        match self {
            Action::Reduce(rule) => format!("r({})", rule),
            Action::Shift(s) => format!("s{}", s),
            Action::Accept => "acc".to_string(),
        }
    }

    pub fn to_latex(&self, grammar: &Grammar) -> String {
        match self {
            Action::Reduce(rule) => {
                let body = if rule.body.is_empty() {
                    "\\epsilon".to_string()
                } else {
                    rule.body
                        .iter()
                        .map(|s| {
                            let name = escape::tex(s.to_string()).to_string();
                            if grammar.is_node(s) {
                                name
                            } else {
                                format!("\\text{{{}}}", name)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(" \\  ")
                };
                format!(
                    "reduce ${} \\rightarrow {}$",
                    escape::tex(rule.head_name()),
                    body
                )
            }
            Action::Shift(s) => format!("shift {}", s),
            Action::Accept => "accept".to_string(),
        }
    }
}

/// ACTION and GOTO tables laid out by state.
///
/// Columns are the terminals in grammar order followed by `$`, then the
/// nonterminals.
#[derive(Debug, Serialize)]
pub struct ParsingTable<'g> {
    #[serde(skip)]
    grammar: &'g Grammar,
    pub terminals: Vec<String>,
    pub non_terminals: Vec<String>,
    pub action: Vec<Vec<Option<Action>>>,
    pub goto: Vec<Vec<Option<usize>>>,
}

impl ParsingTable<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = Vec::new();

        output.push(vec![String::new()]);
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            output[0].push(s.clone());
        }

        for (i, (r1, r2)) in self.action.iter().zip(self.goto.iter()).enumerate() {
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(
                    r1.iter()
                        .map(|action| action.as_ref().map(Action::to_plaintext).unwrap_or_default()),
                )
                .chain(
                    r2.iter()
                        .map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()),
                )
                .collect();
            output.push(row);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|row| row[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let first_row = std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| escape::tex(s.as_str()).to_string()),
            )
            .collect::<Vec<_>>()
            .join(" & ");

        let content = self
            .action
            .iter()
            .zip(self.goto.iter())
            .enumerate()
            .map(|(i, (r1, r2))| {
                std::iter::once(i.to_string())
                    .chain(r1.iter().map(|action| {
                        action
                            .as_ref()
                            .map(|a| a.to_latex(self.grammar))
                            .unwrap_or_default()
                    }))
                    .chain(r2.iter().map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<'g> LR1Parser<'g> {
    pub fn to_parsing_table(&self) -> Result<ParsingTable<'g>, GrammarConflictError> {
        let grammar = self.grammar();
        let actions = self.actions()?;
        let gotos = self.gotos();

        let terminals: Vec<&Symbol> = grammar
            .tokens()
            .iter()
            .chain(std::iter::once(&Symbol::Null))
            .collect();
        let non_terminals: Vec<&Symbol> = grammar.nodes().iter().collect();

        let states = 0..self.item_sets().len();
        let action: Vec<Vec<Option<Action>>> = states
            .clone()
            .map(|state| {
                terminals
                    .iter()
                    .map(|t| actions.get(&(state, (*t).clone())).cloned())
                    .collect::<Vec<_>>()
            })
            .collect();
        let goto: Vec<Vec<Option<usize>>> = states
            .map(|state| {
                non_terminals
                    .iter()
                    .map(|n| gotos.get(&(state, (*n).clone())).copied())
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(ParsingTable {
            grammar,
            terminals: terminals.iter().map(ToString::to_string).collect(),
            non_terminals: non_terminals.iter().map(ToString::to_string).collect(),
            action,
            goto,
        })
    }
}

#[derive(Debug, Serialize)]
struct PrefixOutput {
    name: String,
    nullable: bool,
    prefixes: Vec<String>,
}

impl PrefixOutput {
    fn to_plaintext(&self) -> String {
        format!("{} | {} | {}", self.name, self.nullable, self.prefixes.join(", "))
    }

    fn to_latex(&self) -> String {
        let prefixes = self
            .prefixes
            .iter()
            .map(|s| escape::tex(s.as_str()))
            .collect::<Vec<_>>()
            .join(r"\ ")
            .replace(EPSILON, r"$\epsilon$");
        format!(
            "{} & {} & {}",
            escape::tex(self.name.as_str()),
            self.nullable,
            prefixes
        )
    }
}

/// Nullability and prefix set of every nonterminal.
#[derive(Debug, Serialize)]
pub struct PrefixOutputVec {
    data: Vec<PrefixOutput>,
}

impl PrefixOutputVec {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c}\n".to_string()
            + "Symbol & Nullable & Prefixes\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_prefix_output_vec(&self) -> PrefixOutputVec {
        let mut data = Vec::new();
        for node in self.nodes() {
            let Some(set) = self.prefixes().get(node) else {
                continue;
            };
            let mut prefixes: Vec<String> = set
                .iter()
                .filter(|s| !s.is_null())
                .map(ToString::to_string)
                .collect();
            prefixes.sort();

            let nullable = set.contains(&Symbol::Null);
            if nullable {
                prefixes.push(EPSILON.to_string());
            }
            data.push(PrefixOutput {
                name: node.to_string(),
                nullable,
                prefixes,
            });
        }
        PrefixOutputVec { data }
    }
}

impl Node {
    /// Box-drawing rendering, one node per line:
    ///
    /// ```text
    /// 0..5 stmts
    /// ├── 0..1 identifier ─ "x"
    /// ├── 1..2 = ─ "="
    /// └── 2..5 expr
    ///     └── 2..5 identifier ─ "fuy"
    /// ```
    pub fn as_tree(&self) -> String {
        let mut lines = Vec::new();
        self.tree_lines("", "", &mut lines);
        lines.join("\n")
    }

    fn tree_lines(&self, first: &str, rest: &str, lines: &mut Vec<String>) {
        match self.text() {
            Some(text) => lines.push(format!("{first}{} {} ─ {:?}", self.span, self.name, text)),
            None => lines.push(format!("{first}{} {}", self.span, self.name)),
        }
        let children = self.children();
        for (i, child) in children.iter().enumerate() {
            if i + 1 == children.len() {
                child.tree_lines(&format!("{rest}└── "), &format!("{rest}    "), lines);
            } else {
                child.tree_lines(&format!("{rest}├── "), &format!("{rest}│   "), lines);
            }
        }
    }
}
