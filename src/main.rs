use std::io::Read;
use std::process::ExitCode;
use std::{fs, io};

use lr1_syntax::{init_tracing, Grammar};
use thiserror::Error;

fn print_help() {
    println!("Usage: lr1-syntax outputs [options] [grammar file]");
    println!("outputs:");
    println!("  prefixes: Nullable and prefix (FIRST) sets");
    println!("  items: LR(1) item sets");
    println!("  table: LR(1) parsing table");
    println!("  tree: Syntax tree of the input text");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
    println!("  -s START: Start symbol (default: head of the first rule)");
    println!("  -i FILE: Text to parse for `tree` (default: stdin)");
    println!("The grammar is read from stdin when no grammar file is given.");
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("grammar and input text cannot both come from stdin")]
    StdinTwice,
    #[error("the grammar has no rules")]
    NoRules,
    #[error(transparent)]
    Grammar(#[from] lr1_syntax::GrammarError),
    #[error(transparent)]
    Conflict(#[from] lr1_syntax::GrammarConflictError),
    #[error(transparent)]
    Parse(#[from] lr1_syntax::ParseError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

fn read_input(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(input)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let mut outputs: Vec<&str> = Vec::new();
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let mut i: usize = 0;
    while i < args.len() && ["prefixes", "items", "table", "tree"].contains(&args[i].as_str()) {
        outputs.push(args[i].as_str());
        i += 1;
    }

    let mut output_format = OutputFormat::Plain;
    let mut start: Option<&str> = None;
    let mut text_file: Option<&str> = None;

    while i < args.len() && ["-h", "--help", "-l", "-j", "-s", "-i"].contains(&args[i].as_str()) {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "-l" => output_format = OutputFormat::LaTeX,
            "-j" => output_format = OutputFormat::JSON,
            flag => {
                let Some(value) = args.get(i + 1) else {
                    print_help();
                    return ExitCode::FAILURE;
                };
                if flag == "-s" {
                    start = Some(value.as_str());
                } else {
                    text_file = Some(value.as_str());
                }
                i += 1;
            }
        }
        i += 1;
    }

    if i + 1 < args.len() || outputs.is_empty() {
        print_help();
        return ExitCode::FAILURE;
    }

    match run(&outputs, output_format, start, args.get(i).map(String::as_str), text_file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    outputs: &[&str],
    output_format: OutputFormat,
    start: Option<&str>,
    grammar_file: Option<&str>,
    text_file: Option<&str>,
) -> Result<(), CliError> {
    if grammar_file.is_none() && text_file.is_none() && outputs.contains(&"tree") {
        return Err(CliError::StdinTwice);
    }

    let g = Grammar::parse(&read_input(grammar_file)?)?;
    let start = match start {
        Some(start) => start,
        None => g
            .first_node()
            .and_then(|node| node.name())
            .ok_or(CliError::NoRules)?,
    };
    let parser = g.get_parser_for(start)?;

    for &output in outputs {
        let printed = match output {
            "prefixes" => {
                let t = g.to_prefix_output_vec();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json()?,
                }
            }
            "items" => {
                let t = parser.to_item_sets_output();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json()?,
                }
            }
            "table" => {
                let t = parser.to_parsing_table()?;
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json()?,
                }
            }
            _ => {
                let tree = parser.parse(&read_input(text_file)?)?;
                match output_format {
                    OutputFormat::JSON => tree.to_json()?,
                    OutputFormat::Plain | OutputFormat::LaTeX => tree.as_tree(),
                }
            }
        };
        println!("{}", printed);
    }
    Ok(())
}
