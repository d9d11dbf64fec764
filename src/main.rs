// CLI: reads a grammar file and a source file from disk, builds the
// ACTION/GOTO tables, then runs the lexer + parse driver + semantic
// translator over the source and prints the quadruple stream (plus, on
// request, the shift/reduce trace and the tables themselves).

use clap::crate_authors;
use structopt::StructOpt;

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use lr1quad::compiler::{compile, GrammarTables};
use lr1quad::table::Action;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "lr1quad",
    about = "LR(1) parser generator and syntax-directed quadruple translator for a small Rust-like language",
    author = crate_authors!(),
)]
struct CLOptions {
    /// Path to the grammar specification (`.cfg`) file.
    #[structopt(parse(from_os_str))]
    grammar: PathBuf,
    /// Path to the source file to compile.
    #[structopt(parse(from_os_str))]
    source: PathBuf,
    /// Base address of the first emitted quadruple.
    #[structopt(long, default_value = "100")]
    start_address: u32,
    /// Print the step-by-step shift/reduce trace.
    #[structopt(long)]
    trace: bool,
    /// Print the ACTION/GOTO tables.
    #[structopt(long)]
    tables: bool,
    /// Build the parser even if the grammar has unresolved shift/reduce or
    /// reduce/reduce conflicts (by default the table builder refuses).
    #[structopt(long)]
    allow_conflicts: bool,
}

fn main() {
    env_logger::init();
    let options = CLOptions::from_args();

    let grammar_text = read_or_exit(&options.grammar, 2);
    let (grammar_tables, diagnostics) =
        match GrammarTables::build(&grammar_text, options.allow_conflicts) {
            Ok(result) => result,
            Err(error) => {
                eprintln!("{}", error);
                exit(3);
            }
        };
    for diagnostic in &diagnostics {
        log::warn!("{}", diagnostic);
    }
    if !grammar_tables.conflicts.is_empty() {
        log::warn!(
            "{} unresolved conflict(s); proceeding with --allow-conflicts",
            grammar_tables.conflicts.len()
        );
    }
    log::debug!(
        "{} states, {} productions",
        grammar_tables.collection.states.len(),
        grammar_tables.grammar.productions.len()
    );

    if options.tables {
        print_tables(&grammar_tables);
    }

    let source_text = read_or_exit(&options.source, 2);
    let output = match compile(&grammar_tables, &source_text, options.start_address) {
        Ok(output) => output,
        Err(error) => {
            eprintln!("{}", error);
            exit(4);
        }
    };

    if options.trace {
        for step in &output.trace {
            println!(
                "{}\t{:?}\t{:?}\t{:?}\t{}",
                step.step, step.state_stack, step.symbol_stack, step.remaining_input, step.description
            );
        }
    }

    for diagnostic in &output.diagnostics {
        eprintln!("{}", diagnostic);
    }

    for (index, quad) in output.quads.quads.iter().enumerate() {
        println!("{}: {}", output.quads.address_of(index), quad);
    }

    if !output.diagnostics.is_empty() {
        exit(5);
    }
}

fn read_or_exit(path: &PathBuf, code: i32) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("{}: {}", path.display(), error);
            exit(code);
        }
    }
}

fn print_tables(grammar_tables: &GrammarTables) {
    let registry = &grammar_tables.grammar.registry;
    print!("state");
    for terminal in registry.terminals() {
        print!("\t{}", terminal);
    }
    for (_, name) in registry.non_terminals() {
        print!("\t{}", name);
    }
    println!();

    for state in &grammar_tables.collection.states {
        print!("{}", state.id);
        for index in 0..registry.terminal_count() {
            let cell = grammar_tables
                .tables
                .action
                .get(&(state.id, index))
                .and_then(|actions| actions.first())
                .map(format_action)
                .unwrap_or_default();
            print!("\t{}", cell);
        }
        for (id, _) in registry.non_terminals() {
            let cell = grammar_tables
                .tables
                .goto_for(state.id, id)
                .map(|s| s.to_string())
                .unwrap_or_default();
            print!("\t{}", cell);
        }
        println!();
    }
}

fn format_action(action: &Action) -> String {
    match action {
        Action::Shift(state) => format!("s{}", state),
        Action::Reduce(production) => format!("r{}", production),
        Action::Accept => "acc".to_string(),
    }
}
