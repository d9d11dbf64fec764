// Ties the Grammar Loader, FIRST-Set Engine, LR(1) Item-Set Builder and
// Table Builder into a single `GrammarTables` context (built once per
// grammar file), then runs the Lexer, Parse Driver and Semantic Translator
// over a source file against those tables (once per source file). Registry,
// productions, tables, symbol tables and the quadruple stream are plain
// fields here rather than process-wide singletons, per the "global-ish
// compiler state" design note.

use crate::driver::{self, TraceStep};
use crate::error::{GrammarError, ParseError, SemanticError, TableError};
use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::lexer::Lexer;
use crate::quad::QuadStream;
use crate::state::{self, CanonicalCollection};
use crate::table::{Conflict, TableBuilder, Tables};
use crate::translate::Translator;
use crate::tree::TreeNode;

pub struct GrammarTables {
    pub grammar: Grammar,
    pub first_sets: FirstSets,
    pub collection: CanonicalCollection,
    pub tables: Tables,
    pub conflicts: Vec<Conflict>,
}

impl GrammarTables {
    /// Runs the Loader -> FIRST engine -> Item-Set Builder -> Table Builder
    /// pipeline over `grammar_text`. `allow_conflicts` resolves open
    /// question (b): when `false`, a grammar with unresolved shift/reduce
    /// or reduce/reduce conflicts is rejected rather than silently
    /// defaulting to "first action wins".
    pub fn build(
        grammar_text: &str,
        allow_conflicts: bool,
    ) -> Result<(Self, Vec<GrammarError>), TableError> {
        let (raw_grammar, diagnostics) = Grammar::load_str(grammar_text);
        let first_sets = FirstSets::compute(&raw_grammar);
        let (grammar, collection) = state::build(&raw_grammar, &first_sets);
        let (tables, conflicts) = TableBuilder::build(&grammar, &collection, allow_conflicts)?;
        Ok((
            Self {
                grammar,
                first_sets,
                collection,
                tables,
                conflicts,
            },
            diagnostics,
        ))
    }

    pub fn from_file(
        path: &std::path::Path,
        allow_conflicts: bool,
    ) -> std::io::Result<Result<(Self, Vec<GrammarError>), TableError>> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::build(&text, allow_conflicts))
    }
}

pub struct CompileOutput {
    pub tree: TreeNode,
    pub trace: Vec<TraceStep>,
    pub quads: QuadStream,
    pub diagnostics: Vec<SemanticError>,
}

/// Compiles one source file against an already-built grammar. Lexing and
/// parsing short-circuit on the first error ("terminate at first
/// occurrence"); semantic errors are collected onto the output instead.
pub fn compile(
    grammar_tables: &GrammarTables,
    source_text: &str,
    start_address: u32,
) -> Result<CompileOutput, ParseError> {
    let tokens = Lexer::tokenize(source_text)?;
    let mut translator = Translator::new(start_address);
    let outcome = driver::parse(
        &grammar_tables.grammar,
        &grammar_tables.tables,
        &mut translator,
        &tokens,
    )?;
    Ok(CompileOutput {
        tree: outcome.tree,
        trace: outcome.trace,
        quads: translator.quads,
        diagnostics: translator.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mini_rust() -> GrammarTables {
        let text = std::fs::read_to_string(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("grammars/mini_rust.cfg"),
        )
        .unwrap();
        GrammarTables::build(&text, false).unwrap().0
    }

    #[test]
    fn mini_rust_grammar_builds_without_conflicts() {
        let gt = mini_rust();
        assert!(gt.conflicts.is_empty());
    }

    #[test]
    fn compiles_declaration_and_assignment() {
        let gt = mini_rust();
        let output = compile(
            &gt,
            "fn main() { let mut x: i32 = 3; x = x + 1; }",
            100,
        )
        .unwrap();
        assert!(output.diagnostics.is_empty());
        let ops: Vec<&str> = output.quads.quads.iter().map(|q| q.op.as_str()).collect();
        assert_eq!(ops, vec!["j", "=", "+", "=", "ret"]);
        assert_eq!(output.quads.quads[1].src1, "3");
        assert_eq!(output.quads.quads[1].tar, "x");
        assert_eq!(output.quads.quads[2].src1, "x");
        assert_eq!(output.quads.quads[2].src2, "1");
    }

    #[test]
    fn compiles_function_call() {
        let gt = mini_rust();
        let output = compile(
            &gt,
            "fn add(mut a: i32, mut b: i32) -> i32 { return a + b; } \
             fn main() { let mut z: i32 = add(1, 2); }",
            100,
        )
        .unwrap();
        assert!(output.diagnostics.is_empty());
        let ops: Vec<&str> = output.quads.quads.iter().map(|q| q.op.as_str()).collect();
        assert_eq!(ops, vec!["j", "+", "ret", "arg", "arg", "call", "=", "ret"]);
    }

    #[test]
    fn undefined_variable_is_a_collected_diagnostic() {
        let gt = mini_rust();
        let output = compile(&gt, "fn main() { y = 1; }", 100).unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert!(matches!(
            output.diagnostics[0],
            SemanticError::UndefinedVariable { .. }
        ));
    }

    #[test]
    fn break_outside_loop_is_a_collected_diagnostic() {
        let gt = mini_rust();
        let output = compile(&gt, "fn main() { break; }", 100).unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert!(matches!(
            output.diagnostics[0],
            SemanticError::BreakOutsideLoop { .. }
        ));
    }
}
