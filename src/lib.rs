// A compiler front-end for a small Rust-like source language: functions,
// `let`/`mut` bindings, `i32` arithmetic and comparisons, `if`/`else`,
// `while`, `return`, function calls. From source text it produces a token
// stream, an LR(1) parse forest, and a three-address quadruple stream,
// alongside the FIRST-set, canonical-collection and ACTION/GOTO diagnostic
// tables that got it there.

pub mod attributes;
pub mod compiler;
pub mod driver;
pub mod error;
pub mod first;
pub mod grammar;
pub mod item;
pub mod lexer;
pub mod location;
pub mod matcher;
pub mod production;
pub mod quad;
pub mod state;
pub mod symbols;
pub mod symtab;
pub mod table;
pub mod translate;
pub mod tree;

pub use compiler::{compile, CompileOutput, GrammarTables};
