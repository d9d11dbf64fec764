// Error hierarchy for every pipeline stage. Grouped by the component that
// raises it, matching §7 of the design: grammar load and table build fail
// with a diagnostic list; lexical and syntactic errors short-circuit the
// driver; semantic errors are collected by the translator instead of
// propagated through `Result`.

use thiserror::Error;

use crate::location::Location;
use crate::table::Conflict;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("line {line}: malformed production: {text}")]
    MalformedLine { line: u32, text: String },
    #[error("line {line}: empty alternative in production for {lhs}")]
    EmptyAlternative { line: u32, lhs: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("{0} unresolved shift/reduce or reduce/reduce conflict(s) in the parse table")]
    UnresolvedConflicts(usize),
}

impl TableError {
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        TableError::UnresolvedConflicts(conflicts.len())
    }
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("{location}: unrecognized character {ch:?}")]
    UnrecognizedCharacter { ch: char, location: Location },
    #[error("{location}: unterminated block comment")]
    UnterminatedComment { location: Location },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{location}: syntax error / incomplete code at token {token:?}")]
    SyntaxError { token: String, location: Location },
    #[error("{0}")]
    Lex(#[from] LexError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("{location}: function \"{name}\" redefined")]
    DuplicateFunction { name: String, location: Location },
    #[error("{location}: variable \"{name}\" redefined")]
    DuplicateVariable { name: String, location: Location },
    #[error("{location}: variable \"{name}\" used before assignment")]
    UndefinedVariable { name: String, location: Location },
    #[error("{location}: function \"{name}\" does not return on every path")]
    MissingReturn { name: String, location: Location },
    #[error("{location}: \"break\" used outside a loop")]
    BreakOutsideLoop { location: Location },
    #[error("{location}: \"continue\" used outside a loop")]
    ContinueOutsideLoop { location: Location },
}

impl SemanticError {
    pub fn location(&self) -> Location {
        match self {
            SemanticError::DuplicateFunction { location, .. }
            | SemanticError::DuplicateVariable { location, .. }
            | SemanticError::UndefinedVariable { location, .. }
            | SemanticError::MissingReturn { location, .. }
            | SemanticError::BreakOutsideLoop { location }
            | SemanticError::ContinueOutsideLoop { location } => *location,
        }
    }
}
