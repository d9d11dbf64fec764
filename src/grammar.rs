// Grammar Loader: reads productions from a `.cfg` text file, populates the
// Symbol Registry, and produces an ordered list of Productions.

use std::io::{stderr, Write};

use regex::Regex;

use crate::error::GrammarError;
use crate::production::Production;
use crate::symbols::{SymbolRegistry, EPSILON_NAME};

lazy_static::lazy_static! {
    static ref PRODUCTION_LINE: Regex = Regex::new(r"^\s*([^\s]+)\s*->\s*(.*)$").unwrap();
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub registry: SymbolRegistry,
    pub productions: Vec<Production>,
    /// The left-hand side of the first production in the file; this becomes
    /// the root of the augmenting production once the table builder runs.
    pub start_symbol: u32,
}

impl Grammar {
    /// Parses grammar text into a `Grammar`. Malformed lines are reported
    /// (both to stderr and in the returned diagnostic list) and skipped;
    /// loading never aborts on a single bad line.
    pub fn load_str(text: &str) -> (Grammar, Vec<GrammarError>) {
        let mut registry = SymbolRegistry::new();
        let mut productions = Vec::new();
        let mut start_symbol = None;
        let mut diagnostics = Vec::new();

        for (line_no, raw_line) in text.lines().enumerate() {
            let line_no = line_no as u32 + 1;
            let line = match raw_line.split('#').next() {
                Some(l) => l.trim(),
                None => "",
            };
            if line.is_empty() {
                continue;
            }
            let captures = match PRODUCTION_LINE.captures(line) {
                Some(c) => c,
                None => {
                    report(&mut diagnostics, GrammarError::MalformedLine {
                        line: line_no,
                        text: line.to_string(),
                    });
                    continue;
                }
            };
            let lhs_name = captures[1].to_string();
            let lhs_id = registry.register_non_terminal(&lhs_name);
            if start_symbol.is_none() {
                start_symbol = Some(lhs_id);
            }

            for alt in captures[2].split('|') {
                let alt = alt.trim();
                if alt.is_empty() {
                    report(&mut diagnostics, GrammarError::EmptyAlternative {
                        line: line_no,
                        lhs: lhs_name.clone(),
                    });
                    continue;
                }
                let rhs = if alt == EPSILON_NAME {
                    vec![registry.epsilon_id()]
                } else {
                    alt.split_whitespace()
                        .map(|sym| {
                            registry
                                .id_of(sym)
                                .unwrap_or_else(|| registry.register_non_terminal(sym))
                        })
                        .collect()
                };
                let id = productions.len() as u32;
                productions.push(Production::new(id, lhs_id, rhs));
            }
        }

        let start_symbol = start_symbol.unwrap_or_else(|| registry.register_non_terminal("Program"));
        (
            Grammar {
                registry,
                productions,
                start_symbol,
            },
            diagnostics,
        )
    }

    pub fn load_file(path: &std::path::Path) -> std::io::Result<(Grammar, Vec<GrammarError>)> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&text))
    }
}

fn report(diagnostics: &mut Vec<GrammarError>, error: GrammarError) {
    writeln!(stderr(), "{}", error).expect("stderr write failed");
    diagnostics.push(error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_simple_alternatives() {
        let text = "Program -> DeclList | None\nDeclList -> Decl DeclList | Decl\n";
        let (grammar, diags) = Grammar::load_str(text);
        assert!(diags.is_empty());
        assert_eq!(grammar.productions.len(), 4);
        assert_eq!(
            grammar.registry.name_of(grammar.start_symbol),
            Some("Program")
        );
    }

    #[test]
    fn epsilon_alternative_is_singleton_rhs() {
        let (grammar, _) = Grammar::load_str("A -> None\n");
        assert_eq!(grammar.productions[0].rhs, vec![grammar.registry.epsilon_id()]);
    }

    #[test]
    fn unknown_rhs_symbol_becomes_non_terminal() {
        let (grammar, _) = Grammar::load_str("A -> B c\n");
        let b = grammar.registry.id_of("B").unwrap();
        assert!(grammar.registry.is_non_terminal(b));
    }

    #[test]
    fn malformed_line_is_reported_and_skipped() {
        let (grammar, diags) = Grammar::load_str("this is not a production\nA -> None\n");
        assert_eq!(grammar.productions.len(), 1);
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0], GrammarError::MalformedLine { .. }));
    }

    #[test]
    fn empty_alternative_is_reported_and_skipped() {
        let (grammar, diags) = Grammar::load_str("A -> B | \nB -> None\n");
        assert_eq!(grammar.productions.len(), 1);
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0], GrammarError::EmptyAlternative { .. }));
    }

    #[test]
    fn comment_only_and_blank_lines_are_skipped() {
        let (grammar, diags) = Grammar::load_str("# a comment\n\nA -> None # trailing comment\n");
        assert!(diags.is_empty());
        assert_eq!(grammar.productions.len(), 1);
    }
}
