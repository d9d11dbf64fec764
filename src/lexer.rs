// Ambient Lexer: turns source text into the token stream the Parse Driver
// consumes. The lexical analyzer is an external collaborator to the core
// parser-generator pipeline, but every terminal in the fixed terminal table
// has to come from somewhere for this crate to be runnable end to end.
// Longest-match-wins over a literal table plus a handful of regexes,
// grounded in `matcher.rs`.

use crate::error::LexError;
use crate::location::Location;
use crate::matcher::{RegexMatcher, SkipMatcher};
use crate::symbols::TERMINALS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    Identifier,
    IntegerConstant,
    Symbol,
    EndMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub class: TokenClass,
    pub lexeme: String,
    pub location: Location,
}

impl Token {
    /// Maps this token to its terminal name in the fixed terminal table —
    /// the helper that maps the enumerator to a terminal name, which the
    /// lexical-analyzer collaborator owns.
    pub fn terminal_name(&self) -> &str {
        match self.class {
            TokenClass::Identifier => "identifier",
            TokenClass::IntegerConstant => "integer_constant",
            TokenClass::EndMarker => "#",
            TokenClass::Keyword | TokenClass::Symbol => self.lexeme.as_str(),
        }
    }
}

lazy_static::lazy_static! {
    static ref KEYWORDS: Vec<&'static str> = vec![
        "i32", "let", "if", "else", "while", "return", "mut", "fn", "for", "in", "loop",
        "break", "continue",
    ];

    // Longest-match-wins handles the overlap between e.g. `>>=` and `>>`.
    static ref SYMBOLS: RegexMatcher<&'static str> = RegexMatcher::new(&[
        (">>=", r"\A>>="), ("<<=", r"\A<<="),
        (">>", r"\A>>"), ("<<", r"\A<<"),
        ("+=", r"\A\+="), ("-=", r"\A-="), ("*=", r"\A\*="), ("/=", r"\A/="), ("%=", r"\A%="),
        ("==", r"\A=="), ("!=", r"\A!="), (">=", r"\A>="), ("<=", r"\A<="),
        ("->", r"\A->"), ("..", r"\A\.\."),
        ("=", r"\A="), ("+", r"\A\+"), ("-", r"\A-"), ("*", r"\A\*"), ("/", r"\A/"), ("%", r"\A%"),
        (">", r"\A>"), ("<", r"\A<"),
        ("(", r"\A\("), (")", r"\A\)"), ("[", r"\A\["), ("]", r"\A\]"),
        ("{", r"\A\{"), ("}", r"\A\}"),
        (",", r"\A,"), (":", r"\A:"), (";", r"\A;"), (".", r"\A\."),
    ]).expect("symbol pattern table is malformed");

    static ref IDENTIFIER: regex::Regex = regex::Regex::new(r"\A[A-Za-z_][A-Za-z0-9_]*").unwrap();
    static ref INTEGER: regex::Regex = regex::Regex::new(r"\A[0-9]+").unwrap();

    static ref SKIP: SkipMatcher = SkipMatcher::new(&[
        r"\A[ \t\r\n]+",
        r"\A//[^\n]*",
        r"\A/\*([^*]|\*[^/])*\*/",
    ]).expect("skip pattern table is malformed");
}

pub struct Lexer;

impl Lexer {
    pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut row = 1u32;
        let mut col = 1u32;
        let mut rest = text;

        loop {
            let skipped = SKIP.skippable_count(rest);
            if skipped > 0 {
                advance(&mut row, &mut col, &rest[..skipped]);
                rest = &rest[skipped..];
            }
            if rest.is_empty() {
                break;
            }
            let location = Location::new(row, col);

            if let Some(m) = IDENTIFIER.find(rest) {
                let lexeme = m.as_str().to_string();
                let class = if KEYWORDS.contains(&lexeme.as_str()) {
                    TokenClass::Keyword
                } else {
                    TokenClass::Identifier
                };
                tokens.push(Token { class, lexeme: lexeme.clone(), location });
                advance(&mut row, &mut col, &lexeme);
                rest = &rest[lexeme.len()..];
                continue;
            }

            if let Some(m) = INTEGER.find(rest) {
                let lexeme = m.as_str().to_string();
                tokens.push(Token {
                    class: TokenClass::IntegerConstant,
                    lexeme: lexeme.clone(),
                    location,
                });
                advance(&mut row, &mut col, &lexeme);
                rest = &rest[lexeme.len()..];
                continue;
            }

            let (matches, len) = SYMBOLS.longest_matches(rest);
            if len > 0 {
                let lexeme = rest[..len].to_string();
                let _ = matches;
                tokens.push(Token { class: TokenClass::Symbol, lexeme: lexeme.clone(), location });
                advance(&mut row, &mut col, &lexeme);
                rest = &rest[len..];
                continue;
            }

            let ch = rest.chars().next().unwrap();
            return Err(LexError::UnrecognizedCharacter { ch, location });
        }

        tokens.push(Token {
            class: TokenClass::EndMarker,
            lexeme: "#".to_string(),
            location: Location::new(row, col),
        });
        Ok(tokens)
    }
}

fn advance(row: &mut u32, col: &mut u32, consumed: &str) {
    for ch in consumed.chars() {
        if ch == '\n' {
            *row += 1;
            *col = 1;
        } else {
            *col += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_minimal_main() {
        let tokens = Lexer::tokenize("fn main() { }").unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.terminal_name()).collect();
        assert_eq!(names, vec!["fn", "identifier", "(", ")", "{", "}", "#"]);
    }

    #[test]
    fn keyword_wins_over_identifier_class() {
        let tokens = Lexer::tokenize("let").unwrap();
        assert_eq!(tokens[0].class, TokenClass::Keyword);
        assert_eq!(tokens[0].terminal_name(), "let");
    }

    #[test]
    fn longest_match_distinguishes_compound_operators() {
        let tokens = Lexer::tokenize(">>= >> >").unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.terminal_name()).collect();
        assert_eq!(names, vec![">>=", ">>", ">", "#"]);
    }

    #[test]
    fn skips_whitespace_and_comments() {
        let tokens = Lexer::tokenize("  // hello\n  x /* block */ 42").unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.terminal_name()).collect();
        assert_eq!(names, vec!["identifier", "integer_constant", "#"]);
    }

    #[test]
    fn unrecognized_character_is_an_error() {
        let result = Lexer::tokenize("$");
        assert!(result.is_err());
    }

    #[test]
    fn every_terminal_class_maps_within_the_fixed_table() {
        for t in TERMINALS {
            assert!(!t.is_empty());
        }
    }
}
