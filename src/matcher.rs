// Longest-match regex/literal matching, used by the lexer to turn source
// text into a token stream. Each matcher is built once (construction-time
// panics on a malformed pattern table are acceptable, since the pattern
// table is this crate's own, not user input) and then matched repeatedly.

use std::fmt::Debug;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherError {
    EmptyPattern,
    UnanchoredRegex,
    DuplicatePattern,
}

#[derive(Debug, Default)]
pub struct RegexMatcher<H: Copy + Debug> {
    lexemes: Vec<(H, Regex)>,
}

impl<H: Copy + Ord + Debug> RegexMatcher<H> {
    pub fn new(lexeme_patterns: &[(H, &str)]) -> Result<RegexMatcher<H>, MatcherError> {
        let mut patterns = vec![];
        let mut lexemes = vec![];
        for (handle, pattern) in lexeme_patterns.iter() {
            if pattern.is_empty() {
                return Err(MatcherError::EmptyPattern);
            }
            if !pattern.starts_with("\\A") {
                return Err(MatcherError::UnanchoredRegex);
            }
            match patterns.binary_search(pattern) {
                Ok(_) => return Err(MatcherError::DuplicatePattern),
                Err(index) => patterns.insert(index, *pattern),
            }
            lexemes.push((*handle, Regex::new(pattern).map_err(|_| MatcherError::UnanchoredRegex)?));
        }
        Ok(Self { lexemes })
    }

    /// Returns the longest regular expression matches at start of `text`.
    pub fn longest_matches(&self, text: &str) -> (Vec<H>, usize) {
        let mut matches = vec![];
        let mut largest_end = 0;
        for (handle, regex) in self.lexemes.iter() {
            if let Some(m) = regex.find(text) {
                if m.end() == largest_end {
                    matches.push(*handle);
                } else if m.end() > largest_end {
                    largest_end = m.end();
                    matches = vec![*handle];
                }
            }
        }
        (matches, largest_end)
    }
}

#[derive(Debug, Default)]
pub struct SkipMatcher {
    regexes: Vec<Regex>,
}

impl SkipMatcher {
    pub fn new(regex_strs: &[&str]) -> Result<Self, MatcherError> {
        let mut regexes = vec![];
        for regex_str in regex_strs.iter() {
            if !regex_str.starts_with("\\A") {
                return Err(MatcherError::UnanchoredRegex);
            }
            regexes.push(Regex::new(regex_str).map_err(|_| MatcherError::UnanchoredRegex)?);
        }
        Ok(Self { regexes })
    }

    /// Returns number of skippable bytes at start of `text`.
    pub fn skippable_count(&self, text: &str) -> usize {
        let mut index = 0;
        'outer: while index < text.len() {
            for regex in self.regexes.iter() {
                if let Some(m) = regex.find(&text[index..]) {
                    if m.end() == 0 {
                        continue;
                    }
                    index += m.end();
                    continue 'outer;
                }
            }
            break;
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins_over_shorter_overlapping_pattern() {
        let matcher: RegexMatcher<u32> =
            RegexMatcher::new(&[(0, r"\Ai"), (1, r"\Ai32")]).unwrap();
        let (matches, len) = matcher.longest_matches("i32x");
        assert_eq!(len, 3);
        assert_eq!(matches, vec![1]);
    }

    #[test]
    fn skip_matcher_consumes_whitespace_and_comments() {
        let skip = SkipMatcher::new(&[r"\A\s+", r"\A//[^\n]*"]).unwrap();
        assert_eq!(skip.skippable_count("   // hi\nfoo"), 9);
    }

    #[test]
    fn rejects_unanchored_pattern() {
        let result: Result<RegexMatcher<u32>, _> = RegexMatcher::new(&[(0, "i32")]);
        assert_eq!(result.unwrap_err(), MatcherError::UnanchoredRegex);
    }
}
