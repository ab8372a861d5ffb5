use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Shortest token kept by the tokenizer.
pub const MIN_WORD_LEN: usize = 2;

static WORD_PATTERN: OnceLock<Regex> = OnceLock::new();

fn word_pattern() -> &'static Regex {
    // `\b` is Unicode-aware: runs like "abc123" or "café" never match.
    WORD_PATTERN.get_or_init(|| {
        Regex::new(&format!(r"\b[a-zA-Z]{{{},}}\b", MIN_WORD_LEN)).expect("word pattern is valid")
    })
}

/// Extract the unique lowercase words of `text`.
///
/// A word is two or more ASCII letters delimited by word boundaries. The set
/// is ordered so that everything built from it (feature tables, bootstrap
/// samples) comes out the same on every run.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    word_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t").is_empty());
    }

    #[test]
    fn test_lowercases_and_dedups() {
        let words = tokenize("The cat saw THE Cat. the end");
        let expected: Vec<&str> = vec!["cat", "end", "saw", "the"];
        assert_eq!(words.iter().map(|w| w.as_str()).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_drops_short_and_mixed_tokens() {
        let words = tokenize("a I ok abc123 snake_case café don't x2 hello-world");
        let got: Vec<&str> = words.iter().map(|w| w.as_str()).collect();
        // "don't" yields "don"; the trailing "t" is too short.
        assert_eq!(got, vec!["don", "hello", "ok", "world"]);
    }

    proptest! {
        #[test]
        fn prop_tokens_are_lowercase_ascii_words(text in "\\PC{0,200}") {
            let pattern = Regex::new("^[a-z]{2,}$").unwrap();
            for token in tokenize(&text) {
                prop_assert!(pattern.is_match(&token), "bad token {:?}", token);
            }
        }

        #[test]
        fn prop_no_duplicates_after_case_folding(text in "[a-zA-Z ,.]{0,120}") {
            let tokens: Vec<String> = tokenize(&text).into_iter().collect();
            let mut deduped = tokens.clone();
            deduped.dedup();
            prop_assert_eq!(tokens, deduped);
        }
    }
}
