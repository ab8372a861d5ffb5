use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Column names of the feature vector, in vector order.
pub const FEATURE_NAMES: [&str; 3] = ["length", "syllables", "frequency"];

/// Width of the feature vector.
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Features computed for a single word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub length: usize,
    pub syllable_count: usize,
    /// Lexical units in the word read as a one-word text. Always 1 for a
    /// tokenizer word, so it carries next to no signal.
    pub frequency_proxy: usize,
}

impl WordRecord {
    /// Compute the features of `word`. The word is trimmed and lowercased
    /// first so query input and tokenizer output are treated alike.
    pub fn extract(word: &str) -> Self {
        let word = word.trim().to_lowercase();
        Self {
            length: word.chars().count(),
            syllable_count: syllable_count(&word),
            frequency_proxy: lexicon_count(&word),
            word,
        }
    }

    pub fn feature_vector(&self) -> [f64; N_FEATURES] {
        [
            self.length as f64,
            self.syllable_count as f64,
            self.frequency_proxy as f64,
        ]
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Estimate syllables from spelling by counting vowel groups.
///
/// A final silent `e` is dropped ("cake" = 1) except after a consonant + `l`
/// ("table" = 2) or as part of `ee` ("agree" = 2). Any word with a letter has
/// at least one syllable; a word without letters has none.
pub fn syllable_count(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(|c| c.to_lowercase())
        .collect();

    if letters.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    let n = letters.len();
    if count > 1 && letters[n - 1] == 'e' {
        let before = letters[n - 2];
        let consonant_le = before == 'l' && n >= 3 && !is_vowel(letters[n - 3]);
        if !consonant_le && before != 'e' {
            count -= 1;
        }
    }

    count.max(1)
}

/// Count the words of `text` after Unicode word segmentation.
pub fn lexicon_count(text: &str) -> usize {
    text.unicode_words().count()
}
