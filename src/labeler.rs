use crate::features::WordRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const EASY_MAX_LENGTH: usize = 4;
const EASY_MAX_SYLLABLES: usize = 1;
const MEDIUM_MAX_LENGTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty: {}", s))
    }
}

/// Auto-label a word from its length and syllable estimate.
pub fn label(length: usize, syllable_count: usize) -> Difficulty {
    if length <= EASY_MAX_LENGTH && syllable_count <= EASY_MAX_SYLLABLES {
        Difficulty::Easy
    } else if length <= MEDIUM_MAX_LENGTH {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

/// A word record with its auto-assigned difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledWord {
    pub record: WordRecord,
    pub difficulty: Difficulty,
}

impl LabeledWord {
    pub fn from_record(record: WordRecord) -> Self {
        let difficulty = label(record.length, record.syllable_count);
        Self { record, difficulty }
    }
}
