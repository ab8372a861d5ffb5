use crate::labeler::Difficulty;
use serde::{Deserialize, Serialize};

/// Mapping between difficulties and the integer classes the forest trains on.
///
/// Classes are the distinct difficulties seen in training, ordered by name, so
/// a full set encodes as `Easy=0, Hard=1, Medium=2`. The encoding is stored
/// with the model; a model trained without `Hard` decodes `1` as `Medium`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoding {
    classes: Vec<Difficulty>,
}

impl LabelEncoding {
    pub fn fit<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = Difficulty>,
    {
        let mut classes: Vec<Difficulty> = labels.into_iter().collect();
        classes.sort_by_key(|d| d.as_str());
        classes.dedup();
        Self { classes }
    }

    pub fn encode(&self, difficulty: Difficulty) -> Option<usize> {
        self.classes.iter().position(|&d| d == difficulty)
    }

    pub fn decode(&self, class: usize) -> Option<Difficulty> {
        self.classes.get(class).copied()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[Difficulty] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_encoding_is_alphabetical() {
        let encoding = LabelEncoding::fit([
            Difficulty::Medium,
            Difficulty::Easy,
            Difficulty::Hard,
            Difficulty::Easy,
        ]);
        assert_eq!(encoding.encode(Difficulty::Easy), Some(0));
        assert_eq!(encoding.encode(Difficulty::Hard), Some(1));
        assert_eq!(encoding.encode(Difficulty::Medium), Some(2));
        assert_eq!(encoding.n_classes(), 3);
    }

    #[test]
    fn test_missing_class_shifts_indices() {
        let encoding = LabelEncoding::fit([Difficulty::Medium, Difficulty::Easy]);
        assert_eq!(encoding.encode(Difficulty::Hard), None);
        assert_eq!(encoding.decode(1), Some(Difficulty::Medium));
        assert_eq!(encoding.decode(2), None);
    }
}
