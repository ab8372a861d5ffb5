use crate::encoding::LabelEncoding;
use crate::features::WordRecord;
use crate::forest::RandomForest;
use crate::labeler::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything stored in the model slot: the fitted forest plus the label
/// encoding it was trained with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyModel {
    pub forest: RandomForest,
    pub encoding: LabelEncoding,
    pub feature_names: Vec<String>,
    pub trained_words: usize,
    pub class_counts: BTreeMap<Difficulty, usize>,
}

/// Vote share of one difficulty for a classified word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassVotes {
    pub difficulty: Difficulty,
    pub votes: usize,
}

impl DifficultyModel {
    /// Classify a word record. Returns `None` if the forest votes for a class
    /// the stored encoding does not know, which only happens with a damaged
    /// artifact.
    pub fn classify(&self, record: &WordRecord) -> Option<(Difficulty, Vec<ClassVotes>)> {
        let features = record.feature_vector();
        let votes = self.forest.predict_votes(&features);
        let class = self.forest.predict_one(&features);
        let difficulty = self.encoding.decode(class)?;

        let votes = votes
            .into_iter()
            .enumerate()
            .filter_map(|(class, votes)| {
                self.encoding
                    .decode(class)
                    .map(|difficulty| ClassVotes { difficulty, votes })
            })
            .collect();

        Some((difficulty, votes))
    }
}
