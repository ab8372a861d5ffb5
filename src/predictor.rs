use crate::features::WordRecord;
use crate::labeler::Difficulty;
use crate::model::ClassVotes;
use crate::store::{ModelStore, StoreError};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("No word given")]
    EmptyWord,
    #[error("No trained model found. Please train one first.")]
    ModelNotFound,
    #[error("Stored model has no label for class {0}; retrain the model")]
    UnknownClass(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Serialize for PredictError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Prediction {
    pub word: String,
    pub difficulty: Difficulty,
    pub features: WordRecord,
    pub votes: Vec<ClassVotes>,
}

/// Labels query words with the model currently in the store.
pub struct Predictor<'a> {
    store: &'a dyn ModelStore,
}

impl<'a> Predictor<'a> {
    pub fn new(store: &'a dyn ModelStore) -> Self {
        Self { store }
    }

    /// Classify one word. The model is read from the store on every call so
    /// a retrain is picked up without restarting.
    pub fn predict(&self, word: &str) -> Result<Prediction, PredictError> {
        let record = WordRecord::extract(word);
        if record.word.is_empty() {
            return Err(PredictError::EmptyWord);
        }

        let model = self.store.load()?.ok_or(PredictError::ModelNotFound)?;
        let (difficulty, votes) = model.classify(&record).ok_or_else(|| {
            PredictError::UnknownClass(model.forest.predict_one(&record.feature_vector()))
        })?;

        debug!(
            word = %record.word,
            length = record.length,
            syllables = record.syllable_count,
            "Classified as {}",
            difficulty
        );

        Ok(Prediction {
            word: record.word.clone(),
            difficulty,
            features: record,
            votes,
        })
    }
}
