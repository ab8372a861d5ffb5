pub mod config;
pub mod encoding;
pub mod features;
pub mod fetch;
pub mod forest;
pub mod labeler;
pub mod model;
pub mod predictor;
pub mod store;
pub mod tokenizer;
pub mod trainer;

mod cli;

pub use cli::run;
pub use fetch::{FetchError, Source};
pub use labeler::{label, Difficulty};
pub use predictor::{PredictError, Prediction, Predictor};
pub use store::{FileModelStore, MemoryModelStore, ModelStore, StoreError};
pub use trainer::{TrainProgress, TrainSummary, Trainer, TrainingError};

use config::Config;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A failed train command: either the text never arrived or the fit failed.
#[derive(Debug, thiserror::Error)]
pub enum TrainCommandError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Training(#[from] TrainingError),
}

impl Serialize for TrainCommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub path: PathBuf,
    pub trained: bool,
    pub trained_words: Option<usize>,
    pub class_counts: Option<BTreeMap<Difficulty, usize>>,
    pub n_trees: Option<usize>,
}

pub struct AppState {
    pub config: Config,
    pub store: FileModelStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = FileModelStore::new(config.model_path());
        Self { config, store }
    }

    pub fn with_model_path(config: Config, path: PathBuf) -> Self {
        Self {
            config,
            store: FileModelStore::new(path),
        }
    }

    /// Load the source text and train on it, replacing the stored model.
    pub fn train<F>(&self, source: &Source, on_progress: F) -> Result<TrainSummary, TrainCommandError>
    where
        F: FnMut(TrainProgress),
    {
        let text = source.load(self.config.fetch_timeout())?;
        let trainer = Trainer::new(&self.store, self.config.forest_config());
        Ok(trainer.train_text(&text, on_progress)?)
    }

    pub fn predict(&self, word: &str) -> Result<Prediction, PredictError> {
        Predictor::new(&self.store).predict(word)
    }

    pub fn status(&self) -> Result<ModelStatus, StoreError> {
        let model = self.store.load()?;
        Ok(ModelStatus {
            path: self.store.path().to_path_buf(),
            trained: model.is_some(),
            trained_words: model.as_ref().map(|m| m.trained_words),
            class_counts: model.as_ref().map(|m| m.class_counts.clone()),
            n_trees: model.as_ref().map(|m| m.forest.n_trees()),
        })
    }
}
