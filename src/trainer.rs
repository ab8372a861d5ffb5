use crate::encoding::LabelEncoding;
use crate::features::{WordRecord, FEATURE_NAMES};
use crate::forest::{Dataset, FitError, ForestConfig, RandomForest};
use crate::labeler::{Difficulty, LabeledWord};
use crate::model::DifficultyModel;
use crate::store::{ModelStore, StoreError};
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("No words to train on: the text contains no word of two or more letters")]
    EmptyTable,
    #[error("Every word was labeled {0}; at least two difficulty classes are needed")]
    SingleClass(Difficulty),
    #[error("Failed to fit classifier: {0}")]
    Fit(#[from] FitError),
    #[error("Failed to save model: {0}")]
    Store(#[from] StoreError),
}

impl Serialize for TrainingError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct TrainProgress {
    pub stage: String,
    pub progress: u8, // 0-100
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TrainSummary {
    pub trained_words: usize,
    pub class_counts: BTreeMap<Difficulty, usize>,
    pub n_trees: usize,
    pub training_accuracy: f64,
}

/// Tokenize `text` and auto-label every unique word.
pub fn label_text(text: &str) -> Vec<LabeledWord> {
    tokenize(text)
        .into_iter()
        .map(|word| LabeledWord::from_record(WordRecord::extract(&word)))
        .collect()
}

/// Fits a difficulty model and writes it to the injected store.
pub struct Trainer<'a> {
    store: &'a dyn ModelStore,
    config: ForestConfig,
}

impl<'a> Trainer<'a> {
    pub fn new(store: &'a dyn ModelStore, config: ForestConfig) -> Self {
        Self { store, config }
    }

    /// Run the whole pipeline on raw text: tokenize, extract, label, fit, save.
    pub fn train_text<F>(&self, text: &str, mut on_progress: F) -> Result<TrainSummary, TrainingError>
    where
        F: FnMut(TrainProgress),
    {
        on_progress(TrainProgress {
            stage: "Tokenizing".to_string(),
            progress: 10,
            detail: Some(format!("{} bytes of text", text.len())),
        });

        let table = label_text(text);
        info!("Fetched {} unique words", table.len());

        on_progress(TrainProgress {
            stage: "Labeling words".to_string(),
            progress: 30,
            detail: Some(format!("{} unique words", table.len())),
        });

        self.train(&table, on_progress)
    }

    /// Fit on an already labeled table. Nothing is written unless the fit
    /// succeeds, so a failed run leaves the previous model in place.
    pub fn train<F>(&self, table: &[LabeledWord], mut on_progress: F) -> Result<TrainSummary, TrainingError>
    where
        F: FnMut(TrainProgress),
    {
        if table.is_empty() {
            return Err(TrainingError::EmptyTable);
        }

        let mut class_counts: BTreeMap<Difficulty, usize> = BTreeMap::new();
        for row in table {
            *class_counts.entry(row.difficulty).or_insert(0) += 1;
        }
        if class_counts.len() < 2 {
            return Err(TrainingError::SingleClass(table[0].difficulty));
        }
        if class_counts.len() < Difficulty::ALL.len() {
            warn!(
                "Training data covers only {} of {} difficulty classes",
                class_counts.len(),
                Difficulty::ALL.len()
            );
        }

        let encoding = LabelEncoding::fit(class_counts.keys().copied());
        let feature_names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        let mut dataset = Dataset::new(feature_names.clone(), encoding.n_classes());
        for row in table {
            // Every difficulty in the table went into the encoding above.
            if let Some(class) = encoding.encode(row.difficulty) {
                dataset.add_sample(row.record.feature_vector().to_vec(), class);
            }
        }

        on_progress(TrainProgress {
            stage: "Training classifier".to_string(),
            progress: 50,
            detail: Some(format!(
                "{} trees on {} words",
                self.config.n_trees,
                dataset.n_samples()
            )),
        });

        let mut forest = RandomForest::new(self.config.clone());
        forest.fit(&dataset)?;
        let training_accuracy = forest.accuracy(&dataset);
        info!(
            "Trained {} trees, training accuracy {:.2}%",
            forest.n_trees(),
            training_accuracy * 100.0
        );
        for (name, importance) in forest.feature_importance_ranking() {
            info!("  {}: {:.4}", name, importance);
        }

        on_progress(TrainProgress {
            stage: "Saving model".to_string(),
            progress: 90,
            detail: None,
        });

        let summary = TrainSummary {
            trained_words: table.len(),
            class_counts: class_counts.clone(),
            n_trees: forest.n_trees(),
            training_accuracy,
        };

        let model = DifficultyModel {
            forest,
            encoding,
            feature_names,
            trained_words: table.len(),
            class_counts,
        };
        self.store.save(&model)?;

        on_progress(TrainProgress {
            stage: "Complete".to_string(),
            progress: 100,
            detail: Some(format!("{} words trained", summary.trained_words)),
        });

        Ok(summary)
    }
}
