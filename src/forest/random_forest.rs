//! Random Forest implementation

use super::decision_tree::{majority_class, DecisionTree, TreeConfig};
use super::{Dataset, FitError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn per split (ceil of sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: false,
            seed: 42,
        }
    }
}

/// Random Forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_classes: usize,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_classes: 0,
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Train the forest. Tree `i` is seeded with `seed + i`, so the same
    /// dataset and config always give the same forest.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError> {
        if dataset.n_samples() == 0 {
            return Err(FitError::EmptyDataset);
        }
        if self.config.n_trees == 0 {
            return Err(FitError::NoTrees);
        }

        self.feature_names = dataset.feature_names.clone();
        self.n_classes = dataset.n_classes;
        let n_features = dataset.n_features();

        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize);

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for i in 0..self.config.n_trees {
            let seed = self.config.seed.wrapping_add(i as u64);
            let mut tree = DecisionTree::new(TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: Some(max_features),
                seed,
            });

            if self.config.bootstrap {
                tree.fit(&dataset.bootstrap_sample(seed))?;
            } else {
                tree.fit(dataset)?;
            }

            if let Some(root) = tree.root() {
                debug!(tree = i, depth = root.depth(), leaves = root.n_leaves(), "Fitted tree");
            }
            trees.push(tree);
        }
        self.trees = trees;

        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        Ok(())
    }

    /// Votes per class for one feature row
    pub fn predict_votes(&self, features: &[f64]) -> Vec<usize> {
        let mut votes = vec![0; self.n_classes];
        for tree in &self.trees {
            if let Some(vote) = votes.get_mut(tree.predict_one(features)) {
                *vote += 1;
            }
        }
        votes
    }

    /// Majority-vote class for one feature row; ties go to the lowest class
    pub fn predict_one(&self, features: &[f64]) -> usize {
        majority_class(&self.predict_votes(features))
    }

    pub fn predict(&self, dataset: &Dataset) -> Vec<usize> {
        dataset
            .features
            .iter()
            .map(|f| self.predict_one(f))
            .collect()
    }

    pub fn accuracy(&self, dataset: &Dataset) -> f64 {
        if dataset.n_samples() == 0 {
            return 0.0;
        }
        let correct = self
            .predict(dataset)
            .iter()
            .zip(dataset.labels.iter())
            .filter(|(pred, label)| pred == label)
            .count();
        correct as f64 / dataset.n_samples() as f64
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names with importances, most important first
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .feature_names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_bands() -> Dataset {
        let mut dataset = Dataset::new(vec!["x".to_string(), "noise".to_string()], 3);
        for i in 0..60 {
            let x = i as f64;
            let label = if x < 20.0 { 0 } else if x < 40.0 { 1 } else { 2 };
            dataset.add_sample(vec![x, 1.0], label);
        }
        dataset
    }

    #[test]
    fn test_forest_fits_training_data() {
        let dataset = three_bands();
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 15,
            ..Default::default()
        });
        forest.fit(&dataset).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.accuracy(&dataset), 1.0);
        assert_eq!(forest.feature_importance_ranking()[0].0, "x");
    }

    #[test]
    fn test_votes_sum_to_tree_count() {
        let dataset = three_bands();
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 9,
            bootstrap: true,
            ..Default::default()
        });
        forest.fit(&dataset).unwrap();

        let votes = forest.predict_votes(&[5.0, 1.0]);
        assert_eq!(votes.len(), 3);
        assert_eq!(votes.iter().sum::<usize>(), 9);
        assert_eq!(forest.predict_one(&[5.0, 1.0]), 0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let dataset = three_bands();
        let config = ForestConfig {
            n_trees: 7,
            bootstrap: true,
            seed: 3,
            ..Default::default()
        };
        let mut a = RandomForest::new(config.clone());
        let mut b = RandomForest::new(config);
        a.fit(&dataset).unwrap();
        b.fit(&dataset).unwrap();

        for x in [0.0, 19.5, 20.5, 39.0, 41.0, 100.0] {
            assert_eq!(a.predict_votes(&[x, 1.0]), b.predict_votes(&[x, 1.0]));
        }
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let mut forest = RandomForest::new(ForestConfig::default());
        let empty = Dataset::new(vec!["x".to_string()], 3);
        assert_eq!(forest.fit(&empty), Err(FitError::EmptyDataset));
    }

    #[test]
    fn test_zero_trees_is_rejected() {
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 0,
            ..Default::default()
        });
        assert_eq!(forest.fit(&three_bands()), Err(FitError::NoTrees));
        assert_eq!(forest.n_trees(), 0);
    }
}
