//! Multi-class CART decision tree

use super::{Dataset, FitError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Features drawn per split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        class: usize,
        class_counts: Vec<usize>,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        n_samples: usize,
        impurity: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn leaf(class_counts: Vec<usize>) -> Self {
        Self::Leaf {
            class: majority_class(&class_counts),
            class_counts,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    gain: f64,
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    n_classes: usize,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_classes: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Train the tree on every row of `dataset`
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError> {
        if dataset.n_samples() == 0 {
            return Err(FitError::EmptyDataset);
        }
        if let Some(&label) = dataset.labels.iter().find(|&&l| l >= dataset.n_classes) {
            return Err(FitError::LabelOutOfRange {
                label,
                n_classes: dataset.n_classes,
            });
        }

        self.n_classes = dataset.n_classes;
        self.feature_importances = vec![0.0; dataset.n_features()];

        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build_tree(dataset, &indices, 0, &mut rng));

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
        Ok(())
    }

    fn build_tree(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let counts = self.class_counts(dataset, indices);
        let impurity = gini(&counts);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || indices.len() < self.config.min_samples_split || impurity < 1e-10 {
            return TreeNode::leaf(counts);
        }

        let Some(split) = self.find_best_split(dataset, indices, impurity, rng) else {
            return TreeNode::leaf(counts);
        };

        self.feature_importances[split.feature_idx] += split.gain * indices.len() as f64;

        let left = self.build_tree(dataset, &split.left, depth + 1, rng);
        let right = self.build_tree(dataset, &split.right, depth + 1, rng);

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            n_samples: indices.len(),
            impurity,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Search a random subset of features first; if none of them can split
    /// the node, keep searching the features left out of the draw.
    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n_features = dataset.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features.max(1));

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        let (drawn, rest) = feature_indices.split_at(max_features.min(n_features));

        self.best_split_among(dataset, indices, parent_impurity, drawn)
            .or_else(|| self.best_split_among(dataset, indices, parent_impurity, rest))
    }

    fn best_split_among(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        features: &[usize],
    ) -> Option<BestSplit> {
        let mut best: Option<BestSplit> = None;
        let n_total = indices.len() as f64;

        for &feature_idx in features {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| dataset.features[i][feature_idx])
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            // Midpoints between consecutive distinct values
            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| dataset.features[i][feature_idx] <= threshold);

                if left.len() < self.config.min_samples_leaf
                    || right.len() < self.config.min_samples_leaf
                {
                    continue;
                }

                let left_impurity = gini(&self.class_counts(dataset, &left));
                let right_impurity = gini(&self.class_counts(dataset, &right));
                let weighted = (left.len() as f64 * left_impurity
                    + right.len() as f64 * right_impurity)
                    / n_total;
                let gain = parent_impurity - weighted;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature_idx,
                        threshold,
                        left,
                        right,
                        gain,
                    });
                }
            }
        }

        best
    }

    fn class_counts(&self, dataset: &Dataset, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[dataset.labels[i]] += 1;
        }
        counts
    }

    /// Predicted class for one feature row. An unfitted tree predicts class 0.
    pub fn predict_one(&self, features: &[f64]) -> usize {
        let mut node = match &self.root {
            Some(node) => node,
            None => return 0,
        };

        loop {
            match node {
                TreeNode::Leaf { class, .. } => return *class,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = features.get(*feature_idx).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

/// Gini impurity of a class histogram
fn gini(counts: &[usize]) -> f64 {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Index of the largest count; ties go to the lowest index
pub(crate) fn majority_class(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .fold((0, 0), |(best, best_count), (class, &count)| {
            if count > best_count {
                (class, count)
            } else {
                (best, best_count)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staircase() -> Dataset {
        let mut dataset = Dataset::new(vec!["x".to_string(), "y".to_string()], 3);
        for x in 0..12 {
            for y in 0..4 {
                let label = if x < 4 && y < 2 {
                    0
                } else if x < 8 {
                    2
                } else {
                    1
                };
                dataset.add_sample(vec![x as f64, y as f64], label);
            }
        }
        dataset
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0, 0]), 0.0);
        assert!((gini(&[1, 1]) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[]), 0.0);
    }

    #[test]
    fn test_majority_class_tie_breaks_low() {
        assert_eq!(majority_class(&[2, 5, 5]), 1);
        assert_eq!(majority_class(&[0, 0, 0]), 0);
    }

    #[test]
    fn test_fully_grown_tree_fits_training_rows() {
        let dataset = staircase();
        let mut tree = DecisionTree::new(TreeConfig {
            max_features: Some(1),
            ..Default::default()
        });
        tree.fit(&dataset).unwrap();

        for (row, &label) in dataset.features.iter().zip(&dataset.labels) {
            assert_eq!(tree.predict_one(row), label);
        }
        let importances: f64 = tree.feature_importances().iter().sum();
        assert!((importances - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_limit() {
        let mut tree = DecisionTree::new(TreeConfig {
            max_depth: Some(1),
            ..Default::default()
        });
        tree.fit(&staircase()).unwrap();
        let root = tree.root().unwrap();
        assert!(!root.is_leaf());
        assert_eq!(root.depth(), 2);
        assert_eq!(root.n_leaves(), 2);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut tree = DecisionTree::new(TreeConfig::default());
        let empty = Dataset::new(vec!["x".to_string()], 2);
        assert_eq!(tree.fit(&empty), Err(FitError::EmptyDataset));

        let mut bad = Dataset::new(vec!["x".to_string()], 2);
        bad.add_sample(vec![1.0], 5);
        assert_eq!(
            tree.fit(&bad),
            Err(FitError::LabelOutOfRange {
                label: 5,
                n_classes: 2
            })
        );
    }
}
