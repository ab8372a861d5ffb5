//! Random decision forest used as the difficulty classifier.
//!
//! Provides a multi-class CART tree and a seeded forest of them.

mod dataset;
mod decision_tree;
mod random_forest;

pub use dataset::Dataset;
pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use random_forest::{ForestConfig, RandomForest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    #[error("Cannot fit on an empty dataset")]
    EmptyDataset,
    #[error("A forest needs at least one tree")]
    NoTrees,
    #[error("Label {label} is out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },
}
