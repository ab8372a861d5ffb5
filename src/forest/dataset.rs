use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Feature rows with integer class labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Class index per row
    pub labels: Vec<usize>,
    pub feature_names: Vec<String>,
    pub n_classes: usize,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>, n_classes: usize) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            feature_names,
            n_classes,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn add_sample(&mut self, features: Vec<f64>, label: usize) {
        assert_eq!(features.len(), self.feature_names.len());
        self.features.push(features);
        self.labels.push(label);
    }

    /// Per-class row counts
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &label in &self.labels {
            if let Some(count) = counts.get_mut(label) {
                *count += 1;
            }
        }
        counts
    }

    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
            n_classes: self.n_classes,
        }
    }

    /// Sample rows with replacement
    pub fn bootstrap_sample(&self, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();
        let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        self.subset(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset {
        let mut dataset = Dataset::new(vec!["x".to_string()], 3);
        for i in 0..30 {
            dataset.add_sample(vec![i as f64], i % 3);
        }
        dataset
    }

    #[test]
    fn test_class_counts() {
        assert_eq!(sample_dataset().class_counts(), vec![10, 10, 10]);
    }

    #[test]
    fn test_bootstrap_is_seeded() {
        let dataset = sample_dataset();
        let a = dataset.bootstrap_sample(7);
        let b = dataset.bootstrap_sample(7);
        assert_eq!(a.n_samples(), dataset.n_samples());
        assert_eq!(a.features, b.features);
        assert_eq!(a.labels, b.labels);
    }
}
