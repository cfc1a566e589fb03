//! Pre-trained classifiers that can be shipped inside an artifact.
//!
//! The pipeline only sees the [`Classifier`] trait. [`ClassifierModel`] is the
//! serialized form the training side exports; it is checked structurally and
//! turned into a boxed trait object when the artifact is loaded.

use serde::{Deserialize, Serialize};

use crate::features::FeatureMatrix;

/// Inference capability the pipeline relies on.
pub trait Classifier: std::fmt::Debug + Send + Sync {
    /// Short name of the model family, e.g. "random_forest"
    fn kind(&self) -> &'static str;

    /// Number of ordinal class codes the model can emit
    fn n_classes(&self) -> usize;

    /// Highest feature index the model reads, `None` if it reads none
    fn max_feature_index(&self) -> Option<usize>;

    /// Exact row width the model was fitted on, when the model records it.
    ///
    /// Trees only address features by index and return `None`.
    fn input_width(&self) -> Option<usize> {
        None
    }

    /// Predict one ordinal class code for a single aligned row.
    fn predict(&self, matrix: &FeatureMatrix<'_>) -> usize;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ClassifierModel {
    /// Check the model's internal structure and box it for the pipeline.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, String> {
        match self {
            ClassifierModel::DecisionTree(tree) => {
                tree.validate().map_err(|e| format!("decision_tree: {}", e))?;
                Ok(Box::new(tree))
            }
            ClassifierModel::RandomForest(forest) => {
                forest.validate()?;
                Ok(Box::new(forest))
            }
            ClassifierModel::LogisticRegression(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

/// A tree node in the layout scikit-learn exports: splits send `x <= threshold`
/// to `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class_counts: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionTree {
    /// Node 0 is the root
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let mut n_classes = None;
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { left, right, threshold, .. } => {
                    // Children after parent guarantees traversal terminates.
                    for child in [*left, *right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", id, child));
                        }
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", id));
                    }
                }
                TreeNode::Leaf { class_counts } => {
                    if class_counts.is_empty() {
                        return Err(format!("leaf {} has no class counts", id));
                    }
                    if class_counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
                        return Err(format!("leaf {} has a negative or non-finite count", id));
                    }
                    match n_classes {
                        None => n_classes = Some(class_counts.len()),
                        Some(n) if n != class_counts.len() => {
                            return Err(format!(
                                "leaf {} has {} classes, expected {}",
                                id,
                                class_counts.len(),
                                n
                            ));
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        if n_classes.is_none() {
            return Err("tree has no leaves".to_string());
        }
        Ok(())
    }

    fn leaf_counts(&self, values: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                TreeNode::Split { feature, threshold, left, right } => {
                    let x = values.get(*feature).copied().unwrap_or(0.0);
                    id = if x <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { class_counts } => return class_counts,
            }
        }
    }

    /// Class distribution of the leaf reached by `values`, normalized to sum to 1
    fn predict_proba(&self, values: &[f64]) -> Vec<f64> {
        let counts = self.leaf_counts(values);
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![0.0; counts.len()]
        }
    }
}

impl Classifier for DecisionTree {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_classes(&self) -> usize {
        self.nodes
            .iter()
            .find_map(|node| match node {
                TreeNode::Leaf { class_counts } => Some(class_counts.len()),
                TreeNode::Split { .. } => None,
            })
            .unwrap_or(0)
    }

    fn max_feature_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                TreeNode::Split { feature, .. } => Some(*feature),
                TreeNode::Leaf { .. } => None,
            })
            .max()
    }

    fn predict(&self, matrix: &FeatureMatrix<'_>) -> usize {
        argmax(self.leaf_counts(matrix.values()))
    }
}

/// Bagged trees; the prediction is the class with the highest mean probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("random_forest: no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| format!("random_forest.trees[{}]: {}", i, e))?;
        }
        let n_classes = self.trees[0].n_classes();
        if let Some(i) = self.trees.iter().position(|t| t.n_classes() != n_classes) {
            return Err(format!(
                "random_forest.trees[{}]: class count differs from trees[0]",
                i
            ));
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_classes(&self) -> usize {
        self.trees.first().map(|t| t.n_classes()).unwrap_or(0)
    }

    fn max_feature_index(&self) -> Option<usize> {
        self.trees.iter().filter_map(|t| t.max_feature_index()).max()
    }

    fn predict(&self, matrix: &FeatureMatrix<'_>) -> usize {
        let mut summed = vec![0.0; self.n_classes()];
        for tree in &self.trees {
            for (acc, p) in summed.iter_mut().zip(tree.predict_proba(matrix.values())) {
                *acc += p;
            }
        }
        // Dividing by the tree count would not change the argmax.
        argmax(&summed)
    }
}

/// Linear model; a single coefficient row is the binary case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticRegression {
    /// One row per class, or a single row for binary models
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("logistic_regression: no coefficient rows".to_string());
        }
        if self.coefficients.len() != self.intercepts.len() {
            return Err(format!(
                "logistic_regression: {} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            ));
        }
        let width = self.coefficients[0].len();
        if self.coefficients.iter().any(|row| row.len() != width) {
            return Err("logistic_regression: coefficient rows differ in length".to_string());
        }
        Ok(())
    }

    fn decision(&self, row: usize, values: &[f64]) -> f64 {
        let dot: f64 = self.coefficients[row]
            .iter()
            .zip(values)
            .map(|(w, x)| w * x)
            .sum();
        dot + self.intercepts[row]
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_classes(&self) -> usize {
        match self.coefficients.len() {
            1 => 2,
            n => n,
        }
    }

    fn max_feature_index(&self) -> Option<usize> {
        self.coefficients
            .first()
            .and_then(|row| row.len().checked_sub(1))
    }

    fn input_width(&self) -> Option<usize> {
        self.coefficients.first().map(Vec::len)
    }

    fn predict(&self, matrix: &FeatureMatrix<'_>) -> usize {
        let values = matrix.values();
        if self.coefficients.len() == 1 {
            usize::from(self.decision(0, values) > 0.0)
        } else {
            let decisions: Vec<f64> = (0..self.coefficients.len())
                .map(|row| self.decision(row, values))
                .collect();
            argmax(&decisions)
        }
    }
}

/// Index of the largest value; ties go to the lowest index.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
