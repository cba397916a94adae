//! JSON-exported binary classifiers: logistic regression and random forest.

use std::path::Path;

use serde::Deserialize;

use super::{check_classes, check_schema, corrupt, parse_json, Classifier};
use crate::inference::InferenceError;
use crate::models::Disease;

/// On-disk model document.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: String,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// Class labels in probability-column order.
    pub classes: Vec<i64>,
    #[serde(default = "super::default_positive_class")]
    pub positive_class: i64,
    #[serde(flatten)]
    pub params: ModelParams,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParams {
    /// Binary logistic regression; the decision function scores `classes[1]`.
    LogisticRegression { coef: Vec<f64>, intercept: f64 },
    /// Ensemble of decision trees exported from `tree_` arrays.
    RandomForest {
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
}

/// One fitted decision tree in flat-array form.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise samples go
/// left when `x[feature[i]] <= threshold[i]`. `value[i]` holds per-class
/// weights for the node.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

const LEAF: i64 = -1;

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree arrays have different lengths".into());
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF {
                let weights = &self.value[i];
                if weights.len() != n_classes {
                    return Err(format!(
                        "leaf {i} has {} class weights, expected {n_classes}",
                        weights.len()
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(format!("leaf {i} has invalid class weights"));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {i} has zero total weight"));
                }
                continue;
            }
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {i} has out-of-order child {child}"));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {i} splits on missing feature {feature}"));
            }
            if self.threshold[i].is_nan() {
                return Err(format!("node {i} has NaN threshold"));
            }
        }
        Ok(())
    }

    /// Normalised class distribution of the leaf `row` lands in.
    ///
    /// `validate` guarantees children have larger indices than their
    /// parent, so the walk always terminates.
    fn leaf_distribution(&self, row: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

/// Classifier backed by a JSON parameter export.
#[derive(Debug, Clone)]
pub struct JsonClassifier {
    classes: Vec<i64>,
    positive_class: i64,
    params: ModelParams,
}

impl JsonClassifier {
    /// Parse and validate a model artifact for `disease`.
    pub fn from_bytes(path: &Path, bytes: &[u8], disease: Disease) -> Result<Self, InferenceError> {
        let artifact: ModelArtifact = parse_json(path, bytes)?;
        check_classes(path, &artifact.classes, artifact.positive_class)?;

        let n_features = match &artifact.params {
            ModelParams::LogisticRegression { coef, intercept } => {
                if coef.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
                    return Err(corrupt(path, "coefficients contain non-finite values"));
                }
                coef.len()
            }
            ModelParams::RandomForest { n_features, trees } => {
                if trees.is_empty() {
                    return Err(corrupt(path, "forest has no trees"));
                }
                for (t, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features, artifact.classes.len())
                        .map_err(|r| corrupt(path, format!("tree {t}: {r}")))?;
                }
                *n_features
            }
        };

        check_schema(
            disease,
            &artifact.schema_version,
            artifact.feature_names.as_deref(),
            n_features,
        )?;

        Ok(Self {
            classes: artifact.classes,
            positive_class: artifact.positive_class,
            params: artifact.params,
        })
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for JsonClassifier {
    fn n_features(&self) -> usize {
        match &self.params {
            ModelParams::LogisticRegression { coef, .. } => coef.len(),
            ModelParams::RandomForest { n_features, .. } => *n_features,
        }
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn positive_class(&self) -> i64 {
        self.positive_class
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if row.len() != self.n_features() {
            return Err(InferenceError::length_mismatch(
                "features",
                self.n_features(),
                row.len(),
            ));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::Inference(
                "model input contains non-finite values".into(),
            ));
        }

        let proba = match &self.params {
            ModelParams::LogisticRegression { coef, intercept } => {
                let z: f64 = intercept + coef.iter().zip(row).map(|(c, x)| c * x).sum::<f64>();
                let p = sigmoid(z);
                vec![1.0 - p, p]
            }
            ModelParams::RandomForest { trees, .. } => {
                let mut acc = vec![0.0; self.classes.len()];
                for tree in trees {
                    for (a, p) in acc.iter_mut().zip(tree.leaf_distribution(row)) {
                        *a += p;
                    }
                }
                let n = trees.len() as f64;
                acc.into_iter().map(|a| a / n).collect()
            }
        };
        Ok(proba)
    }
}
