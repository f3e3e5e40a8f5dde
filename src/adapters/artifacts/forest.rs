//! Random forest classifier exported as JSON.
//!
//! Each tree is a flat node array in the scikit-learn convention: node 0 is
//! the root, a split sends `x[feature] <= threshold` to `left`, and a leaf
//! carries per-class weights. The forest averages each tree's normalized leaf
//! distribution and predicts the argmax, as `RandomForestClassifier` does.

use serde::{Deserialize, Serialize};

use crate::ports::{ClassOutput, Classifier, ModelOutput, PredictionError};

/// A single tree node.
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
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Forest parameters as exported by the training pipeline (`model.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    pub n_features: usize,
    pub n_classes: usize,
    /// Class tokens in class-index order (`classes_`), when exported
    #[serde(default)]
    pub classes: Option<Vec<String>>,
    pub trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Check structural consistency so that prediction can never loop or
    /// index out of bounds.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("n_features must be positive".into());
        }
        if self.n_classes == 0 {
            return Err("n_classes must be positive".into());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        if let Some(classes) = &self.classes {
            if classes.len() != self.n_classes {
                return Err(format!(
                    "classes has {} entries, n_classes is {}",
                    classes.len(),
                    self.n_classes
                ));
            }
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {t} has no nodes"));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.n_features {
                            return Err(format!(
                                "tree {t} node {i}: feature {feature} >= n_features {}",
                                self.n_features
                            ));
                        }
                        if !threshold.is_finite() {
                            return Err(format!("tree {t} node {i}: non-finite threshold"));
                        }
                        // Children always come after their parent, which rules out cycles.
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(format!(
                                    "tree {t} node {i}: invalid child index {child}"
                                ));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.n_classes {
                            return Err(format!(
                                "tree {t} node {i}: leaf has {} weights, expected {}",
                                value.len(),
                                self.n_classes
                            ));
                        }
                        let total: f64 = value.iter().sum();
                        if !(total > 0.0) || value.iter().any(|w| *w < 0.0 || !w.is_finite()) {
                            return Err(format!("tree {t} node {i}: invalid leaf weights"));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn leaf_for<'a>(tree: &'a DecisionTree, features: &[f64]) -> Result<&'a [f64], PredictionError> {
        let mut idx = 0;
        // Bounded walk: a validated tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..tree.nodes.len() {
            match tree.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().ok_or_else(|| {
                        PredictionError::Model(format!("split on missing feature {feature}"))
                    })?;
                    idx = if x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PredictionError::Model(format!(
                        "node index {idx} out of bounds"
                    )))
                }
            }
        }
        Err(PredictionError::Model("tree traversal did not reach a leaf".into()))
    }

    /// Averaged class probabilities for one vector.
    ///
    /// # Errors
    /// Returns `PredictionError::ShapeMismatch` on wrong arity.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if features.len() != self.n_features {
            return Err(PredictionError::ShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = Self::leaf_for(tree, features)?;
            let total: f64 = leaf.iter().sum();
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        Ok(proba)
    }
}

impl Classifier for ForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<ModelOutput, PredictionError> {
        let proba = self.predict_proba(features)?;

        // First maximum wins, matching numpy's argmax.
        let (index, probability) = proba
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            });

        let class = match &self.classes {
            Some(classes) => ClassOutput::Label(classes[index].clone()),
            None => ClassOutput::Index(index),
        };

        Ok(ModelOutput {
            class,
            probability: Some(probability),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two stumps on feature 0 (BMI-like), three classes.
    fn forest(classes: Option<Vec<String>>) -> ForestClassifier {
        let stump = |threshold: f64, low: Vec<f64>, high: Vec<f64>| DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        };

        ForestClassifier {
            n_features: 2,
            n_classes: 3,
            classes,
            trees: vec![
                stump(25.0, vec![8.0, 2.0, 0.0], vec![0.0, 3.0, 7.0]),
                stump(30.0, vec![5.0, 5.0, 0.0], vec![0.0, 0.0, 10.0]),
            ],
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(forest(None).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut f = forest(None);
        f.trees[0].nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_leaf() {
        let mut f = forest(None);
        f.trees[1].nodes[1] = TreeNode::Leaf {
            value: vec![1.0, 1.0],
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_predict_proba_averages_trees() {
        let proba = forest(None).predict_proba(&[20.0, 0.0]).expect("proba");
        assert!((proba[0] - 0.65).abs() < 1e-12);
        assert!((proba[1] - 0.35).abs() < 1e-12);
        assert!(proba[2].abs() < 1e-12);
    }

    #[test]
    fn test_predict_index_and_label() {
        let out = forest(None).predict(&[40.0, 0.0]).expect("predict");
        assert_eq!(out.class, ClassOutput::Index(2));
        assert!((out.probability.unwrap_or_default() - 0.85).abs() < 1e-12);

        let labelled = forest(Some(vec!["low".into(), "mid".into(), "high".into()]));
        let out = labelled.predict(&[20.0, 0.0]).expect("predict");
        assert_eq!(out.class, ClassOutput::Label("low".into()));
    }

    #[test]
    fn test_threshold_goes_left() {
        let proba = forest(None).predict_proba(&[25.0, 0.0]).expect("proba");
        // Tree 1 takes the left branch at exactly its threshold.
        assert!(proba[0] > proba[2]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = forest(None).predict(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            PredictionError::ShapeMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_json_nodes_parse() {
        let json = r#"{
            "n_features": 1,
            "n_classes": 2,
            "trees": [{"nodes": [
                {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                {"value": [1.0, 0.0]},
                {"value": [0.0, 1.0]}
            ]}]
        }"#;
        let f: ForestClassifier = serde_json::from_str(json).expect("parse");
        assert!(f.validate().is_ok());
        assert!(f.classes.is_none());
        assert!(matches!(f.trees[0].nodes[1], TreeNode::Leaf { .. }));
    }
}
