//! Model hyperparameters persisted between chooser fits.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// A single named hyperparameter.
///
/// Arrays are stored as ordered numeric sequences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HyperValue {
    /// A scalar, e.g. an amplitude or noise level.
    Scalar(f64),
    /// A numeric array, e.g. per-dimension length scales.
    Array(Vec<f64>),
}

impl From<f64> for HyperValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for HyperValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Array(v)
    }
}

impl From<&DVector<f64>> for HyperValue {
    fn from(v: &DVector<f64>) -> Self {
        Self::Array(v.iter().copied().collect())
    }
}

impl HyperValue {
    /// Whether every number in the value is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_finite(),
            Self::Array(v) => v.iter().all(|x| x.is_finite()),
        }
    }

    /// Returns the value as a vector; scalars become length-one vectors.
    #[must_use]
    pub fn to_dvector(&self) -> DVector<f64> {
        match self {
            Self::Scalar(v) => DVector::from_element(1, *v),
            Self::Array(v) => DVector::from_column_slice(v),
        }
    }
}

/// Hyperparameters of one task, keyed by name.
pub type TaskHypers = BTreeMap<String, HyperValue>;

/// Hyperparameters for every task, keyed by task name.
///
/// The contents belong to the chooser; this type only carries them between
/// fits. An empty set means "fit from scratch".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperparameterSet(BTreeMap<String, TaskHypers>);

impl HyperparameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tasks with stored hyperparameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Hyperparameters stored for `task`.
    #[must_use]
    pub fn task(&self, task: &str) -> Option<&TaskHypers> {
        self.0.get(task)
    }

    /// A single hyperparameter of `task`.
    #[must_use]
    pub fn get(&self, task: &str, name: &str) -> Option<&HyperValue> {
        self.0.get(task).and_then(|hypers| hypers.get(name))
    }

    /// Sets one hyperparameter, returning the previous value.
    pub fn insert(
        &mut self,
        task: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<HyperValue>,
    ) -> Option<HyperValue> {
        self.0
            .entry(task.into())
            .or_default()
            .insert(name.into(), value.into())
    }

    /// Iterates over `(task, hyperparameters)` pairs in task-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskHypers)> {
        self.0.iter().map(|(task, hypers)| (task.as_str(), hypers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_serialize_as_sequences() {
        let mut hypers = HyperparameterSet::new();
        hypers.insert("main", "ls", &DVector::from_vec(vec![0.5, 2.0]));
        hypers.insert("main", "amp2", 1.25);

        let json = serde_json::to_string(&hypers).unwrap();
        assert_eq!(json, r#"{"main":{"amp2":1.25,"ls":[0.5,2.0]}}"#);

        let back: HyperparameterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hypers);
        assert_eq!(
            back.get("main", "ls").map(HyperValue::to_dvector),
            Some(DVector::from_vec(vec![0.5, 2.0]))
        );
    }

    #[test]
    fn insert_replaces_existing() {
        let mut hypers = HyperparameterSet::new();
        assert!(hypers.insert("main", "noise", 0.1).is_none());
        assert_eq!(
            hypers.insert("main", "noise", 0.2),
            Some(HyperValue::Scalar(0.1))
        );
        assert_eq!(hypers.len(), 1);
    }
}
