//! Tasks: the objectives and constraints tracked over one parameter space.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Likelihood tag given to tasks that do not name one.
pub const DEFAULT_LIKELIHOOD: &str = "GAUSSIAN";

/// The selected tasks handed to a chooser, keyed by task name.
pub type TaskOptions = BTreeMap<String, Task>;

/// Whether a task is optimized or only has to be satisfied.
///
/// Deserializes from `"OBJECTIVE"` or `"CONSTRAINT"` in any letter case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TaskKind {
    /// A quantity to optimize.
    #[default]
    #[serde(rename = "OBJECTIVE")]
    Objective,
    /// A quantity that must be satisfied.
    #[serde(rename = "CONSTRAINT")]
    Constraint,
}

impl<'de> Deserialize<'de> for TaskKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.to_ascii_uppercase().as_str() {
            "OBJECTIVE" => Ok(Self::Objective),
            "CONSTRAINT" => Ok(Self::Constraint),
            _ => Err(de::Error::unknown_variant(&name, &["OBJECTIVE", "CONSTRAINT"])),
        }
    }
}

/// A named objective or constraint.
///
/// The likelihood tag is advisory metadata for the chooser; it is carried
/// through unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    name: String,
    kind: TaskKind,
    likelihood: String,
}

impl Task {
    /// Creates a task.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TaskKind, likelihood: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            likelihood: likelihood.into(),
        }
    }

    /// Creates an objective task with the default likelihood.
    #[must_use]
    pub fn objective(name: impl Into<String>) -> Self {
        Self::new(name, TaskKind::Objective, DEFAULT_LIKELIHOOD)
    }

    /// The task's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Objective or constraint.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// The likelihood tag.
    #[must_use]
    pub fn likelihood(&self) -> &str {
        &self.likelihood
    }
}
