//! Typed experiment configuration.
//!
//! The configuration document is validated once, here, into the
//! [`ParameterSpace`] and [`TaskOptions`] the rest of the crate works with.
//!
//! ```
//! use sequential_design::ExperimentConfig;
//!
//! let config = ExperimentConfig::from_json_str(
//!     r#"{
//!         "experiment-name": "branin",
//!         "variables": {
//!             "x": {"type": "FLOAT", "size": 1, "min": -5, "max": 10},
//!             "y": {"type": "INT", "min": 0, "max": 15}
//!         }
//!     }"#,
//! )
//! .unwrap();
//!
//! let space = config.parameter_space().unwrap();
//! assert_eq!(space.names().collect::<Vec<_>>(), ["x", "y"]);
//! assert!(config.task_options().unwrap().contains_key("main"));
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::space::{ParameterSpace, Variable};
use crate::task::{DEFAULT_LIKELIHOOD, Task, TaskKind, TaskOptions};

/// File name of the configuration document inside an experiment directory.
pub const CONFIG_FILE: &str = "config.json";

/// File name of the advisory lock inside an experiment directory.
pub const LOCK_FILE: &str = "experiment.lock";

/// Name of the task used when the configuration declares none.
pub const DEFAULT_TASK: &str = "main";

fn default_experiment_name() -> String {
    "unnamed-experiment".into()
}

fn default_chooser() -> String {
    "random".into()
}

fn default_likelihood() -> String {
    DEFAULT_LIKELIHOOD.into()
}

fn default_jobs_file() -> String {
    "jobs.txt".into()
}

fn default_hypers_file() -> String {
    "hypers.json".into()
}

fn default_size() -> usize {
    1
}

/// Top-level experiment configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ExperimentConfig {
    #[serde(default = "default_experiment_name")]
    pub experiment_name: String,
    /// Which chooser to build, see [`build_chooser`](crate::chooser::build_chooser).
    #[serde(default = "default_chooser")]
    pub chooser: String,
    /// Likelihood of the default task.
    #[serde(default = "default_likelihood")]
    pub likelihood: String,
    /// Declared tasks. `None` means a single objective named [`DEFAULT_TASK`].
    #[serde(default)]
    pub tasks: Option<BTreeMap<String, TaskConfig>>,
    /// Declared variables, in vector order.
    pub variables: VariablesConfig,
    /// Seed for choosers that draw random numbers.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Job record file name, relative to the experiment directory.
    #[serde(default = "default_jobs_file")]
    pub jobs_file: String,
    /// Hyperparameter record file name, relative to the experiment directory.
    #[serde(default = "default_hypers_file")]
    pub hypers_file: String,
}

/// One entry of the `tasks` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    #[serde(rename = "type", default)]
    pub kind: TaskKind,
    /// Falls back to the top-level `likelihood` when absent.
    #[serde(default)]
    pub likelihood: Option<String>,
}

/// Value kind of a declared variable.
///
/// Deserializes from `"FLOAT"`, `"INT"` (or `"INTEGER"`) and `"ENUM"` in
/// any letter case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableType {
    Float,
    Int,
    Enum,
}

impl<'de> Deserialize<'de> for VariableType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.to_ascii_uppercase().as_str() {
            "FLOAT" => Ok(Self::Float),
            "INT" | "INTEGER" => Ok(Self::Int),
            "ENUM" => Ok(Self::Enum),
            _ => Err(de::Error::unknown_variant(&name, &["FLOAT", "INT", "ENUM"])),
        }
    }
}

/// One entry of the `variables` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableConfig {
    #[serde(rename = "type")]
    pub kind: VariableType,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Only scalar variables are supported, so this must be 1.
    #[serde(default = "default_size")]
    pub size: usize,
}

impl VariableConfig {
    /// Validates this entry into a [`Variable`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if fields are missing, contradictory, or
    /// out of range for the variable type.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn to_variable(&self, name: &str) -> Result<Variable> {
        let invalid = |reason: &str| Error::Config(format!("variable '{name}': {reason}"));
        if self.size != 1 {
            return Err(invalid("only size 1 is supported"));
        }
        match self.kind {
            VariableType::Float | VariableType::Int => {
                if self.options.is_some() {
                    return Err(invalid("'options' is only valid for ENUM variables"));
                }
                let (Some(min), Some(max)) = (self.min, self.max) else {
                    return Err(invalid("'min' and 'max' are required"));
                };
                if self.kind == VariableType::Float {
                    return Variable::float(name, min, max);
                }
                let integral =
                    |v: f64| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64;
                if !integral(min) || !integral(max) {
                    return Err(invalid("INT bounds must be integers"));
                }
                Variable::int(name, min as i64, max as i64)
            }
            VariableType::Enum => {
                if self.min.is_some() || self.max.is_some() {
                    return Err(invalid("'min'/'max' are not valid for ENUM variables"));
                }
                let Some(options) = &self.options else {
                    return Err(invalid("'options' is required"));
                };
                Variable::categorical(name, options.iter().cloned())
            }
        }
    }
}

/// The `variables` section, keeping document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariablesConfig(Vec<(String, VariableConfig)>);

impl VariablesConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable at the next vector position.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, config: VariableConfig) -> Self {
        self.0.push((name.into(), config));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableConfig)> {
        self.0.iter().map(|(name, config)| (name.as_str(), config))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for VariablesConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = VariablesConfig;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of variable definitions")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> core::result::Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, VariableConfig)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, config)) = map.next_entry::<String, VariableConfig>()? {
                    if entries.iter().any(|(seen, _)| *seen == name) {
                        return Err(de::Error::custom(format!("duplicate variable '{name}'")));
                    }
                    entries.push((name, config));
                }
                Ok(VariablesConfig(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

impl ExperimentConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is not valid JSON or does
    /// not match the configuration schema.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Reads [`CONFIG_FILE`] from an experiment directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_path(dir.as_ref().join(CONFIG_FILE))
    }

    /// Builds the parameter space from the `variables` section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any variable is invalid or none is declared.
    pub fn parameter_space(&self) -> Result<ParameterSpace> {
        let variables = self
            .variables
            .iter()
            .map(|(name, config)| config.to_variable(name))
            .collect::<Result<Vec<_>>>()?;
        ParameterSpace::new(variables)
    }

    /// All declared tasks, with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the `tasks` section is present but empty.
    pub fn task_options(&self) -> Result<TaskOptions> {
        let Some(tasks) = &self.tasks else {
            return Ok(TaskOptions::from([(
                DEFAULT_TASK.to_string(),
                Task::new(DEFAULT_TASK, TaskKind::Objective, self.likelihood.clone()),
            )]));
        };
        if tasks.is_empty() {
            return Err(Error::Config("'tasks' must declare at least one task".into()));
        }
        Ok(tasks
            .iter()
            .map(|(name, task)| {
                let likelihood = task.likelihood.as_ref().unwrap_or(&self.likelihood);
                (name.clone(), Task::new(name.clone(), task.kind, likelihood.clone()))
            })
            .collect())
    }

    /// The declared tasks named in `names`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `names` is empty and
    /// [`Error::UnknownTask`] if a name is not declared.
    pub fn task_subset(&self, names: &[&str]) -> Result<TaskOptions> {
        if names.is_empty() {
            return Err(Error::Config(
                "cannot obtain a suggestion for zero tasks".into(),
            ));
        }
        let all = self.task_options()?;
        names
            .iter()
            .map(|&name| {
                all.get(name)
                    .map(|task| (name.to_string(), task.clone()))
                    .ok_or_else(|| Error::UnknownTask(name.to_string()))
            })
            .collect()
    }

    /// Path of the job record inside `dir`.
    #[must_use]
    pub fn jobs_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.jobs_file)
    }

    /// Path of the hyperparameter record inside `dir`.
    #[must_use]
    pub fn hypers_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.hypers_file)
    }
}
