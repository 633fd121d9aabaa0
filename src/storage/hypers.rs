//! JSON hyperparameter record.

use std::path::{Path, PathBuf};

use super::{HyperparameterCache, write_atomic};
use crate::error::{Error, Result};
use crate::hypers::HyperparameterSet;

/// A [`HyperparameterCache`] backed by a JSON document.
///
/// The document maps task name to hyperparameter name to a number or an
/// array of numbers:
///
/// ```json
/// {"main": {"amp2": 1.3, "ls": [0.4, 2.1]}}
/// ```
///
/// JSON has no representation for non-finite numbers, so a set holding one
/// is rejected by [`save`](HyperparameterCache::save) and the previous
/// record is kept.
#[derive(Clone, Debug)]
pub struct JsonHyperparameterCache {
    path: PathBuf,
}

impl JsonHyperparameterCache {
    /// Creates a cache for the record at `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HyperparameterCache for JsonHyperparameterCache {
    fn try_load(&self) -> Result<Option<HyperparameterSet>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Storage(format!("{}: {e}", self.path.display()))),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| Error::Storage(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, hypers: &HyperparameterSet) -> Result<()> {
        for (task, values) in hypers.iter() {
            if let Some((name, _)) = values.iter().find(|(_, value)| !value.is_finite()) {
                return Err(Error::Storage(format!(
                    "{}: hyperparameter '{name}' of task '{task}' is not finite",
                    self.path.display()
                )));
            }
        }
        let json =
            serde_json::to_vec_pretty(hypers).map_err(|e| Error::Storage(e.to_string()))?;
        write_atomic(&self.path, &json)?;
        trace_debug!(tasks = hypers.len(), path = %self.path.display(), "saved hyperparameters");
        Ok(())
    }
}
