use parking_lot::RwLock;

use super::{HyperparameterCache, JobLog, JobStore};
use crate::error::Result;
use crate::hypers::HyperparameterSet;
use crate::job::Job;
use crate::space::ParameterSpace;

/// In-memory job and hyperparameter storage.
///
/// Implements both [`JobStore`] and [`HyperparameterCache`], so one value
/// can back an orchestrator in tests or when embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    jobs: RwLock<Vec<Job>>,
    hypers: RwLock<Option<HyperparameterSet>>,
}

impl MemoryStorage {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store pre-populated with `jobs`.
    #[must_use]
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: RwLock::new(jobs),
            hypers: RwLock::new(None),
        }
    }

    /// A snapshot of the stored jobs.
    #[must_use]
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.read().clone()
    }

    /// A snapshot of the stored hyperparameters, if any were saved.
    #[must_use]
    pub fn hypers(&self) -> Option<HyperparameterSet> {
        self.hypers.read().clone()
    }
}

impl JobStore for MemoryStorage {
    fn load(&self, _space: &ParameterSpace) -> Result<JobLog> {
        Ok(JobLog {
            jobs: self.jobs(),
            skipped: Vec::new(),
        })
    }

    fn save(&self, space: &ParameterSpace, jobs: &[Job]) -> Result<()> {
        for job in jobs {
            space.vectorify(&job.params)?;
        }
        *self.jobs.write() = jobs.to_vec();
        Ok(())
    }
}

impl HyperparameterCache for MemoryStorage {
    fn try_load(&self) -> Result<Option<HyperparameterSet>> {
        Ok(self.hypers())
    }

    fn save(&self, hypers: &HyperparameterSet) -> Result<()> {
        *self.hypers.write() = Some(hypers.clone());
        Ok(())
    }
}
