//! Jobs: individual trials and their lifecycle.

use crate::error::{Error, Result};
use crate::param::Params;

/// Lifecycle state of a job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JobStatus {
    /// Suggested but not yet evaluated.
    Pending,
    /// Evaluated, with its recorded outcome.
    ///
    /// The value may be non-finite for a failed evaluation.
    Complete {
        /// The recorded outcome.
        value: f64,
    },
}

/// A single trial.
///
/// A job starts out [`Pending`](JobStatus::Pending) and moves to
/// [`Complete`](JobStatus::Complete) at most once. Its identity is its
/// position in the stored job sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    /// The trial's parameter dictionary.
    pub params: Params,
    status: JobStatus,
}

impl Job {
    /// Creates a pending job.
    #[must_use]
    pub fn pending(params: Params) -> Self {
        Self {
            params,
            status: JobStatus::Pending,
        }
    }

    /// Creates a job that has already completed with `value`.
    #[must_use]
    pub fn completed(params: Params, value: f64) -> Self {
        Self {
            params,
            status: JobStatus::Complete { value },
        }
    }

    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == JobStatus::Pending
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.status, JobStatus::Complete { .. })
    }

    /// The recorded outcome, if the job is complete.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self.status {
            JobStatus::Pending => None,
            JobStatus::Complete { value } => Some(value),
        }
    }

    /// Records the outcome of a pending job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JobAlreadyComplete`] if the job has already completed.
    pub fn complete(&mut self, value: f64) -> Result<()> {
        if self.is_complete() {
            return Err(Error::JobAlreadyComplete);
        }
        self.status = JobStatus::Complete { value };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_exactly_once() {
        let mut job = Job::pending(Params::new());
        assert!(job.is_pending());
        assert_eq!(job.value(), None);

        job.complete(1.5).unwrap();
        assert_eq!(job.status(), JobStatus::Complete { value: 1.5 });
        assert!(matches!(job.complete(2.0), Err(Error::JobAlreadyComplete)));
        assert_eq!(job.value(), Some(1.5));
    }

    #[test]
    fn failed_evaluations_keep_their_value() {
        let mut job = Job::pending(Params::new());
        job.complete(f64::NAN).unwrap();
        assert!(job.is_complete());
        assert!(job.value().is_some_and(f64::is_nan));
    }
}
