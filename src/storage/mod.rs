//! Job and hyperparameter storage backends.
//!
//! The [`JobStore`] trait persists the ordered job sequence; the
//! [`HyperparameterCache`] trait persists the chooser's hyperparameters.
//! Both take their location at construction, never from a fixed path.
//!
//! # Available backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryStorage`] | Jobs and hyperparameters behind read-write locks; implements both traits |
//! | [`TextJobStore`] | Line-oriented job record, one whitespace-separated line per job |
//! | [`JsonHyperparameterCache`] | JSON hyperparameter record |
//!
//! File backends replace their record atomically (temp file + rename) on
//! every save. They do not coordinate concurrent writers themselves; hold an
//! [`ExperimentLock`] across the whole load→save sequence for that, as
//! [`SuggestionOrchestrator`](crate::SuggestionOrchestrator) does.

mod hypers;
mod lock;
mod memory;
mod text;

use std::fs::File;
use std::io::Write;
use std::path::Path;

pub use hypers::JsonHyperparameterCache;
pub use lock::ExperimentLock;
pub use memory::MemoryStorage;
pub use text::{COMPLETE_FLAG, PENDING_MARKER, TextJobStore};

use crate::error::{Error, Result};
use crate::hypers::HyperparameterSet;
use crate::job::Job;
use crate::space::ParameterSpace;

/// A record line that could not be decoded and was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the record.
    pub line_number: usize,
    /// Why the line was rejected.
    pub reason: String,
    /// The line as it appears in the record.
    pub raw: String,
    /// Number of decoded jobs that precede this line.
    pub job_position: usize,
}

/// Result of loading a job record.
///
/// Write it back with [`JobStore::save_log`] so skipped lines survive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobLog {
    /// Decoded jobs, in record order.
    pub jobs: Vec<Job>,
    /// Lines that were skipped. Reading continues past them.
    pub skipped: Vec<MalformedLine>,
}

/// Trait for loading and saving the job sequence.
///
/// Job identity is positional: backends never reorder or drop jobs
/// from what they were given.
pub trait JobStore: Send + Sync {
    /// Loads the job sequence.
    ///
    /// An absent record is an empty history, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the record exists but cannot be read.
    fn load(&self, space: &ParameterSpace) -> Result<JobLog>;

    /// Replaces the stored sequence with `jobs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a job does not fit `space` (nothing is
    /// written in that case) and [`Error::Storage`] on write failure.
    fn save(&self, space: &ParameterSpace, jobs: &[Job]) -> Result<()>;

    /// Replaces the stored sequence with `log.jobs`, keeping every skipped
    /// line of `log` at its original position among the jobs.
    ///
    /// Skipped lines do not count towards job positions, so
    /// `log.jobs[i]` is still job `i` on the next load.
    ///
    /// The default implementation is for backends whose loads never skip
    /// anything and ignores `log.skipped`.
    ///
    /// # Errors
    ///
    /// Same as [`save`](Self::save).
    fn save_log(&self, space: &ParameterSpace, log: &JobLog) -> Result<()> {
        self.save(space, &log.jobs)
    }
}

/// Trait for persisting chooser hyperparameters between fits.
pub trait HyperparameterCache: Send + Sync {
    /// Loads the stored set, distinguishing "absent" (`Ok(None)`) from
    /// "present but unreadable" (`Err`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the record exists but cannot be read
    /// or parsed.
    fn try_load(&self) -> Result<Option<HyperparameterSet>>;

    /// Replaces the stored set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] on write failure.
    fn save(&self, hypers: &HyperparameterSet) -> Result<()>;

    /// Loads the stored set, falling back to an empty set on any failure.
    ///
    /// Unreadable records are logged and treated as absent.
    fn load(&self) -> HyperparameterSet {
        match self.try_load() {
            Ok(hypers) => hypers.unwrap_or_default(),
            Err(error) => {
                trace_warn!(%error, "ignoring unreadable hyperparameter record");
                HyperparameterSet::new()
            }
        }
    }
}

/// Writes `contents` to a temp file next to `path`, then renames it over `path`.
///
/// A crash mid-write leaves the previous record intact.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let storage_err = |e: std::io::Error| Error::Storage(format!("{}: {e}", path.display()));
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let mut file = File::create(&tmp_path).map_err(storage_err)?;
    file.write_all(contents).map_err(storage_err)?;
    file.sync_all().map_err(storage_err)?;
    drop(file);
    std::fs::rename(&tmp_path, path).map_err(storage_err)
}
