//! One iteration of the suggestion loop.
//!
//! [`SuggestionOrchestrator::suggest`] runs, in order: load jobs → load
//! hyperparameters → fit the chooser → save hyperparameters → ask for a
//! suggestion → append a pending job → save jobs. Nothing is retried. A
//! failure aborts the request, and steps already persisted (a hyperparameter
//! save) are not rolled back.
//!
//! Jobs are saved with [`JobStore::save_log`], so record lines the store
//! could not decode are written back where they were instead of dropped.

use std::path::{Path, PathBuf};

use crate::chooser::Chooser;
use crate::config::{ExperimentConfig, LOCK_FILE};
use crate::error::{Error, Result};
use crate::job::Job;
use crate::param::Params;
use crate::space::ParameterSpace;
use crate::storage::{
    ExperimentLock, HyperparameterCache, JobLog, JobStore, JsonHyperparameterCache, TextJobStore,
};
use crate::task::TaskOptions;
use crate::task_group::TaskGroup;

/// The outcome of one suggestion request.
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    /// The suggested configuration, as recorded in the new pending job.
    pub params: Params,
    /// The recorded job's vector. Integer and categorical slots hold the
    /// rounded values, not the chooser's raw output.
    pub vector: Vec<f64>,
    /// Position of the new pending job in the job sequence.
    pub job_index: usize,
}

/// Composes a job store, a hyperparameter cache and a chooser into the
/// suggestion loop.
///
/// # Examples
///
/// ```
/// use sequential_design::chooser::RandomChooser;
/// use sequential_design::storage::MemoryStorage;
/// use sequential_design::{ExperimentConfig, SuggestionOrchestrator};
///
/// let config = ExperimentConfig::from_json_str(
///     r#"{"variables": {"x": {"type": "FLOAT", "min": 0, "max": 1}}}"#,
/// )
/// .unwrap();
/// let orchestrator =
///     SuggestionOrchestrator::new(config, MemoryStorage::new(), MemoryStorage::new()).unwrap();
///
/// let mut chooser = RandomChooser::with_seed(1);
/// let suggestion = orchestrator.suggest(&mut chooser, &["main"]).unwrap();
/// assert_eq!(suggestion.job_index, 0);
/// ```
pub struct SuggestionOrchestrator<J, H> {
    config: ExperimentConfig,
    space: ParameterSpace,
    jobs: J,
    hypers: H,
    lock_path: Option<PathBuf>,
}

impl SuggestionOrchestrator<TextJobStore, JsonHyperparameterCache> {
    /// Creates an orchestrator over the record files of an experiment directory.
    ///
    /// Requests hold an [`ExperimentLock`] on the directory's lock file for
    /// the whole load→save sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn for_directory(config: ExperimentConfig, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let jobs = TextJobStore::new(config.jobs_path(dir));
        let hypers = JsonHyperparameterCache::new(config.hypers_path(dir));
        Ok(Self::new(config, jobs, hypers)?.with_lock(dir.join(LOCK_FILE)))
    }
}

impl<J: JobStore, H: HyperparameterCache> SuggestionOrchestrator<J, H> {
    /// Creates an orchestrator, validating the configuration's variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable section is invalid.
    pub fn new(config: ExperimentConfig, jobs: J, hypers: H) -> Result<Self> {
        let space = config.parameter_space()?;
        Ok(Self {
            config,
            space,
            jobs,
            hypers,
            lock_path: None,
        })
    }

    /// Holds an [`ExperimentLock`] at `path` during every request.
    #[must_use]
    pub fn with_lock(mut self, path: impl AsRef<Path>) -> Self {
        self.lock_path = Some(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    #[must_use]
    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    #[must_use]
    pub fn job_store(&self) -> &J {
        &self.jobs
    }

    #[must_use]
    pub fn hyperparameter_cache(&self) -> &H {
        &self.hypers
    }

    fn lock(&self) -> Result<Option<ExperimentLock>> {
        self.lock_path.as_ref().map(ExperimentLock::acquire).transpose()
    }

    /// Builds the task group for `task_names` and fills it from the stored jobs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty `task_names`,
    /// [`Error::UnknownTask`] for an undeclared name, and storage or schema
    /// errors from loading.
    pub fn load_task_group(&self, task_names: &[&str]) -> Result<TaskGroup> {
        let _lock = self.lock()?;
        self.load_task_group_unlocked(task_names)
            .map(|(_, group, _)| group)
    }

    fn load_task_group_unlocked(
        &self,
        task_names: &[&str],
    ) -> Result<(TaskOptions, TaskGroup, JobLog)> {
        let task_options = self.config.task_subset(task_names)?;
        let mut group = TaskGroup::new(&task_options, self.space.clone())?;
        let log = self.jobs.load(&self.space)?;
        group.populate(&log.jobs)?;
        group.add_nan_task_if_nans();
        trace_info!(
            complete = group.num_complete(),
            pending = group.num_pending(),
            skipped = log.skipped.len(),
            "loaded job history"
        );
        Ok((task_options, group, log))
    }

    /// Runs one suggestion request and records the suggestion as a pending job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty `task_names`,
    /// [`Error::UnknownTask`] for an undeclared task, [`Error::Schema`] if
    /// the chooser's vector does not fit the space, [`Error::Storage`] on
    /// I/O failure, and any error the chooser returns.
    pub fn suggest(&self, chooser: &mut dyn Chooser, task_names: &[&str]) -> Result<Suggestion> {
        if task_names.is_empty() {
            return Err(Error::Config(
                "cannot obtain a suggestion for zero tasks".into(),
            ));
        }
        let _lock = self.lock()?;

        let (task_options, group, mut log) = self.load_task_group_unlocked(task_names)?;

        let hypers = self.hypers.load();
        let hypers = chooser.fit(&group, hypers, &task_options)?;
        if !hypers.is_empty() {
            self.hypers.save(&hypers)?;
        }

        let params = group.paramify(&chooser.suggest()?)?;
        let vector = group.vectorify(&params)?;

        let job_index = log.jobs.len();
        log.jobs.push(Job::pending(params.clone()));
        self.jobs.save_log(&self.space, &log)?;
        trace_info!(
            job_index,
            experiment = %self.config.experiment_name,
            "recorded suggestion"
        );

        Ok(Suggestion {
            params,
            vector,
            job_index,
        })
    }

    /// Records the outcome of the pending job at `index`.
    ///
    /// This is the evaluation side of the loop: it loads the sequence,
    /// completes one job and saves the sequence under the same lock as
    /// [`suggest`](Self::suggest).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownJob`] if there is no job at `index`,
    /// [`Error::JobAlreadyComplete`] if it already has a value, and storage
    /// errors from loading or saving.
    pub fn complete_job(&self, index: usize, value: f64) -> Result<()> {
        let _lock = self.lock()?;
        let mut log = self.jobs.load(&self.space)?;
        log.jobs
            .get_mut(index)
            .ok_or(Error::UnknownJob(index))?
            .complete(value)?;
        self.jobs.save_log(&self.space, &log)?;
        trace_info!(job_index = index, value, "recorded job outcome");
        Ok(())
    }
}
