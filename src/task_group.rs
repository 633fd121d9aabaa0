//! The task group: a parameter space, its tasks, and the observation
//! matrices rebuilt from the job history.
//!
//! Observations are derived state. [`TaskGroup::populate`] rebuilds them
//! from a job list and nothing else mutates them, so row `i` of a task's
//! inputs and element `i` of its values always describe the same trial.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::job::{Job, JobStatus};
use crate::param::Params;
use crate::space::ParameterSpace;
use crate::task::{Task, TaskKind, TaskOptions};

/// Name of the auxiliary task introduced by
/// [`add_nan_task_if_nans`](TaskGroup::add_nan_task_if_nans).
pub const NAN_TASK: &str = "NaN";

/// Likelihood tag of the auxiliary validity task.
pub const NAN_TASK_LIKELIHOOD: &str = "BINOMIAL";

/// Rows and values observed for one task, positionally aligned.
#[derive(Clone, Debug, PartialEq)]
struct TaskData {
    inputs: DMatrix<f64>,
    values: DVector<f64>,
}

impl TaskData {
    fn empty(dims: usize) -> Self {
        Self {
            inputs: DMatrix::zeros(0, dims),
            values: DVector::zeros(0),
        }
    }

    fn select(&self, rows: &[usize]) -> Self {
        Self {
            inputs: DMatrix::from_fn(rows.len(), self.inputs.ncols(), |r, c| {
                self.inputs[(rows[r], c)]
            }),
            values: DVector::from_fn(rows.len(), |r, _| self.values[rows[r]]),
        }
    }
}

/// A parameter space bound to one or more tasks, plus their observations.
///
/// # Example
///
/// ```
/// use sequential_design::{Job, ParameterSpace, Task, TaskGroup, TaskOptions, Variable};
///
/// let space = ParameterSpace::new(vec![Variable::float("x", 0.0, 1.0).unwrap()]).unwrap();
/// let tasks = TaskOptions::from([("main".to_string(), Task::objective("main"))]);
/// let mut group = TaskGroup::new(&tasks, space).unwrap();
///
/// let done = Job::completed(group.paramify(&[0.25]).unwrap(), 3.0);
/// let waiting = Job::pending(group.paramify(&[0.75]).unwrap());
/// group.populate(&[done, waiting]).unwrap();
///
/// assert_eq!(group.num_complete(), 1);
/// assert_eq!(group.num_pending(), 1);
/// assert_eq!(group.values("main").unwrap().as_slice(), &[3.0]);
/// ```
#[derive(Clone, Debug)]
pub struct TaskGroup {
    space: ParameterSpace,
    tasks: TaskOptions,
    inputs: DMatrix<f64>,
    pending: DMatrix<f64>,
    data: BTreeMap<String, TaskData>,
    nan_task: bool,
}

impl TaskGroup {
    /// Creates a task group with no observations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `tasks` is empty or declares a task named
    /// [`NAN_TASK`], which is reserved.
    pub fn new(tasks: &TaskOptions, space: ParameterSpace) -> Result<Self> {
        if tasks.is_empty() {
            return Err(Error::Config("a task group needs at least one task".into()));
        }
        if tasks.contains_key(NAN_TASK) {
            return Err(Error::Config(format!("task name '{NAN_TASK}' is reserved")));
        }
        let dims = space.len();
        Ok(Self {
            data: tasks
                .keys()
                .map(|name| (name.clone(), TaskData::empty(dims)))
                .collect(),
            tasks: tasks.clone(),
            inputs: DMatrix::zeros(0, dims),
            pending: DMatrix::zeros(0, dims),
            space,
            nan_task: false,
        })
    }

    #[must_use]
    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    /// Vector length, i.e. the number of declared variables.
    #[must_use]
    pub fn num_dims(&self) -> usize {
        self.space.len()
    }

    /// All tasks, including the auxiliary validity task once added.
    #[must_use]
    pub fn tasks(&self) -> &TaskOptions {
        &self.tasks
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Looks up a task by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if the group has no such task.
    pub fn task(&self, name: &str) -> Result<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| Error::UnknownTask(name.to_string()))
    }

    /// Whether [`add_nan_task_if_nans`](Self::add_nan_task_if_nans) introduced
    /// the validity task.
    #[must_use]
    pub fn has_nan_task(&self) -> bool {
        self.nan_task
    }

    /// Completed trial vectors, one row per completed job (N × D).
    #[must_use]
    pub fn inputs(&self) -> &DMatrix<f64> {
        &self.inputs
    }

    /// Pending trial vectors (M × D).
    #[must_use]
    pub fn pending(&self) -> &DMatrix<f64> {
        &self.pending
    }

    #[must_use]
    pub fn num_complete(&self) -> usize {
        self.inputs.nrows()
    }

    #[must_use]
    pub fn num_pending(&self) -> usize {
        self.pending.nrows()
    }

    /// Recorded outcomes of `task`, aligned with [`task_inputs`](Self::task_inputs).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if the group has no such task.
    pub fn values(&self, task: &str) -> Result<&DVector<f64>> {
        self.task_data(task).map(|d| &d.values)
    }

    /// The input rows that `values(task)` refers to.
    ///
    /// Equal to [`inputs`](Self::inputs) unless non-finite outcomes were
    /// split off by [`add_nan_task_if_nans`](Self::add_nan_task_if_nans).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if the group has no such task.
    pub fn task_inputs(&self, task: &str) -> Result<&DMatrix<f64>> {
        self.task_data(task).map(|d| &d.inputs)
    }

    fn task_data(&self, task: &str) -> Result<&TaskData> {
        self.data
            .get(task)
            .ok_or_else(|| Error::UnknownTask(task.to_string()))
    }

    /// Rebuilds all observations from `jobs`.
    ///
    /// Each job records a single outcome, which is attributed to every task
    /// in the group. Any previously added validity task is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a job's parameters do not fit the space.
    /// The group is left unchanged in that case.
    pub fn populate(&mut self, jobs: &[Job]) -> Result<()> {
        let dims = self.space.len();
        let mut complete: Vec<Vec<f64>> = Vec::new();
        let mut values: Vec<f64> = Vec::new();
        let mut pending: Vec<Vec<f64>> = Vec::new();
        for job in jobs {
            let row = self.space.vectorify(&job.params)?;
            match job.status() {
                JobStatus::Pending => pending.push(row),
                JobStatus::Complete { value } => {
                    complete.push(row);
                    values.push(value);
                }
            }
        }

        if self.nan_task {
            self.tasks.remove(NAN_TASK);
            self.data.remove(NAN_TASK);
            self.nan_task = false;
        }

        self.inputs = DMatrix::from_fn(complete.len(), dims, |r, c| complete[r][c]);
        self.pending = DMatrix::from_fn(pending.len(), dims, |r, c| pending[r][c]);
        let observed = TaskData {
            inputs: self.inputs.clone(),
            values: DVector::from_vec(values),
        };
        for data in self.data.values_mut() {
            data.clone_from(&observed);
        }
        Ok(())
    }

    /// Splits failed evaluations into an auxiliary validity task.
    ///
    /// If any completed trial has a non-finite outcome, every task's
    /// observations are reduced to the trials with finite outcomes, and a
    /// [`NAN_TASK`] constraint is added whose inputs are *all* completed
    /// trials and whose values are `1.0` for a finite outcome and `0.0` for a
    /// failed one. Failed trials therefore leave the primary tasks but are
    /// kept as failures in the validity task.
    ///
    /// Returns `true` if the validity task was added by this call.
    pub fn add_nan_task_if_nans(&mut self) -> bool {
        if self.nan_task {
            return false;
        }
        let n = self.inputs.nrows();
        let valid: Vec<bool> = (0..n)
            .map(|i| self.data.values().all(|d| d.values[i].is_finite()))
            .collect();
        if valid.iter().all(|&v| v) {
            return false;
        }

        let keep: Vec<usize> = (0..n).filter(|&i| valid[i]).collect();
        for data in self.data.values_mut() {
            *data = data.select(&keep);
        }

        self.tasks.insert(
            NAN_TASK.to_string(),
            Task::new(NAN_TASK, TaskKind::Constraint, NAN_TASK_LIKELIHOOD),
        );
        self.data.insert(
            NAN_TASK.to_string(),
            TaskData {
                inputs: self.inputs.clone(),
                values: DVector::from_fn(n, |i, _| if valid[i] { 1.0 } else { 0.0 }),
            },
        );
        self.nan_task = true;
        trace_info!(
            failed = n - keep.len(),
            complete = n,
            "added validity task for non-finite outcomes"
        );
        true
    }

    /// See [`ParameterSpace::vectorify`].
    ///
    /// The conversion depends only on the space, so no task name is checked
    /// here. Undeclared task names raise [`Error::UnknownTask`] where they
    /// are looked up: in
    /// [`ExperimentConfig::task_subset`](crate::ExperimentConfig::task_subset)
    /// and in per-task accessors such as [`values`](Self::values).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `params` does not fit the space.
    pub fn vectorify(&self, params: &Params) -> Result<Vec<f64>> {
        self.space.vectorify(params)
    }

    /// See [`ParameterSpace::paramify`].
    ///
    /// As with [`vectorify`](Self::vectorify), no task name is checked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `vector` does not fit the space.
    pub fn paramify(&self, vector: &[f64]) -> Result<Params> {
        self.space.paramify(vector)
    }
}
