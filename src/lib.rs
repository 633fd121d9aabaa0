#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Task and trial state management for a sequential experiment-design loop.
//!
//! Each iteration of the loop asks a pluggable [`Chooser`] for the next
//! configuration to evaluate, given every trial evaluated so far and every
//! trial still pending, and durably records that configuration as a new
//! pending trial. This crate owns the parts every chooser, every storage
//! backend and every restart must agree on: the ordered parameter space, the
//! dictionary↔vector conversion, the job lifecycle and the record formats.
//!
//! # Getting Started
//!
//! ```no_run
//! use sequential_design::prelude::*;
//!
//! let dir = "experiments/branin";
//! let config = ExperimentConfig::from_directory(dir)?;
//! let mut chooser = build_chooser(&config)?;
//!
//! let orchestrator = SuggestionOrchestrator::for_directory(config, dir)?;
//! let suggestion = orchestrator.suggest(&mut chooser, &["main"])?;
//! println!("evaluate job {}: {:?}", suggestion.job_index, suggestion.params);
//!
//! // ... later, once the evaluation finished:
//! orchestrator.complete_job(suggestion.job_index, 0.397)?;
//! # Ok::<(), Error>(())
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`ParameterSpace`] | Ordered variables; [`vectorify`](ParameterSpace::vectorify) and [`paramify`](ParameterSpace::paramify) convert between parameter dictionaries and vectors. |
//! | [`TaskGroup`] | A parameter space, its tasks, and the completed/pending observation matrices rebuilt from the job history. |
//! | [`Job`] | A single trial, pending or complete. |
//! | [`JobStore`](storage::JobStore) | Loads and saves the ordered job sequence. |
//! | [`HyperparameterCache`](storage::HyperparameterCache) | Loads and saves the chooser's hyperparameters for warm starts. |
//! | [`SuggestionOrchestrator`] | Runs one load → fit → suggest → save iteration. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) when records are loaded, lines are skipped, and suggestions are recorded | on |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod chooser;
pub mod config;
mod distribution;
mod error;
mod hypers;
mod job;
mod orchestrator;
mod param;
mod space;
pub mod storage;
mod task;
mod task_group;

pub use chooser::Chooser;
pub use config::ExperimentConfig;
pub use distribution::{
    CategoricalDistribution, Distribution, FloatDistribution, IntDistribution,
};
pub use error::{Error, Result, SchemaViolation};
pub use hypers::{HyperValue, HyperparameterSet, TaskHypers};
pub use job::{Job, JobStatus};
pub use orchestrator::{Suggestion, SuggestionOrchestrator};
pub use param::{ParamValue, Params};
pub use space::{ParameterSpace, Variable};
pub use task::{DEFAULT_LIKELIHOOD, Task, TaskKind, TaskOptions};
pub use task_group::{NAN_TASK, NAN_TASK_LIKELIHOOD, TaskGroup};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use sequential_design::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chooser::{Chooser, RandomChooser, build_chooser};
    pub use crate::config::ExperimentConfig;
    pub use crate::error::{Error, Result};
    pub use crate::hypers::{HyperValue, HyperparameterSet};
    pub use crate::job::{Job, JobStatus};
    pub use crate::orchestrator::{Suggestion, SuggestionOrchestrator};
    pub use crate::param::{ParamValue, Params};
    pub use crate::space::{ParameterSpace, Variable};
    pub use crate::storage::{
        ExperimentLock, HyperparameterCache, JobStore, JsonHyperparameterCache, MemoryStorage,
        TextJobStore,
    };
    pub use crate::task::{Task, TaskKind, TaskOptions};
    pub use crate::task_group::TaskGroup;
}
