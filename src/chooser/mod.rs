//! Chooser trait and built-in implementations.
//!
//! A chooser fits a model to the observations held by a [`TaskGroup`] and
//! proposes the next vector to evaluate. The model itself is opaque to this
//! crate; only the hyperparameters it returns from
//! [`fit`](Chooser::fit) are persisted.

pub mod random;

pub use random::RandomChooser;

use crate::config::ExperimentConfig;
use crate::error::{Error, Result};
use crate::hypers::HyperparameterSet;
use crate::task::TaskOptions;
use crate::task_group::TaskGroup;

/// Trait for pluggable suggestion strategies.
///
/// [`fit`](Chooser::fit) is always called before [`suggest`](Chooser::suggest)
/// within one suggestion request.
pub trait Chooser {
    /// Fits the chooser to the current observations.
    ///
    /// # Arguments
    ///
    /// * `task_group` - Completed and pending observations over the parameter space.
    /// * `hypers` - Hyperparameters from the previous fit; empty means "fit from scratch".
    /// * `task_options` - The tasks selected for this request.
    ///
    /// Returns the hyperparameters to persist for the next fit.
    ///
    /// # Errors
    ///
    /// Returns an error if the chooser cannot be fitted to the data.
    fn fit(
        &mut self,
        task_group: &TaskGroup,
        hypers: HyperparameterSet,
        task_options: &TaskOptions,
    ) -> Result<HyperparameterSet>;

    /// Proposes the next vector to evaluate.
    ///
    /// The vector must have one slot per declared variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the chooser has not been fitted or cannot
    /// produce a candidate.
    fn suggest(&mut self) -> Result<Vec<f64>>;
}

impl<C: Chooser + ?Sized> Chooser for Box<C> {
    fn fit(
        &mut self,
        task_group: &TaskGroup,
        hypers: HyperparameterSet,
        task_options: &TaskOptions,
    ) -> Result<HyperparameterSet> {
        (**self).fit(task_group, hypers, task_options)
    }

    fn suggest(&mut self) -> Result<Vec<f64>> {
        (**self).suggest()
    }
}

/// Builds the chooser named by `config.chooser`.
///
/// | Name | Chooser |
/// |------|---------|
/// | `random` | [`RandomChooser`], seeded from `config.seed` when set |
///
/// # Errors
///
/// Returns [`Error::Config`] for an unknown chooser name.
pub fn build_chooser(config: &ExperimentConfig) -> Result<Box<dyn Chooser>> {
    match config.chooser.as_str() {
        "random" | "random_chooser" => Ok(Box::new(
            config
                .seed
                .map_or_else(RandomChooser::new, RandomChooser::with_seed),
        )),
        other => Err(Error::Config(format!("unknown chooser '{other}'"))),
    }
}
