//! Random chooser implementation.

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::hypers::HyperparameterSet;
use crate::space::ParameterSpace;
use crate::task::TaskOptions;
use crate::task_group::TaskGroup;

use super::Chooser;

/// A chooser that suggests uniformly at random within each variable's domain.
///
/// It ignores the observations and returns the hyperparameters it was given
/// unchanged. Useful as a baseline and for seeding an experiment.
///
/// # Examples
///
/// ```
/// use sequential_design::chooser::RandomChooser;
///
/// // Create with default RNG
/// let chooser = RandomChooser::new();
///
/// // Create with a fixed seed for reproducibility
/// let chooser = RandomChooser::with_seed(42);
/// ```
pub struct RandomChooser {
    rng: fastrand::Rng,
    space: Option<ParameterSpace>,
}

impl RandomChooser {
    /// Creates a new random chooser with a default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
            space: None,
        }
    }

    /// Creates a new random chooser with a fixed seed for reproducibility.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            space: None,
        }
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for RandomChooser {
    fn fit(
        &mut self,
        task_group: &TaskGroup,
        hypers: HyperparameterSet,
        _task_options: &TaskOptions,
    ) -> Result<HyperparameterSet> {
        self.space = Some(task_group.space().clone());
        Ok(hypers)
    }

    #[allow(clippy::cast_precision_loss)]
    fn suggest(&mut self) -> Result<Vec<f64>> {
        let space = self
            .space
            .as_ref()
            .ok_or_else(|| Error::Chooser("suggest called before fit".into()))?;
        let rng = &mut self.rng;
        Ok(space
            .variables()
            .iter()
            .map(|variable| match variable.distribution() {
                Distribution::Float(d) => d.low + rng.f64() * (d.high - d.low),
                Distribution::Int(d) => rng.i64(d.low..=d.high) as f64,
                Distribution::Categorical(d) => rng.usize(0..d.choices.len()) as f64,
            })
            .collect())
    }
}
