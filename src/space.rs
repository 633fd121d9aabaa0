//! Ordered parameter spaces and the dictionary/vector conversion.
//!
//! A [`ParameterSpace`] is the explicit ordered schema shared by
//! [`vectorify`](ParameterSpace::vectorify) and
//! [`paramify`](ParameterSpace::paramify): slot `i` of every vector belongs to
//! the `i`-th declared [`Variable`].
//!
//! # Example
//!
//! ```
//! use sequential_design::{ParamValue, ParameterSpace, Params, Variable};
//!
//! let space = ParameterSpace::new(vec![
//!     Variable::float("x", 0.0, 1.0).unwrap(),
//!     Variable::int("y", 0, 10).unwrap(),
//! ])
//! .unwrap();
//!
//! let params = space.paramify(&[0.5, 5.0]).unwrap();
//! assert_eq!(params["y"], ParamValue::Int(5));
//! assert_eq!(space.vectorify(&params).unwrap(), vec![0.5, 5.0]);
//! ```

use std::collections::HashMap;

use crate::distribution::{
    CategoricalDistribution, Distribution, FloatDistribution, IntDistribution,
};
use crate::error::{Error, Result, SchemaViolation};
use crate::param::{ParamValue, Params};

/// A named experiment variable and its domain.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    name: String,
    distribution: Distribution,
}

impl Variable {
    /// Creates a continuous variable on `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a bound is not finite or `low > high`.
    pub fn float(name: impl Into<String>, low: f64, high: f64) -> Result<Self> {
        let name = name.into();
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(Error::Config(format!(
                "variable '{name}': invalid bounds [{low}, {high}]"
            )));
        }
        Ok(Self {
            name,
            distribution: Distribution::Float(FloatDistribution { low, high }),
        })
    }

    /// Creates an integer variable on `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `low > high`.
    pub fn int(name: impl Into<String>, low: i64, high: i64) -> Result<Self> {
        let name = name.into();
        if low > high {
            return Err(Error::Config(format!(
                "variable '{name}': invalid bounds [{low}, {high}]"
            )));
        }
        Ok(Self {
            name,
            distribution: Distribution::Int(IntDistribution { low, high }),
        })
    }

    /// Creates a categorical variable over the given ordered options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `choices` is empty or contains duplicates.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let name = name.into();
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        if choices.is_empty() {
            return Err(Error::Config(format!("variable '{name}': no options")));
        }
        for (i, choice) in choices.iter().enumerate() {
            if choices[..i].contains(choice) {
                return Err(Error::Config(format!(
                    "variable '{name}': duplicate option '{choice}'"
                )));
            }
        }
        Ok(Self {
            name,
            distribution: Distribution::Categorical(CategoricalDistribution { choices }),
        })
    }

    /// The variable's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variable's domain.
    #[must_use]
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }
}

/// The ordered set of variables of an experiment.
///
/// Immutable once built. Declaration order defines vector position.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpace {
    variables: Vec<Variable>,
    positions: HashMap<String, usize>,
}

impl ParameterSpace {
    /// Builds a space from variables in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `variables` is empty or two variables
    /// share a name.
    pub fn new(variables: Vec<Variable>) -> Result<Self> {
        if variables.is_empty() {
            return Err(Error::Config("at least one variable is required".into()));
        }
        let mut positions = HashMap::with_capacity(variables.len());
        for (i, variable) in variables.iter().enumerate() {
            if positions.insert(variable.name.clone(), i).is_some() {
                return Err(Error::Config(format!(
                    "duplicate variable '{}'",
                    variable.name
                )));
            }
        }
        Ok(Self {
            variables,
            positions,
        })
    }

    /// Number of declared variables, which is also the vector length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Always `false`: a space has at least one variable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The variables in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Vector position of the named variable.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(Variable::name)
    }

    /// Converts a parameter dictionary into a vector in declaration order.
    ///
    /// Entries for names the space does not declare are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a declared variable is missing, has the
    /// wrong value kind, or lies outside its domain.
    pub fn vectorify(&self, params: &Params) -> Result<Vec<f64>> {
        self.variables
            .iter()
            .map(|variable| -> Result<f64> {
                let value = params
                    .get(&variable.name)
                    .ok_or_else(|| SchemaViolation::MissingVariable(variable.name.clone()))?;
                Ok(variable.distribution.encode(&variable.name, value)?)
            })
            .collect()
    }

    /// Converts a vector back into a parameter dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the vector length differs from
    /// [`len`](Self::len), or a slot is not finite or lies outside its
    /// variable's domain.
    pub fn paramify(&self, vector: &[f64]) -> Result<Params> {
        if vector.len() != self.variables.len() {
            return Err(SchemaViolation::Length {
                expected: self.variables.len(),
                got: vector.len(),
            }
            .into());
        }
        self.variables
            .iter()
            .zip(vector)
            .enumerate()
            .map(|(i, (variable, &slot))| -> Result<(String, ParamValue)> {
                let value = variable.distribution.decode(i, &variable.name, slot)?;
                Ok((variable.name.clone(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> ParameterSpace {
        ParameterSpace::new(vec![
            Variable::float("x", 0.0, 1.0).unwrap(),
            Variable::int("y", 0, 10).unwrap(),
            Variable::categorical("opt", ["sgd", "adam"]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn positions_follow_declaration_order() {
        let space = space();
        assert_eq!(space.position("x"), Some(0));
        assert_eq!(space.position("y"), Some(1));
        assert_eq!(space.position("opt"), Some(2));
        assert_eq!(space.names().collect::<Vec<_>>(), ["x", "y", "opt"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = ParameterSpace::new(vec![
            Variable::float("x", 0.0, 1.0).unwrap(),
            Variable::int("x", 0, 1).unwrap(),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_variables_rejected() {
        assert!(Variable::float("x", 1.0, 0.0).is_err());
        assert!(Variable::float("x", f64::NEG_INFINITY, 0.0).is_err());
        assert!(Variable::int("n", 3, 2).is_err());
        assert!(Variable::categorical("c", Vec::<String>::new()).is_err());
        assert!(Variable::categorical("c", ["a", "a"]).is_err());
        assert!(ParameterSpace::new(Vec::new()).is_err());
    }

    #[test]
    fn missing_variable_is_schema_error() {
        let mut params = Params::new();
        params.insert("x".into(), ParamValue::Float(0.5));
        let err = space().vectorify(&params).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaViolation::MissingVariable(ref name)) if name == "y"
        ));
    }

    #[test]
    fn wrong_length_is_schema_error() {
        let err = space().paramify(&[0.5, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaViolation::Length {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn extra_entries_are_ignored() {
        let space = space();
        let mut params = space.paramify(&[0.25, 3.0, 0.0]).unwrap();
        params.insert("unused".into(), ParamValue::Int(1));
        assert_eq!(space.vectorify(&params).unwrap(), vec![0.25, 3.0, 0.0]);
    }
}
