//! Variable domain types.

use crate::error::SchemaViolation;
use crate::param::ParamValue;

/// Domain of a continuous variable.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatDistribution {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive).
    pub high: f64,
}

/// Domain of an integer variable.
#[derive(Clone, Debug, PartialEq)]
pub struct IntDistribution {
    /// Lower bound (inclusive).
    pub low: i64,
    /// Upper bound (inclusive).
    pub high: i64,
}

/// Domain of a categorical variable.
///
/// The position of a choice in `choices` is the value stored in its vector slot.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoricalDistribution {
    /// The ordered options.
    pub choices: Vec<String>,
}

/// Enum wrapping all variable domain types.
#[derive(Clone, Debug, PartialEq)]
pub enum Distribution {
    /// A continuous range.
    Float(FloatDistribution),
    /// An integer range.
    Int(IntDistribution),
    /// A fixed set of named options.
    Categorical(CategoricalDistribution),
}

impl Distribution {
    /// Short name of the value kind this domain accepts.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "integer",
            Self::Categorical(_) => "categorical",
        }
    }

    /// Encode `value` into its numeric slot, checking kind and domain.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn encode(&self, name: &str, value: &ParamValue) -> Result<f64, SchemaViolation> {
        let out_of_domain = || SchemaViolation::OutOfDomain {
            name: name.to_string(),
            value: value.to_string(),
        };
        match (self, value) {
            (Self::Float(d), ParamValue::Float(v)) => {
                if v.is_finite() && (d.low..=d.high).contains(v) {
                    Ok(*v)
                } else {
                    Err(out_of_domain())
                }
            }
            (Self::Int(d), ParamValue::Int(v)) => {
                if (d.low..=d.high).contains(v) {
                    Ok(*v as f64)
                } else {
                    Err(out_of_domain())
                }
            }
            (Self::Categorical(d), ParamValue::Categorical(choice)) => d
                .choices
                .iter()
                .position(|c| c == choice)
                .map(|index| index as f64)
                .ok_or_else(out_of_domain),
            _ => Err(SchemaViolation::WrongKind {
                name: name.to_string(),
                expected: self.kind_name(),
            }),
        }
    }

    /// Decode a numeric slot back into a value.
    ///
    /// Integer and categorical slots are rounded to the nearest integer first.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub(crate) fn decode(
        &self,
        index: usize,
        name: &str,
        slot: f64,
    ) -> Result<ParamValue, SchemaViolation> {
        if !slot.is_finite() {
            return Err(SchemaViolation::NonFinite {
                index,
                name: name.to_string(),
            });
        }
        let out_of_domain = || SchemaViolation::OutOfDomain {
            name: name.to_string(),
            value: format!("{slot:?}"),
        };
        match self {
            Self::Float(d) => {
                if (d.low..=d.high).contains(&slot) {
                    Ok(ParamValue::Float(slot))
                } else {
                    Err(out_of_domain())
                }
            }
            Self::Int(d) => {
                let rounded = slot.round();
                if rounded < d.low as f64 || rounded > d.high as f64 {
                    return Err(out_of_domain());
                }
                Ok(ParamValue::Int(rounded as i64))
            }
            Self::Categorical(d) => {
                let rounded = slot.round();
                if rounded < 0.0 || rounded >= d.choices.len() as f64 {
                    return Err(out_of_domain());
                }
                Ok(ParamValue::Categorical(d.choices[rounded as usize].clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Distribution {
        Distribution::Categorical(CategoricalDistribution {
            choices: vec!["sgd".into(), "adam".into()],
        })
    }

    #[test]
    fn int_slots_round_to_nearest() {
        let dist = Distribution::Int(IntDistribution { low: 0, high: 10 });
        assert_eq!(dist.decode(0, "n", 4.999_999_9), Ok(ParamValue::Int(5)));
        assert_eq!(dist.decode(0, "n", 0.4), Ok(ParamValue::Int(0)));
        assert!(dist.decode(0, "n", 10.6).is_err());
    }

    #[test]
    fn categorical_encodes_index() {
        let dist = choices();
        assert_eq!(dist.encode("opt", &ParamValue::from("adam")), Ok(1.0));
        assert_eq!(
            dist.decode(0, "opt", 1.0),
            Ok(ParamValue::Categorical("adam".into()))
        );
        assert!(dist.encode("opt", &ParamValue::from("rmsprop")).is_err());
        assert!(dist.decode(0, "opt", 2.0).is_err());
        assert!(dist.decode(0, "opt", -0.6).is_err());
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let dist = Distribution::Float(FloatDistribution {
            low: 0.0,
            high: 1.0,
        });
        assert_eq!(
            dist.encode("x", &ParamValue::Int(1)),
            Err(SchemaViolation::WrongKind {
                name: "x".into(),
                expected: "float",
            })
        );
    }

    #[test]
    fn non_finite_slot_is_rejected() {
        let dist = Distribution::Float(FloatDistribution {
            low: 0.0,
            high: 1.0,
        });
        assert!(matches!(
            dist.decode(3, "x", f64::NAN),
            Err(SchemaViolation::NonFinite { index: 3, .. })
        ));
        assert!(dist.encode("x", &ParamValue::Float(f64::INFINITY)).is_err());
    }
}
