/// Why a parameter dictionary or vector does not fit a [`ParameterSpace`](crate::ParameterSpace).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    /// A declared variable has no entry in the parameter dictionary.
    #[error("missing variable '{0}'")]
    MissingVariable(String),

    /// A value lies outside its variable's domain.
    #[error("value {value} for '{name}' is outside its domain")]
    OutOfDomain {
        /// The variable name.
        name: String,
        /// The offending value, rendered for display.
        value: String,
    },

    /// A value has the wrong kind for its variable (e.g. a string for a float).
    #[error("'{name}' expects a {expected} value")]
    WrongKind {
        /// The variable name.
        name: String,
        /// The kind the variable expects.
        expected: &'static str,
    },

    /// A vector slot holds NaN or an infinity.
    #[error("slot {index} ('{name}') is not finite")]
    NonFinite {
        /// The slot position.
        index: usize,
        /// The variable name.
        name: String,
    },

    /// A vector has the wrong number of slots.
    #[error("expected {expected} slots but got {got}")]
    Length {
        /// The declared variable count.
        expected: usize,
        /// The actual vector length.
        got: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a parameter dictionary or vector does not match the declared space.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaViolation),

    /// Returned when a task name is not part of the task group or configuration.
    #[error("unknown task '{0}'")]
    UnknownTask(String),

    /// Returned when the experiment configuration is structurally invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Returned when a record exists but cannot be read, parsed or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Returned when referring to a job index past the end of the sequence.
    #[error("no job at index {0}")]
    UnknownJob(usize),

    /// Returned when completing a job that has already been completed.
    #[error("job is already complete")]
    JobAlreadyComplete,

    /// Returned when a chooser cannot produce a suggestion.
    #[error("chooser error: {0}")]
    Chooser(String),
}

pub type Result<T> = core::result::Result<T, Error>;
