use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire optimizer crate.
pub type Result<T> = std::result::Result<T, OptimizerErr>;

/// The optimizer crate's error type.
///
/// Every failure is deterministic given the same inputs, nothing is retried internally.
#[derive(Debug)]
pub enum OptimizerErr {
    /// The configuration descriptor is undecodable, names an unknown kind, misses a
    /// required field or holds an out of range hyperparameter.
    Config(String),
    /// A gradient doesn't have the same length as the parameter.
    DimensionMismatch { got: usize, expected: usize },
    /// A checkpoint blob is inconsistent with this optimizer's version, kind or shape.
    CorruptState(String),
    /// The auxiliary state can't be sized to match the parameter.
    Shape(String),
}

impl OptimizerErr {
    /// Stable status code for this error kind, used across the C boundary.
    ///
    /// # Returns
    /// A strictly negative integer, distinct per variant.
    pub fn code(&self) -> i32 {
        match self {
            OptimizerErr::Config(_) => -1,
            OptimizerErr::DimensionMismatch { .. } => -2,
            OptimizerErr::CorruptState(_) => -3,
            OptimizerErr::Shape(_) => -4,
        }
    }
}

impl Display for OptimizerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerErr::Config(msg) => write!(f, "invalid optimizer config: {msg}"),
            OptimizerErr::DimensionMismatch { got, expected } => write!(
                f,
                "gradient length mismatch: got {got}, expected {expected}"
            ),
            OptimizerErr::CorruptState(msg) => write!(f, "corrupt optimizer state: {msg}"),
            OptimizerErr::Shape(msg) => write!(f, "invalid optimizer shape: {msg}"),
        }
    }
}

impl Error for OptimizerErr {}

impl From<serde_json::Error> for OptimizerErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}
