use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Failure while loading configuration or artifacts. Fatal: the process
/// must not serve predictions after one of these.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),

    #[error("invalid value {value:?} for setting {key}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("failed to read {what} at {}", path.display())]
    Read {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what} at {}", path.display())]
    Parse {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {what}: {reason}")]
    Invalid { what: &'static str, reason: String },

    #[error("warmup prediction failed")]
    Warmup(#[source] ModelFault),

    #[cfg(feature = "torch")]
    #[error("failed to load TorchScript {}", path.display())]
    Torch {
        path: PathBuf,
        #[source]
        source: tch::TchError,
    },
}

/// What went wrong inside a scaler or regressor call.
#[derive(Debug, Error)]
pub enum ModelFault {
    #[error("feature length mismatch: got {got}, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("non-finite value at output position {index}")]
    NonFinite { index: usize },

    #[error("model returned no outputs")]
    EmptyOutput,

    #[cfg(feature = "torch")]
    #[error(transparent)]
    Torch(#[from] tch::TchError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InferenceStage {
    Scale,
    Predict,
}

impl fmt::Display for InferenceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceStage::Scale => f.write_str("scaling"),
            InferenceStage::Predict => f.write_str("prediction"),
        }
    }
}

/// A scaler or model call failed for one request. The loaded artifacts stay
/// usable for the next one.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct InferenceError {
    pub stage: InferenceStage,
    #[source]
    pub source: ModelFault,
}

impl InferenceError {
    pub fn new(stage: InferenceStage, source: ModelFault) -> Self {
        Self { stage, source }
    }
}

#[derive(Debug, Error)]
pub enum PredictError {
    /// The loaded feature schema lacks one of the numeric columns the
    /// encoder always fills. Points at artifact drift.
    #[error("feature schema has no numeric column `{column}`")]
    SchemaMismatch { column: String },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Request field outside the accepted form domain.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be a multiple of {step}, got {value}")]
    OffStep {
        field: &'static str,
        step: f64,
        value: f64,
    },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}
