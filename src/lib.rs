//! Used Ford price estimation: rebuilds the one-hot feature row a trained
//! regressor expects from a handful of form fields, scales it and predicts.

pub mod api;
pub mod config;
pub mod encoder;
pub mod error;
pub mod insights;
pub mod model;
pub mod predictor;
pub mod scaler;
pub mod schema;
pub mod types;

pub use encoder::{encode, predict, FeatureVector, NUMERIC_COLUMNS};
pub use error::{InferenceError, InputError, ModelFault, PredictError, StartupError};
pub use predictor::PricePredictor;
pub use types::{FordModel, FuelType, PredictionResult, RawInputs, Transmission};
