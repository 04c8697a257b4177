use serde::Deserialize;
use std::{fs, path::Path};

use crate::{
    encoder::NUMERIC_COLUMNS,
    error::{ModelFault, StartupError},
};

/// Fitted transform applied to the numeric columns before inference.
pub trait NumericScaler: Send + Sync {
    /// Transform one row laid out as `NUMERIC_COLUMNS`.
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelFault>;
}

/// Exported parameters of a fitted scaler, one entry per numeric column.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// x' = (x - mean) / scale
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// x' = x * scale + min
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

#[derive(Clone, Debug)]
pub struct FittedScaler {
    params: ScalerParams,
}

impl FittedScaler {
    pub fn new(params: ScalerParams) -> Result<Self, StartupError> {
        let (a, b) = match &params {
            ScalerParams::Standard { mean, scale } => (mean, scale),
            ScalerParams::MinMax { min, scale } => (min, scale),
        };
        for v in [a, b] {
            if v.len() != NUMERIC_COLUMNS.len() {
                return Err(StartupError::Invalid {
                    what: "scaler",
                    reason: format!(
                        "expected {} parameters per vector, got {}",
                        NUMERIC_COLUMNS.len(),
                        v.len()
                    ),
                });
            }
            if let Some(bad) = v.iter().find(|x| !x.is_finite()) {
                return Err(StartupError::Invalid {
                    what: "scaler",
                    reason: format!("non-finite parameter {bad}"),
                });
            }
        }
        Ok(Self { params })
    }

    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let txt = fs::read_to_string(path).map_err(|source| StartupError::Read {
            what: "scaler",
            path: path.to_path_buf(),
            source,
        })?;
        let params: ScalerParams = serde_json::from_str(&txt).map_err(|source| StartupError::Parse {
            what: "scaler",
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(params)
    }
}

impl NumericScaler for FittedScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelFault> {
        if row.len() != NUMERIC_COLUMNS.len() {
            return Err(ModelFault::ShapeMismatch {
                expected: NUMERIC_COLUMNS.len(),
                got: row.len(),
            });
        }

        let out: Vec<f64> = match &self.params {
            ScalerParams::Standard { mean, scale } => row
                .iter()
                .zip(mean.iter().zip(scale))
                // constant columns are fit with scale 0; treat as 1
                .map(|(x, (m, s))| (x - m) / if *s == 0.0 { 1.0 } else { *s })
                .collect(),
            ScalerParams::MinMax { min, scale } => row
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (lo, s))| x * s + lo)
                .collect(),
        };

        if let Some(index) = out.iter().position(|v| !v.is_finite()) {
            return Err(ModelFault::NonFinite { index });
        }
        Ok(out)
    }
}
