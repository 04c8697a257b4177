//! Feature reconstruction and the encode → scale → predict pipeline.
//!
//! The trained model only understands the full one-hot column layout it was
//! fit on. A request carries five numbers and three categorical picks; the
//! encoder expands that into a zero-filled vector in schema order, activates
//! at most one slot per categorical family, scales the numeric slots and
//! hands the row to the regressor.

use crate::{
    error::{InferenceError, InferenceStage, ModelFault, PredictError},
    model::Regressor,
    scaler::NumericScaler,
    schema::FeatureSchema,
    types::{FordModel, FuelType, PredictionResult, RawInputs, Transmission},
};

/// Numeric columns, in the order the scaler was fit on.
pub const NUMERIC_COLUMNS: [&str; 5] = ["year", "mileage", "tax", "mpg", "engineSize"];

/// Dense row aligned with a schema. Lives for one prediction call.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector<'s> {
    schema: &'s FeatureSchema,
    values: Vec<f64>,
}

impl<'s> FeatureVector<'s> {
    pub fn zeros(schema: &'s FeatureSchema) -> Self {
        Self {
            schema,
            values: vec![0.0; schema.len()],
        }
    }

    /// Write `value` into the named slot. Returns false if the schema has no
    /// such column.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match self.schema.position(name) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// (name, value) pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

// ---------- Column naming ----------

/// Candidate one-hot columns for a model, first match wins. The training
/// export wrote every model with a leading space; Focus may also appear
/// without it, and that spelling is tried first.
pub fn model_columns(model: FordModel) -> Vec<String> {
    let spaced = format!("model_ {}", model.as_str());
    match model {
        FordModel::Focus => vec!["model_Focus".to_string(), spaced],
        _ => vec![spaced],
    }
}

pub fn transmission_column(t: Transmission) -> String {
    format!("transmission_{}", t.as_str())
}

pub fn fuel_column(f: FuelType) -> String {
    format!("fuelType_{}", f.as_str())
}

// ---------- Pipeline steps ----------

/// Build the pre-scale row: numeric fields copied in, matching one-hot slots
/// set to 1, everything else 0.
///
/// A categorical value with no matching column leaves its family all zero.
/// That is the trained model's reference level, not an error.
pub fn encode<'s>(inputs: &RawInputs, schema: &'s FeatureSchema) -> Result<FeatureVector<'s>, PredictError> {
    let mut fv = FeatureVector::zeros(schema);

    for (column, value) in NUMERIC_COLUMNS.iter().zip(inputs.numeric_row()) {
        if !fv.set(column, value) {
            return Err(PredictError::SchemaMismatch {
                column: (*column).to_string(),
            });
        }
    }

    for candidates in [
        model_columns(inputs.model),
        vec![transmission_column(inputs.transmission)],
        vec![fuel_column(inputs.fuel_type)],
    ] {
        if !candidates.iter().any(|column| fv.set(column, 1.0)) {
            tracing::debug!(?candidates, "no one-hot slot in schema; family left at zero");
        }
    }

    Ok(fv)
}

/// Replace the numeric slots with their scaled values. One-hot slots are not
/// touched.
pub fn scale_numeric(fv: &mut FeatureVector<'_>, scaler: &dyn NumericScaler) -> Result<(), PredictError> {
    let mut positions = [0usize; NUMERIC_COLUMNS.len()];
    for (slot, column) in positions.iter_mut().zip(NUMERIC_COLUMNS) {
        *slot = fv.schema.position(column).ok_or_else(|| PredictError::SchemaMismatch {
            column: column.to_string(),
        })?;
    }

    let row: Vec<f64> = positions.iter().map(|&i| fv.values[i]).collect();
    let scaled = scaler
        .transform(&row)
        .map_err(|e| InferenceError::new(InferenceStage::Scale, e))?;
    if scaled.len() != positions.len() {
        return Err(InferenceError::new(
            InferenceStage::Scale,
            ModelFault::ShapeMismatch {
                expected: positions.len(),
                got: scaled.len(),
            },
        )
        .into());
    }

    for (&i, v) in positions.iter().zip(scaled) {
        fv.values[i] = v;
    }
    Ok(())
}

/// Run the regressor on one encoded row and take its first output.
pub fn infer(fv: &FeatureVector<'_>, model: &dyn Regressor) -> Result<PredictionResult, PredictError> {
    let outputs = model
        .predict(fv.values())
        .map_err(|e| InferenceError::new(InferenceStage::Predict, e))?;
    let price = outputs
        .first()
        .copied()
        .ok_or_else(|| InferenceError::new(InferenceStage::Predict, ModelFault::EmptyOutput))?;
    if !price.is_finite() {
        return Err(InferenceError::new(InferenceStage::Predict, ModelFault::NonFinite { index: 0 }).into());
    }
    Ok(PredictionResult { price })
}

/// Estimate a price for one vehicle.
pub fn predict(
    inputs: &RawInputs,
    schema: &FeatureSchema,
    scaler: &dyn NumericScaler,
    model: &dyn Regressor,
) -> Result<PredictionResult, PredictError> {
    let mut fv = encode(inputs, schema)?;
    scale_numeric(&mut fv, scaler)?;
    infer(&fv, model)
}

/// Summary of a scaled row (density, spread, leading slots), enabled by
/// `LOG_PRED`.
pub(crate) fn log_vector(fv: &FeatureVector<'_>) {
    let vec = fv.values();
    let nz = vec.iter().filter(|x| **x != 0.0).count();
    let mean = if vec.is_empty() { 0.0 } else { vec.iter().sum::<f64>() / (vec.len() as f64) };
    let std = if vec.len() < 2 {
        0.0
    } else {
        (vec.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (vec.len() as f64)).sqrt()
    };
    let sample: Vec<String> = fv
        .iter()
        .take(6)
        .map(|(name, v)| format!("{}={:.3}", name, v))
        .collect();
    tracing::debug!(
        "encoded in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
        vec.len(),
        nz,
        mean,
        std,
        sample.join(", ")
    );
}
