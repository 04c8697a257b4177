use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::PredictError,
    insights::{format_gbp, Insights},
    predictor::PricePredictor,
    types::{
        FieldRange, FordModel, FuelType, RawInputs, Transmission, DEFAULT_MODEL, ENGINE_SIZE_RANGE,
        MILEAGE_RANGE, MPG_RANGE, TAX_RANGE, YEAR_RANGE,
    },
};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PricePredictor>,
    pub reference_year: i32,
}

pub type ApiError = (StatusCode, Json<Value>);

fn reject(status: StatusCode, msg: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": msg.to_string() })))
}

// ---------- Response types ----------

#[derive(Debug, Serialize)]
pub struct PredictOut {
    pub price: f64,
    pub display_price: String,
    pub insights: Insights,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub features: usize,
}

#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub models: Vec<&'static str>,
    pub default_model: &'static str,
    pub transmissions: Vec<&'static str>,
    pub fuel_types: Vec<&'static str>,
    pub year: FieldRange,
    pub mileage: FieldRange,
    pub mpg: FieldRange,
    pub tax: FieldRange,
    pub engine_size: FieldRange,
}

// ---------- Handlers ----------

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        features: state.predictor.schema().len(),
    })
}

pub async fn options() -> Json<FormOptions> {
    Json(FormOptions {
        models: FordModel::ALL.iter().map(|m| m.as_str()).collect(),
        default_model: DEFAULT_MODEL.as_str(),
        transmissions: Transmission::ALL.iter().map(|t| t.as_str()).collect(),
        fuel_types: FuelType::ALL.iter().map(|f| f.as_str()).collect(),
        year: YEAR_RANGE,
        mileage: MILEAGE_RANGE,
        mpg: MPG_RANGE,
        tax: TAX_RANGE,
        engine_size: ENGINE_SIZE_RANGE,
    })
}

pub async fn predict(
    State(state): State<AppState>,
    Json(inputs): Json<RawInputs>,
) -> Result<Json<PredictOut>, ApiError> {
    inputs
        .validate()
        .map_err(|e| reject(StatusCode::BAD_REQUEST, e))?;

    let result = state.predictor.predict(&inputs).map_err(|e| {
        match &e {
            PredictError::SchemaMismatch { .. } => {
                tracing::error!(error = %e, "feature schema drifted from the encoder")
            }
            PredictError::Inference(inner) => {
                tracing::warn!(error = %e, stage = %inner.stage, "prediction failed")
            }
        }
        reject(StatusCode::INTERNAL_SERVER_ERROR, format!("Prediction error: {e}"))
    })?;

    Ok(Json(PredictOut {
        price: result.price,
        display_price: format_gbp(result.price),
        insights: Insights::derive(&inputs, result.price, state.reference_year),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/options", get(options))
        .route("/predict", post(predict))
        .with_state(state)
}
