use crate::{
    config::AppConfig,
    encoder::{self, NUMERIC_COLUMNS},
    error::{PredictError, StartupError},
    model::{self, Regressor},
    scaler::{FittedScaler, NumericScaler},
    schema::FeatureSchema,
    types::{PredictionResult, RawInputs},
};

/// Everything a prediction needs, loaded once and read-only afterwards.
/// Share it behind an `Arc`; calls never mutate it.
pub struct PricePredictor {
    schema: FeatureSchema,
    scaler: Box<dyn NumericScaler>,
    model: Box<dyn Regressor>,
    log_vectors: bool,
}

impl PricePredictor {
    /// Assemble from already-loaded parts. Runs the warmup pass.
    pub fn new(
        schema: FeatureSchema,
        scaler: Box<dyn NumericScaler>,
        model: Box<dyn Regressor>,
    ) -> Result<Self, StartupError> {
        let predictor = Self {
            schema,
            scaler,
            model,
            log_vectors: false,
        };
        predictor.warmup()?;
        Ok(predictor)
    }

    /// Load schema, scaler and model from the configured paths. Any failure
    /// here is fatal; there is no partially loaded predictor.
    pub fn load(cfg: &AppConfig) -> Result<Self, StartupError> {
        let schema = FeatureSchema::load(&cfg.meta_path)?;
        let scaler = FittedScaler::load(&cfg.scaler_path)?;
        let model = model::load_regressor(&cfg.model_path, schema.len())?;
        tracing::info!(
            "loaded {} model; feat_list[{}]: {:?}",
            model.name(),
            schema.len(),
            schema.names()
        );
        Ok(Self::new(schema, Box::new(scaler), model)?.with_vector_logging(cfg.log_pred))
    }

    pub fn with_vector_logging(mut self, on: bool) -> Self {
        self.log_vectors = on;
        self
    }

    // Warmup to catch a model that cannot take a schema-shaped row
    fn warmup(&self) -> Result<(), StartupError> {
        for column in NUMERIC_COLUMNS {
            if !self.schema.contains(column) {
                tracing::warn!(
                    column,
                    "feature schema lacks a numeric column; predictions will fail until the artifacts are fixed"
                );
            }
        }
        self.model
            .predict(&vec![0.0; self.schema.len()])
            .map_err(StartupError::Warmup)?;
        tracing::info!("warmup forward ok");
        Ok(())
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn predict(&self, inputs: &RawInputs) -> Result<PredictionResult, PredictError> {
        let mut fv = encoder::encode(inputs, &self.schema)?;
        encoder::scale_numeric(&mut fv, self.scaler.as_ref())?;
        if self.log_vectors {
            encoder::log_vector(&fv);
        }
        encoder::infer(&fv, self.model.as_ref())
    }
}
