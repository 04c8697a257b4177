use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{ModelFault, StartupError};

/// A fitted regression model: full feature vector in, predictions out.
pub trait Regressor: Send + Sync {
    /// Predict for a single row in schema order. Callers read the first output.
    fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelFault>;

    /// Expected input width.
    fn in_dim(&self) -> usize;

    fn name(&self) -> &str;
}

// ---------- Linear model (JSON export of coef_/intercept_) ----------

#[derive(Clone, Debug, Deserialize)]
pub struct LinearModel {
    coef: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

impl LinearModel {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self, StartupError> {
        if let Some(bad) = coef.iter().chain([&intercept]).find(|x| !x.is_finite()) {
            return Err(StartupError::Invalid {
                what: "model",
                reason: format!("non-finite coefficient {bad}"),
            });
        }
        Ok(Self { coef, intercept })
    }

    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let txt = fs::read_to_string(path).map_err(|source| StartupError::Read {
            what: "model",
            path: path.to_path_buf(),
            source,
        })?;
        let raw: LinearModel = serde_json::from_str(&txt).map_err(|source| StartupError::Parse {
            what: "model",
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(raw.coef, raw.intercept)
    }
}

impl Regressor for LinearModel {
    fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelFault> {
        if row.len() != self.coef.len() {
            return Err(ModelFault::ShapeMismatch {
                expected: self.coef.len(),
                got: row.len(),
            });
        }
        let dot: f64 = row.iter().zip(&self.coef).map(|(x, c)| x * c).sum();
        let y = self.intercept + dot;
        if !y.is_finite() {
            return Err(ModelFault::NonFinite { index: 0 });
        }
        Ok(vec![y])
    }

    fn in_dim(&self) -> usize {
        self.coef.len()
    }

    fn name(&self) -> &str {
        "linear"
    }
}

// ---------- TorchScript model ----------

#[cfg(feature = "torch")]
pub use torch::TorchModel;

#[cfg(feature = "torch")]
mod torch {
    use std::path::Path;
    use tch::{kind::Kind, CModule, Device, Tensor};

    use super::Regressor;
    use crate::error::{ModelFault, StartupError};

    pub struct TorchModel {
        model: CModule,
        device: Device,
        in_dim: usize,
    }

    impl TorchModel {
        pub fn load(model_path: &Path, in_dim: usize) -> Result<Self, StartupError> {
            let device = Device::Cpu;
            let model = CModule::load_on_device(model_path, device).map_err(|source| {
                StartupError::Torch {
                    path: model_path.to_path_buf(),
                    source,
                }
            })?;
            Ok(Self {
                model,
                device,
                in_dim,
            })
        }
    }

    impl Regressor for TorchModel {
        fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelFault> {
            if row.len() != self.in_dim {
                return Err(ModelFault::ShapeMismatch {
                    expected: self.in_dim,
                    got: row.len(),
                });
            }
            let x: Vec<f32> = row.iter().map(|v| *v as f32).collect();
            let input = Tensor::from_slice(&x)
                .reshape([1, self.in_dim as i64])
                .to_device(self.device);

            // Any output shape; flatten and read in order
            let t = self.model.forward_ts(&[input])?;
            let flat = t.to_kind(Kind::Double).flatten(0, -1);
            let out = Vec::<f64>::try_from(&flat)?;
            if let Some(index) = out.iter().position(|v| !v.is_finite()) {
                return Err(ModelFault::NonFinite { index });
            }
            Ok(out)
        }

        fn in_dim(&self) -> usize {
            self.in_dim
        }

        fn name(&self) -> &str {
            "torchscript"
        }
    }
}

/// Pick a backend by file extension: `.pt` is TorchScript, anything else a
/// JSON linear export.
pub fn load_regressor(path: &Path, in_dim: usize) -> Result<Box<dyn Regressor>, StartupError> {
    let is_torch = path.extension().is_some_and(|ext| ext == "pt");
    if is_torch {
        #[cfg(feature = "torch")]
        {
            return Ok(Box::new(TorchModel::load(path, in_dim)?));
        }
        #[cfg(not(feature = "torch"))]
        {
            return Err(StartupError::Invalid {
                what: "model",
                reason: format!(
                    "{} is TorchScript; rebuild with the `torch` feature",
                    path.display()
                ),
            });
        }
    }

    let model = LinearModel::load(path)?;
    if model.in_dim() != in_dim {
        return Err(StartupError::Invalid {
            what: "model",
            reason: format!(
                "model expects {} features but the schema has {}",
                model.in_dim(),
                in_dim
            ),
        });
    }
    Ok(Box::new(model))
}
