use serde::{Deserialize, Serialize};

use crate::error::InputError;

// ---------- Categorical domains ----------

/// Ford models the price model was trained on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum FordModel {
    #[serde(rename = "B-MAX")]
    BMax,
    #[serde(rename = "C-MAX")]
    CMax,
    EcoSport,
    Edge,
    Escort,
    Fiesta,
    Focus,
    Fusion,
    Galaxy,
    #[serde(rename = "Grand C-MAX")]
    GrandCMax,
    #[serde(rename = "Grand Tourneo Connect")]
    GrandTourneoConnect,
    #[serde(rename = "KA")]
    Ka,
    #[serde(rename = "Ka+")]
    KaPlus,
    Kuga,
    Mondeo,
    Mustang,
    Puma,
    Ranger,
    #[serde(rename = "S-MAX")]
    SMax,
    Streetka,
    #[serde(rename = "Tourneo Connect")]
    TourneoConnect,
    #[serde(rename = "Tourneo Custom")]
    TourneoCustom,
    #[serde(rename = "Transit Tourneo")]
    TransitTourneo,
}

impl FordModel {
    pub const ALL: [FordModel; 23] = [
        FordModel::BMax,
        FordModel::CMax,
        FordModel::EcoSport,
        FordModel::Edge,
        FordModel::Escort,
        FordModel::Fiesta,
        FordModel::Focus,
        FordModel::Fusion,
        FordModel::Galaxy,
        FordModel::GrandCMax,
        FordModel::GrandTourneoConnect,
        FordModel::Ka,
        FordModel::KaPlus,
        FordModel::Kuga,
        FordModel::Mondeo,
        FordModel::Mustang,
        FordModel::Puma,
        FordModel::Ranger,
        FordModel::SMax,
        FordModel::Streetka,
        FordModel::TourneoConnect,
        FordModel::TourneoCustom,
        FordModel::TransitTourneo,
    ];

    /// Name as it appears in the dataset and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            FordModel::BMax => "B-MAX",
            FordModel::CMax => "C-MAX",
            FordModel::EcoSport => "EcoSport",
            FordModel::Edge => "Edge",
            FordModel::Escort => "Escort",
            FordModel::Fiesta => "Fiesta",
            FordModel::Focus => "Focus",
            FordModel::Fusion => "Fusion",
            FordModel::Galaxy => "Galaxy",
            FordModel::GrandCMax => "Grand C-MAX",
            FordModel::GrandTourneoConnect => "Grand Tourneo Connect",
            FordModel::Ka => "KA",
            FordModel::KaPlus => "Ka+",
            FordModel::Kuga => "Kuga",
            FordModel::Mondeo => "Mondeo",
            FordModel::Mustang => "Mustang",
            FordModel::Puma => "Puma",
            FordModel::Ranger => "Ranger",
            FordModel::SMax => "S-MAX",
            FordModel::Streetka => "Streetka",
            FordModel::TourneoConnect => "Tourneo Connect",
            FordModel::TourneoCustom => "Tourneo Custom",
            FordModel::TransitTourneo => "Transit Tourneo",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Transmission {
    Automatic,
    Manual,
    #[serde(rename = "Semi-Auto")]
    SemiAuto,
}

impl Transmission {
    pub const ALL: [Transmission; 3] = [
        Transmission::Automatic,
        Transmission::Manual,
        Transmission::SemiAuto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
            Transmission::SemiAuto => "Semi-Auto",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum FuelType {
    Diesel,
    Electric,
    Hybrid,
    Other,
    Petrol,
}

impl FuelType {
    pub const ALL: [FuelType; 5] = [
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
        FuelType::Other,
        FuelType::Petrol,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Other => "Other",
            FuelType::Petrol => "Petrol",
        }
    }
}

// ---------- Numeric domains ----------

/// Accepted range of a numeric form field, with the form's default value.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

pub const YEAR_RANGE: FieldRange = FieldRange { min: 1990.0, max: 2025.0, default: 2018.0, step: 1.0 };
pub const MILEAGE_RANGE: FieldRange = FieldRange { min: 0.0, max: 300_000.0, default: 30_000.0, step: 1000.0 };
pub const MPG_RANGE: FieldRange = FieldRange { min: 0.0, max: 150.0, default: 50.0, step: 0.01 };
pub const TAX_RANGE: FieldRange = FieldRange { min: 0.0, max: 1000.0, default: 150.0, step: 1.0 };
pub const ENGINE_SIZE_RANGE: FieldRange = FieldRange { min: 0.5, max: 6.0, default: 1.6, step: 0.1 };

pub const DEFAULT_MODEL: FordModel = FordModel::Fiesta;

impl FieldRange {
    fn check(&self, field: &'static str, value: f64) -> Result<(), InputError> {
        if !value.is_finite() {
            return Err(InputError::NonFinite { field });
        }
        if value < self.min || value > self.max {
            return Err(InputError::OutOfRange {
                field,
                min: self.min,
                max: self.max,
                value,
            });
        }
        Ok(())
    }
}

// ---------- Request/Response types ----------

/// One vehicle as submitted by the form. Built per request, never shared.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInputs {
    pub year: i32,
    pub mileage: i64,
    pub tax: i64,
    pub mpg: f64,
    pub engine_size: f64,
    pub model: FordModel,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
}

impl RawInputs {
    /// Numeric fields in encoder order: year, mileage, tax, mpg, engineSize.
    pub fn numeric_row(&self) -> [f64; 5] {
        [
            f64::from(self.year),
            self.mileage as f64,
            self.tax as f64,
            self.mpg,
            self.engine_size,
        ]
    }

    /// Reject values the form would never have produced.
    pub fn validate(&self) -> Result<(), InputError> {
        YEAR_RANGE.check("year", f64::from(self.year))?;
        MILEAGE_RANGE.check("mileage", self.mileage as f64)?;
        TAX_RANGE.check("tax", self.tax as f64)?;
        MPG_RANGE.check("mpg", self.mpg)?;
        ENGINE_SIZE_RANGE.check("engineSize", self.engine_size)?;

        let tenths = self.engine_size * 10.0;
        if (tenths - tenths.round()).abs() > 1e-6 {
            return Err(InputError::OffStep {
                field: "engineSize",
                step: ENGINE_SIZE_RANGE.step,
                value: self.engine_size,
            });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    pub price: f64,
}
