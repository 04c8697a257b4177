//! Display labels shown next to a price. Thresholds are business copy and can
//! change without touching the prediction pipeline.

use serde::Serialize;

use crate::types::{FordModel, FuelType, RawInputs};

pub const PREMIUM_PRICE: f64 = 30_000.0;
pub const MID_RANGE_PRICE: f64 = 15_000.0;
pub const MARKET_AVERAGE: f64 = 18_000.0;
pub const MARKET_BAND: f64 = 5_000.0;

/// Bars drawn beside the estimate.
pub const BUDGET_REFERENCE: f64 = 8_000.0;
pub const PREMIUM_REFERENCE: f64 = 35_000.0;

pub const POPULAR_MODELS: [FordModel; 4] = [
    FordModel::Focus,
    FordModel::Fiesta,
    FordModel::Kuga,
    FordModel::Mondeo,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeTier {
    New,
    Established,
    Old,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MileageLabel {
    Low,
    Average,
    High,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Efficiency {
    Excellent,
    Good,
    Poor,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentalImpact {
    Excellent,
    Good,
    Average,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    Premium,
    GoodValue,
    BudgetFriendly,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    Premium,
    MidRange,
    BudgetFriendly,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "position", rename_all = "snake_case")]
pub enum MarketComparison {
    Above { by: f64 },
    Around,
    Below { by: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PriceBar {
    pub label: &'static str,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insights {
    pub car_age: i32,
    pub age_tier: AgeTier,
    pub mileage: MileageLabel,
    pub efficiency: Efficiency,
    pub environmental_impact: EnvironmentalImpact,
    pub market_position: MarketPosition,
    pub popular_choice: bool,
    pub price_category: PriceCategory,
    pub market_comparison: MarketComparison,
    pub comparison_bars: [PriceBar; 3],
    pub value_factors: Vec<&'static str>,
    pub considerations: Vec<&'static str>,
}

impl Insights {
    pub fn derive(inputs: &RawInputs, price: f64, reference_year: i32) -> Self {
        let car_age = reference_year - inputs.year;
        Self {
            car_age,
            age_tier: age_tier(car_age),
            mileage: mileage_label(inputs.mileage),
            efficiency: efficiency(inputs.mpg),
            environmental_impact: environmental_impact(inputs.fuel_type, inputs.mpg),
            market_position: market_position(car_age, inputs.mileage),
            popular_choice: POPULAR_MODELS.contains(&inputs.model),
            price_category: price_category(price),
            market_comparison: market_comparison(price),
            comparison_bars: [
                PriceBar { label: "Budget", price: BUDGET_REFERENCE },
                PriceBar { label: "Your Car", price },
                PriceBar { label: "Premium", price: PREMIUM_REFERENCE },
            ],
            value_factors: value_factors(inputs, car_age),
            considerations: considerations(inputs, car_age),
        }
    }
}

pub fn age_tier(car_age: i32) -> AgeTier {
    if car_age < 3 {
        AgeTier::New
    } else if car_age < 7 {
        AgeTier::Established
    } else {
        AgeTier::Old
    }
}

pub fn mileage_label(mileage: i64) -> MileageLabel {
    if mileage < 50_000 {
        MileageLabel::Low
    } else if mileage > 100_000 {
        MileageLabel::High
    } else {
        MileageLabel::Average
    }
}

pub fn efficiency(mpg: f64) -> Efficiency {
    if mpg > 50.0 {
        Efficiency::Excellent
    } else if mpg > 30.0 {
        Efficiency::Good
    } else {
        Efficiency::Poor
    }
}

pub fn environmental_impact(fuel: FuelType, mpg: f64) -> EnvironmentalImpact {
    match fuel {
        FuelType::Electric => EnvironmentalImpact::Excellent,
        FuelType::Hybrid => EnvironmentalImpact::Good,
        _ if mpg > 50.0 => EnvironmentalImpact::Good,
        _ => EnvironmentalImpact::Average,
    }
}

pub fn market_position(car_age: i32, mileage: i64) -> MarketPosition {
    if car_age < 3 && mileage < 30_000 {
        MarketPosition::Premium
    } else if car_age < 7 && mileage < 80_000 {
        MarketPosition::GoodValue
    } else {
        MarketPosition::BudgetFriendly
    }
}

pub fn price_category(price: f64) -> PriceCategory {
    if price > PREMIUM_PRICE {
        PriceCategory::Premium
    } else if price > MID_RANGE_PRICE {
        PriceCategory::MidRange
    } else {
        PriceCategory::BudgetFriendly
    }
}

pub fn market_comparison(price: f64) -> MarketComparison {
    let diff = price - MARKET_AVERAGE;
    if diff > MARKET_BAND {
        MarketComparison::Above { by: diff }
    } else if diff > -MARKET_BAND {
        MarketComparison::Around
    } else {
        MarketComparison::Below { by: diff.abs() }
    }
}

fn value_factors(inputs: &RawInputs, car_age: i32) -> Vec<&'static str> {
    let mut factors = Vec::new();
    if car_age < 5 {
        factors.push("Recent model year");
    }
    if inputs.mileage < 50_000 {
        factors.push("Low mileage");
    }
    if inputs.mpg > 40.0 {
        factors.push("Fuel efficient");
    }
    if matches!(inputs.fuel_type, FuelType::Electric | FuelType::Hybrid) {
        factors.push("Eco-friendly");
    }
    if factors.is_empty() {
        factors.push("Solid, reliable vehicle");
    }
    factors
}

fn considerations(inputs: &RawInputs, car_age: i32) -> Vec<&'static str> {
    let mut notes = Vec::new();
    if car_age > 10 {
        notes.push("Vehicle age affects value");
    }
    if inputs.mileage > 100_000 {
        notes.push("High mileage impacts price");
    }
    if inputs.tax > 300 {
        notes.push("Higher tax bracket");
    }
    if notes.is_empty() {
        notes.push("Great overall condition!");
    }
    notes
}

/// Whole pounds with thousands separators, e.g. `£12,345`.
pub fn format_gbp(price: f64) -> String {
    let whole = price.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("£-{grouped}")
    } else {
        format!("£{grouped}")
    }
}
