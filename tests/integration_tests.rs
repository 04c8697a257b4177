/// Integration tests for the price pipeline and its HTTP boundary
///
/// Run with: cargo test --test integration_tests -- --nocapture

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    Json, Router,
};
use ford_price::{
    api::{self, AppState},
    config::AppConfig,
    encoder, predict, FordModel, FuelType, ModelFault, PredictError, PricePredictor, RawInputs,
    StartupError, Transmission,
};
use ford_price::{model::Regressor, scaler::NumericScaler, schema::FeatureSchema};
use std::{fs, path::Path, sync::Arc};
use tower::ServiceExt;

const COLUMNS: [&str; 11] = [
    "year",
    "mileage",
    "tax",
    "mpg",
    "engineSize",
    "model_Focus",
    "model_ Kuga",
    "transmission_Automatic",
    "transmission_Manual",
    "fuelType_Diesel",
    "fuelType_Petrol",
];
const COEF: [f64; 11] = [
    1000.0, -2000.0, -100.0, 300.0, 4000.0, 2500.0, 1500.0, 0.0, -800.0, 0.0, 200.0,
];
const INTERCEPT: f64 = 12_000.0;

fn scenario() -> RawInputs {
    RawInputs {
        year: 2018,
        mileage: 30_000,
        tax: 150,
        mpg: 50.0,
        engine_size: 1.6,
        model: FordModel::Focus,
        transmission: Transmission::Manual,
        fuel_type: FuelType::Petrol,
    }
}

/// Write the three artifacts into `dir` and return a config pointing at them.
fn write_artifacts(dir: &Path, columns: &[&str], coef: &[f64]) -> AppConfig {
    let meta_path = dir.join("columns_car.json");
    let scaler_path = dir.join("scaler_car.json");
    let model_path = dir.join("model_car.json");

    fs::write(
        &meta_path,
        serde_json::json!({ "feat_list": columns, "in_dim": columns.len() }).to_string(),
    )
    .unwrap();
    fs::write(
        &scaler_path,
        r#"{"kind":"standard","mean":[2016,20000,100,40,1.0],"scale":[2,10000,50,5,0.5]}"#,
    )
    .unwrap();
    fs::write(
        &model_path,
        serde_json::json!({ "coef": coef, "intercept": INTERCEPT }).to_string(),
    )
    .unwrap();

    AppConfig {
        model_path,
        scaler_path,
        meta_path,
        port: 0,
        reference_year: 2025,
        log_pred: false,
    }
}

fn loaded() -> (tempfile::TempDir, PricePredictor) {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_artifacts(dir.path(), &COLUMNS, &COEF);
    let p = PricePredictor::load(&cfg).expect("artifacts should load");
    (dir, p)
}

#[test]
fn test_end_to_end_from_artifacts() {
    println!("\n=== Test: End-to-end from artifacts ===");
    let (_dir, p) = loaded();

    let price = p.predict(&scenario()).unwrap().price;

    // standard-scaled numerics, then the active one-hot slots
    let row = [
        (2018.0 - 2016.0) / 2.0,
        (30000.0 - 20000.0) / 10000.0,
        (150.0 - 100.0) / 50.0,
        (50.0 - 40.0) / 5.0,
        (1.6 - 1.0) / 0.5,
        1.0, // model_Focus
        0.0,
        0.0,
        1.0, // transmission_Manual
        0.0,
        1.0, // fuelType_Petrol
    ];
    let dot: f64 = row.iter().zip(COEF).map(|(x, c)| x * c).sum();
    let expected = INTERCEPT + dot;

    println!("✓ price={price:.4} expected={expected:.4}");
    assert_eq!(price, expected);
    assert!((price - 18_200.0).abs() < 1e-6);
}

#[test]
fn test_end_to_end_with_mocked_artifacts() {
    println!("\n=== Test: Mocked scaler and model ===");

    // x' = 2x - 1 on every numeric slot
    struct Affine;
    impl NumericScaler for Affine {
        fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelFault> {
            Ok(row.iter().map(|x| 2.0 * x - 1.0).collect())
        }
    }

    // price = 3*year' + mileage'/4 + 1000 per active one-hot slot
    struct Weighted;
    impl Regressor for Weighted {
        fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelFault> {
            let one_hot: f64 = row[5..].iter().sum();
            Ok(vec![3.0 * row[0] + row[1] / 4.0 + 1000.0 * one_hot])
        }
        fn in_dim(&self) -> usize {
            COLUMNS.len()
        }
        fn name(&self) -> &str {
            "weighted"
        }
    }

    let schema = FeatureSchema::new(COLUMNS.iter().map(|s| s.to_string()).collect()).unwrap();
    let r = predict(&scenario(), &schema, &Affine, &Weighted).unwrap();

    // year' = 4035, mileage' = 59999, three active slots
    assert_eq!(r.price, 3.0 * 4035.0 + 59999.0 / 4.0 + 3000.0);
    println!("✓ mocked price {}", r.price);
}

#[test]
fn test_every_valid_category_is_finite_and_idempotent() {
    println!("\n=== Test: All category combinations ===");
    let (_dir, p) = loaded();
    let mut n = 0;
    for model in FordModel::ALL {
        for transmission in Transmission::ALL {
            for fuel_type in FuelType::ALL {
                let inputs = RawInputs {
                    model,
                    transmission,
                    fuel_type,
                    ..scenario()
                };
                let a = p.predict(&inputs).unwrap();
                let b = p.predict(&inputs).unwrap();
                assert!(a.price.is_finite());
                assert_eq!(a.price.to_bits(), b.price.to_bits());
                n += 1;
            }
        }
    }
    assert_eq!(n, 23 * 3 * 5);
    println!("✓ {n} combinations predicted");
}

#[test]
fn test_kuga_with_and_without_spaced_column() {
    println!("\n=== Test: Kuga column lookup ===");
    let with = FeatureSchema::new(COLUMNS.iter().map(|s| s.to_string()).collect()).unwrap();
    let kuga = RawInputs {
        model: FordModel::Kuga,
        ..scenario()
    };

    let fv = encoder::encode(&kuga, &with).unwrap();
    assert_eq!(fv.get("model_ Kuga"), Some(1.0));
    assert_eq!(fv.get("model_Focus"), Some(0.0));

    let without: Vec<String> = COLUMNS
        .iter()
        .filter(|c| **c != "model_ Kuga")
        .map(|s| s.to_string())
        .collect();
    let without = FeatureSchema::new(without).unwrap();
    let fv = encoder::encode(&kuga, &without).unwrap();
    let active = fv
        .iter()
        .filter(|(n, v)| n.starts_with("model_") && *v != 0.0)
        .count();
    assert_eq!(active, 0);
    println!("✓ unmatched model leaves every model_ slot at zero");
}

#[test]
fn test_missing_artifact_is_fatal() {
    println!("\n=== Test: Missing artifact ===");
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_artifacts(dir.path(), &COLUMNS, &COEF);
    fs::remove_file(&cfg.scaler_path).unwrap();

    let err = PricePredictor::load(&cfg).err().unwrap();
    assert!(matches!(err, StartupError::Read { what: "scaler", .. }));
    println!("✓ {err}");
}

#[test]
fn test_model_width_mismatch_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_artifacts(dir.path(), &COLUMNS, &COEF[..10]);
    let err = PricePredictor::load(&cfg).err().unwrap();
    assert!(matches!(err, StartupError::Invalid { what: "model", .. }));
}

// ---------- HTTP boundary ----------

fn state() -> (tempfile::TempDir, AppState) {
    let (dir, p) = loaded();
    let state = AppState {
        predictor: Arc::new(p),
        reference_year: 2025,
    };
    (dir, state)
}

#[tokio::test]
async fn test_predict_handler_ok() {
    println!("\n=== Test: POST /predict ===");
    let (_dir, state) = state();

    let Json(out) = api::predict(State(state), Json(scenario())).await.unwrap();
    assert!((out.price - 18_200.0).abs() < 1e-6);
    assert_eq!(out.display_price, "£18,200");
    assert_eq!(out.insights.car_age, 7);

    let body = serde_json::to_value(&out).unwrap();
    assert_eq!(body["insights"]["price_category"], "mid_range");
    assert_eq!(body["insights"]["market_comparison"]["position"], "around");
    println!("✓ {}", body);
}

#[tokio::test]
async fn test_predict_handler_rejects_out_of_range() {
    let (_dir, state) = state();
    let inputs = RawInputs {
        mileage: 400_000,
        ..scenario()
    };
    let (status, Json(body)) = api::predict(State(state), Json(inputs)).await.unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("mileage"));
}

#[tokio::test]
async fn test_schema_drift_surfaces_as_error_and_server_keeps_serving() {
    println!("\n=== Test: Schema drift ===");
    let dir = tempfile::tempdir().unwrap();
    let drifted: Vec<&str> = COLUMNS.iter().copied().filter(|c| *c != "year").collect();
    let cfg = write_artifacts(dir.path(), &drifted, &COEF[1..]);
    let p = PricePredictor::load(&cfg).expect("drift is reported per request, not at startup");

    assert!(matches!(
        p.predict(&scenario()),
        Err(PredictError::SchemaMismatch { ref column }) if column == "year"
    ));

    let state = AppState {
        predictor: Arc::new(p),
        reference_year: 2025,
    };
    for _ in 0..2 {
        let (status, Json(body)) = api::predict(State(state.clone()), Json(scenario()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("year"));
    }
    println!("✓ drift reported on every request");
}

#[tokio::test]
async fn test_health_and_options() {
    let (_dir, state) = state();

    let Json(health) = api::health(State(state)).await;
    assert_eq!(health.status, "ok");
    assert_eq!(health.features, COLUMNS.len());

    let Json(opts) = api::options().await;
    assert_eq!(opts.models.len(), 23);
    assert_eq!(opts.default_model, "Fiesta");
    assert_eq!(opts.transmissions, vec!["Automatic", "Manual", "Semi-Auto"]);
    assert_eq!(opts.fuel_types.len(), 5);
    assert_eq!(opts.year.min, 1990.0);
    assert_eq!(opts.engine_size.step, 0.1);
}

// ---------- Route table ----------

async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header("content-type", "application/json");
            Body::from(json)
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn scenario_json() -> serde_json::Value {
    serde_json::to_value(scenario()).unwrap()
}

#[tokio::test]
async fn test_router_serves_every_route() {
    println!("\n=== Test: Router ===");
    let (_dir, state) = state();
    let app = api::router(state);

    let (status, body) = send(&app, "POST", "/predict", Some(scenario_json().to_string())).await;
    assert_eq!(status, StatusCode::OK);
    let out: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(out["display_price"], "£18,200");
    assert!(out.get("t").is_none());

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["features"], COLUMNS.len());

    let (status, body) = send(&app, "GET", "/options", None).await;
    assert_eq!(status, StatusCode::OK);
    let opts: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(opts["models"].as_array().unwrap().len(), 23);

    let (status, _) = send(&app, "GET", "/predict", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    println!("✓ /predict, /health, /options routed");
}

#[tokio::test]
async fn test_router_rejects_bad_requests() {
    let (_dir, state) = state();
    let app = api::router(state);

    let mut unknown = scenario_json();
    unknown["model"] = "Capri".into();
    let (status, _) = send(&app, "POST", "/predict", Some(unknown.to_string())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut far = scenario_json();
    far["mileage"] = 400_000.into();
    let (status, body) = send(&app, "POST", "/predict", Some(far.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(err["error"].as_str().unwrap().contains("mileage"));
}
