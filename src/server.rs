use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::date::{self, DateParts};
use crate::features::{FeatureRecord, FEATURE_SCHEMA};
use crate::model::ModelHandle;
use crate::pipeline::{self, Outcome};
use crate::types::{ErrorResponse, FormOptions, InputError, MonthsQuery, PredictRequest, PredictResponse};

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;
type ApiError = (StatusCode, Json<ErrorResponse>);

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    model: ModelHandle,
    today: Clock,
    log_predictions: bool,
}

impl AppState {
    pub fn new(model: ModelHandle) -> Self {
        Self {
            model,
            today: Arc::new(|| chrono::Local::now().date_naive()),
            log_predictions: false,
        }
    }

    /// Pins "today", for tests and replays.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Arc::new(move || today);
        self
    }

    pub fn with_log_predictions(mut self, on: bool) -> Self {
        self.log_predictions = on;
        self
    }

    fn today(&self) -> NaiveDate {
        (self.today)()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/options", get(options))
        .route("/months", get(months))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn unprocessable(e: InputError) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse { error: e.to_string() }),
    )
}

/// Bodies or query strings that do not even parse get the same JSON error
/// shape as inputs that parse but break a form constraint.
fn malformed(body_text: String) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse { error: body_text }),
    )
}

fn log_features(record: &FeatureRecord) {
    let vec = record.to_vec();
    let nz = vec.iter().filter(|x| **x != 0.0).count();
    let mean = vec.iter().sum::<f64>() / vec.len() as f64;
    let sample: Vec<String> = record
        .iter()
        .map(|(f, v)| format!("{}={:.3}", f.column(), v))
        .collect();
    tracing::info!(
        "predict in_dim={} nonzero={} mean={:.3} sample=[{}]",
        vec.len(),
        nz,
        mean,
        sample.join(", ")
    );
}

// ---------- Handlers ----------

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "features": FEATURE_SCHEMA }))
}

async fn options(State(state): State<AppState>) -> Json<FormOptions> {
    Json(FormOptions::new(state.today()))
}

async fn months(
    State(state): State<AppState>,
    query: Result<Query<MonthsQuery>, QueryRejection>,
) -> Result<Json<DateParts>, ApiError> {
    let Query(q) = query.map_err(|e| malformed(e.body_text()))?;
    let today = state.today();
    if q.date < today {
        return Err(unprocessable(InputError::DateInPast { date: q.date, today }));
    }
    Ok(Json(date::decompose(q.date, today)))
}

async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = body.map_err(|e| malformed(e.body_text()))?;
    let today = state.today();
    let inputs = req.validate(today).map_err(unprocessable)?;

    let outcome = pipeline::run(&inputs, today, state.model.estimator()).map_err(unprocessable)?;

    match outcome {
        Outcome::Predicted(p) => {
            if state.log_predictions {
                log_features(&p.record);
            }
            tracing::debug!(count = p.count, "prediction ok");
            Ok(Json(PredictResponse {
                prediction: p.count,
                message: p.message,
                features: p.record.iter().map(|(f, v)| (f.column(), v)).collect(),
                flat: p.flat,
                radar: p.radar,
            }))
        }
        Outcome::Failed(f) => {
            if state.log_predictions {
                log_features(&f.record);
            }
            tracing::warn!(error = %f.error, "prediction failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: f.message() }),
            ))
        }
    }
}
