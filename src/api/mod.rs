//! HTTP endpoints for fee calculation

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::DeliveryFeeError;
use crate::fee::{FeeBreakdown, FeeCalculator, FeeError, SnapshotProvider};

/// Calculator shared by all request handlers
pub type SharedCalculator = Arc<FeeCalculator<Arc<dyn SnapshotProvider>>>;

#[derive(Debug, Deserialize)]
pub struct FeeQuery {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFeeRequest {
    pub city: String,
    pub vehicle_type: String,
    pub date_time: Option<String>,
}

impl IntoResponse for DeliveryFeeError {
    fn into_response(self) -> Response {
        let status = match &self {
            DeliveryFeeError::Fee(FeeError::UnsupportedCity(_))
            | DeliveryFeeError::Fee(FeeError::UnsupportedVehicleType(_))
            | DeliveryFeeError::Validation { .. } => StatusCode::BAD_REQUEST,
            DeliveryFeeError::Fee(FeeError::WeatherDataUnavailable { .. }) => StatusCode::NOT_FOUND,
            DeliveryFeeError::Fee(FeeError::VehicleUseForbidden { .. }) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            DeliveryFeeError::Fee(err) => {
                if let Some(reason) = err.prohibition_reason() {
                    tracing::debug!("Refused delivery: {}", reason);
                }
                err.to_string()
            }
            DeliveryFeeError::Validation { .. } => self.to_string(),
            _ => {
                tracing::error!("Request failed: {}", self);
                self.user_message()
            }
        };

        (status, body).into_response()
    }
}

/// Interpret the optional `dateTime` parameter.
///
/// Accepts RFC 3339 or a zone-less ISO date-time, read as UTC. Absent or
/// blank means `now`.
pub fn parse_instant(
    raw: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DeliveryFeeError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(now);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DeliveryFeeError::validation(format!("Invalid dateTime '{raw}'")))
}

pub fn router(calculator: SharedCalculator) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/delivery-fee", post(post_fee))
        .route("/delivery-fee/{city}/{vehicle_type}", get(get_fee))
        .route("/delivery-fee/{city}/{vehicle_type}/breakdown", get(get_breakdown))
        .with_state(calculator)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn get_fee(
    State(calculator): State<SharedCalculator>,
    Path((city, vehicle_type)): Path<(String, String)>,
    Query(query): Query<FeeQuery>,
) -> Result<Json<f64>, DeliveryFeeError> {
    let at = parse_instant(query.date_time.as_deref(), Utc::now())?;
    let fee = calculator.calculate(&city, &vehicle_type, at)?;
    Ok(Json(fee))
}

async fn post_fee(
    State(calculator): State<SharedCalculator>,
    Json(request): Json<DeliveryFeeRequest>,
) -> Result<Json<f64>, DeliveryFeeError> {
    let at = parse_instant(request.date_time.as_deref(), Utc::now())?;
    let fee = calculator.calculate(&request.city, &request.vehicle_type, at)?;
    Ok(Json(fee))
}

async fn get_breakdown(
    State(calculator): State<SharedCalculator>,
    Path((city, vehicle_type)): Path<(String, String)>,
    Query(query): Query<FeeQuery>,
) -> Result<Json<FeeBreakdown>, DeliveryFeeError> {
    let at = parse_instant(query.date_time.as_deref(), Utc::now())?;
    let breakdown = calculator.breakdown(&city, &vehicle_type, at)?;
    Ok(Json(breakdown))
}
