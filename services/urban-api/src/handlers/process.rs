//! POST /process - land cover and growth statistics for a bounding box.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::Extension, Json};
use bytes::Bytes;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use geo_common::{BoundingBox, RegionOfInterest, UrbanError, UrbanResult};

use crate::metrics;
use crate::pipeline::{self, PipelineMode};
use crate::response::{ApiError, ProcessResponse};
use crate::state::AppState;

/// A validated `/process` body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub roi: RegionOfInterest,
    pub mode: PipelineMode,
}

/// Parse and validate a raw request body.
///
/// The body must be a JSON object with `bounds: [west, south, east, north]`
/// and may carry a `mode` overriding `default_mode`.
pub fn parse_request(body: &[u8], default_mode: PipelineMode) -> UrbanResult<ProcessRequest> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| UrbanError::Validation(format!("body is not valid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| UrbanError::Validation("body must be a JSON object".to_string()))?;

    let bounds = match object.get("bounds") {
        None | Some(Value::Null) => {
            return Err(UrbanError::Validation(
                "'bounds' key is missing".to_string(),
            ))
        }
        Some(bounds) => bounds,
    };

    let not_numbers =
        || UrbanError::Validation("'bounds' must be an array of four numbers".to_string());
    let values = bounds
        .as_array()
        .ok_or_else(not_numbers)?
        .iter()
        .map(|v| v.as_f64().ok_or_else(not_numbers))
        .collect::<UrbanResult<Vec<f64>>>()?;

    let roi = RegionOfInterest::from_bbox(BoundingBox::from_slice(&values)?)?;

    let mode = match object.get("mode") {
        None | Some(Value::Null) => default_mode,
        Some(Value::String(mode)) => mode.parse()?,
        Some(_) => {
            return Err(UrbanError::Validation(
                "'mode' must be a string".to_string(),
            ))
        }
    };

    Ok(ProcessRequest { roi, mode })
}

pub async fn process_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ProcessResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let request = match parse_request(&body, state.config.default_mode) {
        Ok(request) => request,
        Err(e) => {
            warn!(%request_id, error = %e, "Rejected /process request");
            metrics::record_error(e.kind());
            return Err(e.into());
        }
    };

    info!(
        %request_id,
        bbox = %request.roi.bbox(),
        mode = %request.mode,
        "Processing request"
    );
    metrics::record_request(request.mode);

    let started = Instant::now();
    let result = pipeline::run(&state, &request.roi, request.mode).await;
    metrics::record_duration(request.mode, started.elapsed());

    match result {
        Ok(response) => {
            info!(
                %request_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request complete"
            );
            Ok(Json(response))
        }
        Err(e) => {
            error!(%request_id, kind = e.kind(), error = %e, "Pipeline failed");
            metrics::record_error(e.kind());
            Err(e.into())
        }
    }
}
