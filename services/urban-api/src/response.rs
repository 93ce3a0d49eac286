//! JSON payloads returned by `/process`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use geo_common::{TimeSeries, UrbanError};

/// Prefix of inline PNG payloads.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Successful `/process` response. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landcover: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop_graph: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_graph: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub population_data: Option<PopulationData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_area_data: Option<BuiltAreaData>,
}

/// Population series in the shape the browser client reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationData {
    pub date: Vec<String>,
    pub pop: Vec<f64>,
    pub change: Vec<f64>,
}

impl From<TimeSeries> for PopulationData {
    fn from(series: TimeSeries) -> Self {
        Self {
            date: format_dates(&series),
            pop: series.values,
            change: series.change,
        }
    }
}

/// Built-up area series in the shape the browser client reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltAreaData {
    pub date: Vec<String>,
    pub area: Vec<f64>,
    pub change: Vec<f64>,
}

impl From<TimeSeries> for BuiltAreaData {
    fn from(series: TimeSeries) -> Self {
        Self {
            date: format_dates(&series),
            area: series.values,
            change: series.change,
        }
    }
}

fn format_dates(series: &TimeSeries) -> Vec<String> {
    series
        .dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

/// Encode PNG bytes as a `data:` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(png))
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: &'a str,
}

/// Request-boundary wrapper turning [`UrbanError`] into a JSON response.
#[derive(Debug)]
pub struct ApiError(pub UrbanError);

impl From<UrbanError> for ApiError {
    fn from(err: UrbanError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series() -> TimeSeries {
        TimeSeries {
            dates: vec![
                NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(1985, 1, 1).unwrap(),
            ],
            values: vec![20.0, 15.0],
            change: vec![100.0, -25.0],
        }
    }

    #[test]
    fn test_landcover_only_shape() {
        let response = ProcessResponse {
            landcover: Some("static/exports/landcover-1.png".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"landcover": "static/exports/landcover-1.png"}));
    }

    #[test]
    fn test_series_keys() {
        let pop = serde_json::to_value(PopulationData::from(series())).unwrap();
        assert_eq!(pop["date"][0], "1980-01-01");
        assert_eq!(pop["pop"][1], 15.0);
        assert_eq!(pop["change"][1], -25.0);

        let built = serde_json::to_value(BuiltAreaData::from(series())).unwrap();
        assert_eq!(built["area"][0], 20.0);
        assert!(built.get("pop").is_none());
    }

    #[test]
    fn test_png_data_uri() {
        let uri = png_data_uri(&[0x89, b'P', b'N', b'G']);
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (UrbanError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (UrbanError::EmptySeries("population".into()), StatusCode::NOT_FOUND),
            (UrbanError::Export("x".into()), StatusCode::BAD_GATEWAY),
            (UrbanError::DataFetch("x".into()), StatusCode::BAD_GATEWAY),
            (UrbanError::Conversion("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
