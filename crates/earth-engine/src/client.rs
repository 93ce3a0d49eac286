//! Thin REST client for the Earth Engine v1 API.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::config::EarthEngineConfig;
use crate::error::{EeError, EeResult};
use crate::expr::Expr;
use crate::grid::PixelGrid;

/// An image listed in a collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// Asset id usable with `Image.load`.
    pub id: String,
    /// RFC 3339 acquisition start.
    #[serde(default)]
    pub start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListImagesPage {
    #[serde(default)]
    images: Vec<ImageAsset>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComputeValueResponse {
    result: Value,
}

/// Authenticated handle on the Earth Engine REST API.
#[derive(Debug, Clone)]
pub struct EarthEngineClient {
    http: Client,
    api_url: String,
    project: String,
    access_token: Option<String>,
}

impl EarthEngineClient {
    pub fn new(config: &EarthEngineConfig) -> EeResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn project_url(&self, method: &str) -> String {
        format!("{}/v1/projects/{}/{}", self.api_url, self.project, method)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Evaluate an expression and return its JSON result.
    #[instrument(skip(self, expr), fields(project = %self.project))]
    pub async fn compute_value(&self, expr: &Expr) -> EeResult<Value> {
        let body = json!({ "expression": expr.to_graph() });
        let request = self.http.post(self.project_url("value:compute")).json(&body);
        let response = check_status(self.authorize(request).send().await?).await?;

        let parsed: ComputeValueResponse = response
            .json()
            .await
            .map_err(|e| EeError::Malformed(format!("value:compute body: {}", e)))?;
        Ok(parsed.result)
    }

    /// Render an image expression onto `grid` and return the GeoTIFF bytes.
    #[instrument(skip(self, expr), fields(width = grid.width, height = grid.height))]
    pub async fn compute_pixels(&self, expr: &Expr, grid: &PixelGrid) -> EeResult<Bytes> {
        let body = json!({
            "expression": expr.to_graph(),
            "fileFormat": "GEO_TIFF",
            "grid": grid.to_json(),
        });
        let request = self
            .http
            .post(self.project_url("image:computePixels"))
            .json(&body);
        let response = check_status(self.authorize(request).send().await?).await?;

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Received pixels");
        Ok(bytes)
    }

    /// List every image in a collection, following pagination.
    #[instrument(skip(self))]
    pub async fn list_images(&self, collection: &str) -> EeResult<Vec<ImageAsset>> {
        let url = format!("{}/v1/{}:listImages", self.api_url, asset_name(collection));
        let mut images = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(&url);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = check_status(self.authorize(request).send().await?).await?;
            let page: ListImagesPage = response
                .json()
                .await
                .map_err(|e| EeError::Malformed(format!("listImages body: {}", e)))?;

            images.extend(page.images);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = images.len(), "Listed images");
        Ok(images)
    }
}

/// Resource name of an asset id.
///
/// Public catalog ids (`JRC/GHSL/...`) live under `earthengine-public`;
/// ids that already name a project (`projects/<p>/...`) get the `assets`
/// segment inserted after the project.
pub fn asset_name(id: &str) -> String {
    let id = id.trim_matches('/');
    match id.strip_prefix("projects/") {
        Some(rest) => match rest.split_once('/') {
            Some((project, path)) if !path.starts_with("assets/") => {
                format!("projects/{}/assets/{}", project, path)
            }
            _ => id.to_string(),
        },
        None => format!("projects/earthengine-public/assets/{}", id),
    }
}

async fn check_status(response: Response) -> EeResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(EeError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// Pull `error.message` out of a Google API error body, falling back to the
/// raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
