//! HTTP interface: the analysis endpoint and its health check.
//!
//! `POST /analyze-food` takes a multipart form with an `image` part and
//! optional JSON `options` and `userProfile` parts. Malformed options or
//! profile fields fall back to defaults rather than failing the request.
//! `GET /analyze-food` reports liveness.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use log::{info, warn};
use serde_json::json;

use crate::config::AppConfig;
use crate::error::{AnalysisError, ProviderError};
use crate::image_prep;
use crate::model::{
    AnalysisOptions, AnalyzeFoodResponse, ApiResponse, NutritionAnalysis, UserProfile,
};
use crate::providers::FallbackProvider;

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    analyzer: Arc<FallbackProvider>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let analyzer = FallbackProvider::from_config(&config);
        AppState {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
        }
    }
}

pub fn router(state: AppState) -> Router {
    // The limit sits above the configured image cap so oversized uploads
    // still reach the validator and get the JSON error instead of a bare
    // 413 from the extractor.
    let body_limit = state.config.image.max_size_bytes + 2 * 1024 * 1024;
    Router::new()
        .route("/analyze-food", post(analyze_food).get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(config: AppConfig) -> Result<(), AnalysisError> {
    let bind_addr = config.server.bind_addr.clone();
    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn analyze_food(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut options = AnalysisOptions::default();
    let mut profile: Option<UserProfile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart field: {}", e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Failed to upload image. Please try again.",
                    None,
                );
            }
        };

        match field.name().unwrap_or("") {
            "image" => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => image = Some((bytes.to_vec(), mime)),
                    Err(e) => {
                        warn!("Failed to read image field: {}", e);
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            "Failed to upload image. Please try again.",
                            None,
                        );
                    }
                }
            }
            "options" => {
                let raw = field.text().await.unwrap_or_default();
                if !raw.is_empty() {
                    match serde_json::from_str(&raw) {
                        Ok(parsed) => options = parsed,
                        Err(e) => warn!("Ignoring malformed options field: {}", e),
                    }
                }
            }
            "userProfile" => {
                let raw = field.text().await.unwrap_or_default();
                if !raw.is_empty() {
                    match serde_json::from_str(&raw) {
                        Ok(parsed) => profile = Some(parsed),
                        Err(e) => warn!("Ignoring malformed userProfile field: {}", e),
                    }
                }
            }
            _ => {}
        }
    }

    let Some((bytes, mime)) = image else {
        return error_response(StatusCode::BAD_REQUEST, "No image file provided", None);
    };

    info!("Starting food analysis, upload size {} bytes", bytes.len());

    let result = run_analysis(&state, &bytes, &mime, &options, profile.as_ref()).await;
    match result {
        Ok(analysis) => {
            info!(
                "Analysis completed: {} foods, {:.0} kcal, confidence {:.2}, {:.2}s",
                analysis.foods.len(),
                analysis.nutrition.calories,
                analysis.overall_confidence,
                analysis.processing_time
            );
            let processing_time = analysis.processing_time;
            let payload = ApiResponse {
                success: true,
                data: Some(AnalyzeFoodResponse { analysis }),
                error: None,
                message: None,
                processing_time: Some(processing_time),
            };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => {
            let (status, message) = status_for(&e);
            let detail = state.config.server.development.then(|| e.to_string());
            warn!("Food analysis error: {}", e);
            error_response(status, &message, detail)
        }
    }
}

async fn run_analysis(
    state: &AppState,
    bytes: &[u8],
    mime: &str,
    options: &AnalysisOptions,
    profile: Option<&UserProfile>,
) -> Result<NutritionAnalysis, AnalysisError> {
    image_prep::validate_upload(bytes, mime, &state.config.image)?;
    let prepared = image_prep::prepare_image(bytes, &state.config.image)?;
    info!(
        "Image processed: {}x{}, {} bytes",
        prepared.width, prepared.height, prepared.size
    );
    state
        .analyzer
        .analyze_food(&prepared.to_data_url(), options, profile)
        .await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Food analysis API is running",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn status_for(error: &AnalysisError) -> (StatusCode, String) {
    match error {
        AnalysisError::InvalidImage(message) => (StatusCode::BAD_REQUEST, message.clone()),
        AnalysisError::ImageProcessingFailed(_) => (
            StatusCode::BAD_REQUEST,
            "Failed to process image. Please try a different image.".to_string(),
        ),
        AnalysisError::Provider(ProviderError::RateLimited) => (
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.".to_string(),
        ),
        AnalysisError::Provider(ProviderError::Timeout) => (
            StatusCode::REQUEST_TIMEOUT,
            "Analysis timeout. Please try again.".to_string(),
        ),
        AnalysisError::Provider(ProviderError::MissingCredential(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "API configuration error".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to analyze the image. Please try again.".to_string(),
        ),
    }
}

fn error_response(status: StatusCode, error: &str, detail: Option<String>) -> Response {
    let payload = ApiResponse::<AnalyzeFoodResponse> {
        success: false,
        data: None,
        error: Some(error.to_string()),
        message: detail,
        processing_time: None,
    };
    (status, Json(payload)).into_response()
}
