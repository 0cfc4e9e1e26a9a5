//! Room analysis endpoint
//!
//! `POST /analyze-room` takes a multipart form with an `image` file and a
//! `vibe` string. The configured pipeline decides the response shape.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use kairos_common::{DetectedObject, Product, RoomLayout, Suggestion};
use serde::Serialize;
use tracing::info;

use crate::config::PipelineMode;
use crate::services::{self, UploadedImage};
use crate::{ApiError, ApiResult, AppState};

/// Parsed multipart form
#[derive(Debug)]
pub struct AnalyzeForm {
    pub image: UploadedImage,
    pub vibe: String,
}

/// Rules pipeline response
#[derive(Debug, Serialize)]
pub struct RulesResponse {
    pub suggestions: Vec<Suggestion>,
    pub layout: Vec<DetectedObject>,
    pub vibe_tags: Vec<String>,
}

/// Assisted pipeline response
#[derive(Debug, Serialize)]
pub struct AssistedResponse {
    pub suggestions: Vec<Suggestion>,
    pub layout: RoomLayout,
    pub vibe_tags: Vec<String>,
    pub gemini_design_ideas: String,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Rules(RulesResponse),
    Assisted(AssistedResponse),
}

/// Collect the `image` and `vibe` fields; unknown fields are skipped
async fn read_form(mut multipart: Multipart) -> ApiResult<AnalyzeForm> {
    let mut image = None;
    let mut vibe = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("vibe") => {
                vibe = Some(field.text().await?);
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unexpected form field");
            }
        }
    }

    Ok(AnalyzeForm {
        image: image.ok_or(ApiError::MissingField("image"))?,
        vibe: vibe.ok_or(ApiError::MissingField("vibe"))?,
    })
}

/// POST /analyze-room
pub async fn analyze_room(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let form = read_form(multipart).await?;

    info!(
        pipeline = %state.config.pipeline,
        file_name = ?form.image.file_name,
        bytes = form.image.bytes.len(),
        vibe = %form.vibe,
        "Analyzing room"
    );

    let response = match state.config.pipeline {
        PipelineMode::Rules => AnalyzeResponse::Rules(run_rules(&state, form).await?),
        PipelineMode::Assisted => AnalyzeResponse::Assisted(run_assisted(&state, form).await?),
    };

    Ok(Json(response))
}

/// Upload → stub detection → vibe tags → rule table
pub async fn run_rules(state: &AppState, form: AnalyzeForm) -> ApiResult<RulesResponse> {
    let image_path = services::save_upload(&state.config.upload_dir, &form.image).await?;

    let layout = services::process_image(&image_path);
    let vibe_tags = services::parse_vibe(&form.vibe);
    let suggestions = services::generate_suggestions(&layout, &vibe_tags);

    Ok(RulesResponse {
        suggestions,
        layout,
        vibe_tags,
    })
}

/// Upload → stub layout → fixed suggestions → model call → one product
/// search per suggestion, all sequential
pub async fn run_assisted(state: &AppState, form: AnalyzeForm) -> ApiResult<AssistedResponse> {
    // No outbound call unless both services can be reached
    let missing = state.config.missing_credentials();
    if !missing.is_empty() {
        return Err(ApiError::Config(format!(
            "Assisted pipeline needs credentials: {}",
            missing.join(", ")
        )));
    }

    let temp_file = services::save_temp_upload(&form.image).await?;

    let layout = services::analyze_layout(temp_file.path());
    let suggestions = services::fixed_suggestions(&layout);
    let vibe_tags = services::parse_vibe(&form.vibe);

    let gemini_design_ideas = state
        .gemini
        .generate_design_ideas(temp_file.path(), form.image.mime_type(), &form.vibe)
        .await?;

    let mut products = Vec::new();
    for suggestion in &suggestions {
        products.extend(state.shopping.search(&suggestion.item).await?);
    }

    Ok(AssistedResponse {
        suggestions,
        layout,
        vibe_tags,
        gemini_design_ideas,
        products,
    })
}

/// Build room analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze-room", post(analyze_room))
}
