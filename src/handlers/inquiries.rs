use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::Inquiry;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::validation::{classify_submission, BotVerdict};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InquiryRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub tour_id: Option<Uuid>,
    /// Honeypot field, rendered hidden; humans leave it empty.
    #[serde(default)]
    pub website: String,
    /// Milliseconds since the form was rendered.
    #[serde(default)]
    pub elapsed_ms: u64,
}

/// Public contact form. Submissions classified as automated are rejected
/// before any data access; the classifier is a heuristic, not a security
/// boundary.
pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(req): Json<InquiryRequest>,
) -> Result<(StatusCode, Json<Inquiry>)> {
    match classify_submission(&req.website, req.elapsed_ms) {
        BotVerdict::Human => {}
        BotVerdict::HoneypotTripped | BotVerdict::TooFast => {
            return Err(AppError::BadRequest("Submission rejected".to_string()));
        }
    }

    if req.name.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::Validation(
            "Name and message are required".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let inquiry = queries::insert_inquiry(
        &state.db,
        req.tour_id,
        req.name.trim(),
        req.email.trim(),
        req.message.trim(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(inquiry)))
}
