use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::models::Review;
use crate::db::queries::{self, HelpfulAction};
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub tour_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// One review per (user, tour), enforced with an existence check before the
/// insert. New reviews await moderation.
pub async fn create_review(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    queries::get_published_tour(&state.db, req.tour_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tour {} not found", req.tour_id)))?;

    if queries::review_exists(&state.db, req.tour_id, session.user_id).await? {
        return Err(AppError::BadRequest(
            "You have already reviewed this tour".to_string(),
        ));
    }

    let review = queries::insert_review(
        &state.db,
        req.tour_id,
        session.user_id,
        req.rating,
        req.comment.trim(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

#[derive(Debug, Serialize)]
pub struct HelpfulResponse {
    pub action: HelpfulAction,
    pub helpful_count: i32,
}

/// Toggle the caller's helpful vote. Self-votes are rejected; the counter
/// and the vote row move together inside one transaction.
pub async fn toggle_helpful(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<HelpfulResponse>> {
    let review = queries::get_review(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))?;

    if review.user_id == session.user_id {
        return Err(AppError::BadRequest(
            "You cannot mark your own review as helpful".to_string(),
        ));
    }

    let (action, helpful_count) =
        queries::toggle_review_helpful(&state.db, id, session.user_id).await?;

    Ok(Json(HelpfulResponse {
        action,
        helpful_count,
    }))
}
