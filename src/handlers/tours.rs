use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::Tour;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Deserialize)]
pub struct TourListQuery {
    pub destination: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<TourListQuery>,
) -> Result<Json<Vec<Tour>>> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let tours = queries::list_published_tours(
        &state.db,
        query.destination,
        query.featured,
        limit,
        offset,
    )
    .await?;
    Ok(Json(tours))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tour>> {
    let tour = queries::get_published_tour(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tour {} not found", id)))?;

    // Best-effort view counter; a failure must never fail the read.
    let pool = state.db.clone();
    tokio::spawn(async move {
        if let Err(e) = queries::increment_tour_views(&pool, id).await {
            tracing::warn!("View count increment failed for tour {}: {:?}", id, e);
        }
    });

    Ok(Json(tour))
}
