use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::audit::{AuditLog, RESOURCE_BOOKING};
use crate::db::models::{booking_status, Booking};
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Booking>>> {
    session.require_admin()?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let bookings = queries::list_bookings(&state.db, query.status, limit, offset).await?;
    Ok(Json(bookings))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub status: Option<String>,
    pub featured: Option<bool>,
}

/// Mutates whichever of `status`/`featured` the body carries. Status values
/// are checked against the known set, but any prior status may be
/// overwritten by any other; the lifecycle is deliberately permissive.
pub async fn update_booking(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>> {
    session.require_admin()?;

    if req.status.is_none() && req.featured.is_none() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    if let Some(status) = &req.status {
        if !booking_status::is_known(status) {
            return Err(AppError::Validation(format!(
                "Unknown booking status '{}'",
                status
            )));
        }
    }

    let mut tx = state.db.begin().await?;

    let before = queries::get_booking_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

    let after = queries::update_booking(&mut tx, id, req.status.as_deref(), req.featured)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

    let mut diff = serde_json::Map::new();
    if req.status.is_some() {
        diff.insert(
            "status".to_string(),
            json!({ "old": before.status, "new": after.status }),
        );
    }
    if req.featured.is_some() {
        diff.insert(
            "featured".to_string(),
            json!({ "old": before.featured, "new": after.featured }),
        );
    }

    AuditLog::record(
        &mut tx,
        session.user_id,
        "booking_update",
        RESOURCE_BOOKING,
        id,
        serde_json::Value::Object(diff),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(after))
}
