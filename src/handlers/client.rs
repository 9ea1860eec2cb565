use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::models::Booking;
use crate::db::queries::{self, NewBooking};
use crate::error::{AppError, Result};
use crate::services::commission::agent_earnings;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub tour_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Checkout: the booking starts PENDING/PENDING and the agent's share is
/// fixed here from their current commission rate.
pub async fn create_booking(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>)> {
    if req.start_date >= req.end_date {
        return Err(AppError::Validation(
            "start_date must be before end_date".to_string(),
        ));
    }
    if req.start_date < Utc::now().date_naive() {
        return Err(AppError::Validation(
            "start_date must not be in the past".to_string(),
        ));
    }

    let tour = queries::get_published_tour(&state.db, req.tour_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tour {} not found", req.tour_id)))?;

    let agent = queries::get_agent(&state.db, tour.agent_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour operator not found".to_string()))?;

    let total_amount = tour.price.clone();
    let earnings = agent_earnings(&total_amount, &agent.commission_rate);

    let booking = queries::insert_booking(
        &state.db,
        &NewBooking {
            tour_id: tour.id,
            user_id: session.user_id,
            agent_id: agent.id,
            total_amount,
            agent_earnings: earnings,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_my_bookings(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Vec<Booking>>> {
    let bookings = queries::list_user_bookings(&state.db, session.user_id).await?;
    Ok(Json(bookings))
}
