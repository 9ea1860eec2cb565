use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Result, Transaction};
use uuid::Uuid;

use crate::db::models::{
    Agent, AgentRatingRow, AgentRevenueRow, Booking, CommissionTier, Inquiry, Review, Tour,
    WithdrawalRequest,
};

// ---------------------------------------------------------------------------
// Bookings

pub async fn get_booking(pool: &PgPool, id: Uuid) -> Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_booking_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn list_bookings(
    pool: &PgPool,
    status: Option<String>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Booking>> {
    sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn list_user_bookings(pool: &PgPool, user_id: Uuid) -> Result<Vec<Booking>> {
    sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list_agent_bookings(
    pool: &PgPool,
    agent_id: Uuid,
    status: Option<String>,
) -> Result<Vec<Booking>> {
    sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE agent_id = $1 AND ($2::text IS NULL OR status = $2) \
         ORDER BY created_at DESC",
    )
    .bind(agent_id)
    .bind(status)
    .fetch_all(pool)
    .await
}

pub async fn get_agent_booking(
    pool: &PgPool,
    agent_id: Uuid,
    id: Uuid,
) -> Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 AND agent_id = $2")
        .bind(id)
        .bind(agent_id)
        .fetch_optional(pool)
        .await
}

pub struct NewBooking {
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub total_amount: BigDecimal,
    pub agent_earnings: BigDecimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn insert_booking(pool: &PgPool, new: &NewBooking) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings (tour_id, user_id, agent_id, total_amount, agent_earnings, start_date, end_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(new.tour_id)
    .bind(new.user_id)
    .bind(new.agent_id)
    .bind(&new.total_amount)
    .bind(&new.agent_earnings)
    .bind(new.start_date)
    .bind(new.end_date)
    .fetch_one(pool)
    .await
}

/// Fields left as None are preserved. No transition table is checked here.
pub async fn update_booking(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: Option<&str>,
    featured: Option<bool>,
) -> Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET status = COALESCE($2, status), featured = COALESCE($3, featured), \
         updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(featured)
    .fetch_optional(&mut **tx)
    .await
}

// ---------------------------------------------------------------------------
// Agents

pub async fn get_agent(pool: &PgPool, id: Uuid) -> Result<Option<Agent>> {
    sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_agent_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Agent>> {
    sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_agent_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Agent>> {
    sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn list_agents(pool: &PgPool, status: Option<String>) -> Result<Vec<Agent>> {
    sqlx::query_as::<_, Agent>(
        "SELECT * FROM agents WHERE ($1::text IS NULL OR status = $1) ORDER BY created_at DESC",
    )
    .bind(status)
    .fetch_all(pool)
    .await
}

/// Verification promotes PENDING agents to ACTIVE; unverifying only clears
/// the flag and leaves the status untouched.
pub async fn set_agent_verification(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    verified: bool,
) -> Result<Option<Agent>> {
    sqlx::query_as::<_, Agent>(
        "UPDATE agents SET is_verified = $2, \
         status = CASE WHEN $2 AND status = 'PENDING' THEN 'ACTIVE' ELSE status END \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(verified)
    .fetch_optional(&mut **tx)
    .await
}

// ---------------------------------------------------------------------------
// Tours

pub async fn get_published_tour(pool: &PgPool, id: Uuid) -> Result<Option<Tour>> {
    sqlx::query_as::<_, Tour>("SELECT * FROM tours WHERE id = $1 AND status = 'PUBLISHED'")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_published_tours(
    pool: &PgPool,
    destination: Option<String>,
    featured: Option<bool>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Tour>> {
    sqlx::query_as::<_, Tour>(
        "SELECT * FROM tours WHERE status = 'PUBLISHED' \
         AND ($1::text IS NULL OR destination = $1) \
         AND ($2::bool IS NULL OR featured = $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(destination)
    .bind(featured)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn increment_tour_views(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE tours SET view_count = view_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reviews

pub async fn get_review(pool: &PgPool, id: Uuid) -> Result<Option<Review>> {
    sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn review_exists(pool: &PgPool, tour_id: Uuid, user_id: Uuid) -> Result<bool> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT 1 FROM reviews WHERE tour_id = $1 AND user_id = $2")
            .bind(tour_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn insert_review(
    pool: &PgPool,
    tour_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: &str,
) -> Result<Review> {
    sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (tour_id, user_id, rating, comment) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(tour_id)
    .bind(user_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(pool)
    .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HelpfulAction {
    Added,
    Removed,
}

/// Toggle one user's helpful vote on a review. The join-row mutation and the
/// denormalized counter update commit or roll back together, which is the
/// only thing keeping `helpful_count` equal to the live row count under
/// concurrent votes.
pub async fn toggle_review_helpful(
    pool: &PgPool,
    review_id: Uuid,
    user_id: Uuid,
) -> Result<(HelpfulAction, i32)> {
    let mut tx = pool.begin().await?;

    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT 1 FROM review_helpful WHERE review_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(review_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (action, count) = if existing.is_some() {
        sqlx::query("DELETE FROM review_helpful WHERE review_id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let (count,): (i32,) = sqlx::query_as(
            "UPDATE reviews SET helpful_count = helpful_count - 1 WHERE id = $1 RETURNING helpful_count",
        )
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await?;
        (HelpfulAction::Removed, count)
    } else {
        sqlx::query("INSERT INTO review_helpful (review_id, user_id) VALUES ($1, $2)")
            .bind(review_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let (count,): (i32,) = sqlx::query_as(
            "UPDATE reviews SET helpful_count = helpful_count + 1 WHERE id = $1 RETURNING helpful_count",
        )
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await?;
        (HelpfulAction::Added, count)
    };

    tx.commit().await?;
    Ok((action, count))
}

// ---------------------------------------------------------------------------
// Commission tiers

pub async fn list_tiers(pool: &PgPool) -> Result<Vec<CommissionTier>> {
    sqlx::query_as::<_, CommissionTier>(
        "SELECT * FROM commission_tiers ORDER BY min_revenue ASC, min_bookings ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn insert_tier(
    pool: &PgPool,
    name: &str,
    min_bookings: i32,
    min_revenue: &BigDecimal,
    commission_rate: &BigDecimal,
) -> Result<CommissionTier> {
    sqlx::query_as::<_, CommissionTier>(
        "INSERT INTO commission_tiers (name, min_bookings, min_revenue, commission_rate) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(min_bookings)
    .bind(min_revenue)
    .bind(commission_rate)
    .fetch_one(pool)
    .await
}

pub async fn update_tier(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    min_bookings: i32,
    min_revenue: &BigDecimal,
    commission_rate: &BigDecimal,
) -> Result<Option<CommissionTier>> {
    sqlx::query_as::<_, CommissionTier>(
        "UPDATE commission_tiers SET name = $2, min_bookings = $3, min_revenue = $4, \
         commission_rate = $5 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(min_bookings)
    .bind(min_revenue)
    .bind(commission_rate)
    .fetch_optional(pool)
    .await
}

pub async fn delete_tier(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM commission_tiers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Withdrawals

pub async fn insert_withdrawal(
    pool: &PgPool,
    agent_id: Uuid,
    amount: &BigDecimal,
) -> Result<WithdrawalRequest> {
    sqlx::query_as::<_, WithdrawalRequest>(
        "INSERT INTO withdrawal_requests (agent_id, amount) VALUES ($1, $2) RETURNING *",
    )
    .bind(agent_id)
    .bind(amount)
    .fetch_one(pool)
    .await
}

pub async fn list_withdrawals(
    pool: &PgPool,
    status: Option<String>,
) -> Result<Vec<WithdrawalRequest>> {
    sqlx::query_as::<_, WithdrawalRequest>(
        "SELECT * FROM withdrawal_requests WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at DESC",
    )
    .bind(status)
    .fetch_all(pool)
    .await
}

pub async fn list_agent_withdrawals(
    pool: &PgPool,
    agent_id: Uuid,
) -> Result<Vec<WithdrawalRequest>> {
    sqlx::query_as::<_, WithdrawalRequest>(
        "SELECT * FROM withdrawal_requests WHERE agent_id = $1 ORDER BY created_at DESC",
    )
    .bind(agent_id)
    .fetch_all(pool)
    .await
}

pub async fn get_withdrawal(pool: &PgPool, id: Uuid) -> Result<Option<WithdrawalRequest>> {
    sqlx::query_as::<_, WithdrawalRequest>("SELECT * FROM withdrawal_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Only PENDING requests are processable; a second process attempt finds no
/// matching row and yields None.
pub async fn process_withdrawal(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Option<WithdrawalRequest>> {
    sqlx::query_as::<_, WithdrawalRequest>(
        "UPDATE withdrawal_requests SET status = $2, processed_at = NOW() \
         WHERE id = $1 AND status = 'PENDING' RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(&mut **tx)
    .await
}

/// Amount already paid out or still reserved by open requests.
pub async fn agent_reserved_amount(pool: &PgPool, agent_id: Uuid) -> Result<BigDecimal> {
    let (total,): (BigDecimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0) FROM withdrawal_requests \
         WHERE agent_id = $1 AND status <> 'REJECTED'",
    )
    .bind(agent_id)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

// ---------------------------------------------------------------------------
// Inquiries

pub async fn insert_inquiry(
    pool: &PgPool,
    tour_id: Option<Uuid>,
    name: &str,
    email: &str,
    message: &str,
) -> Result<Inquiry> {
    sqlx::query_as::<_, Inquiry>(
        "INSERT INTO inquiries (tour_id, name, email, message) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(tour_id)
    .bind(name)
    .bind(email)
    .bind(message)
    .fetch_one(pool)
    .await
}

// ---------------------------------------------------------------------------
// Reporting aggregates

/// Current-month revenue per verified, active agent. Agents with no
/// qualifying booking since `since` produce no row.
pub async fn monthly_agent_revenue(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<AgentRevenueRow>> {
    sqlx::query_as::<_, AgentRevenueRow>(
        "SELECT a.id AS agent_id, a.company_name, \
                SUM(b.agent_earnings) AS revenue, COUNT(b.id) AS booking_count \
         FROM agents a \
         JOIN bookings b ON b.agent_id = a.id \
         WHERE a.is_verified AND a.status = 'ACTIVE' \
           AND b.created_at >= $1 \
           AND b.status IN ('CONFIRMED', 'PAID', 'IN_PROGRESS', 'COMPLETED') \
         GROUP BY a.id, a.company_name \
         HAVING SUM(b.agent_earnings) > 0",
    )
    .bind(since)
    .fetch_all(pool)
    .await
}

pub async fn agent_average_ratings(pool: &PgPool) -> Result<Vec<AgentRatingRow>> {
    sqlx::query_as::<_, AgentRatingRow>(
        "SELECT t.agent_id, AVG(r.rating)::float8 AS avg_rating \
         FROM reviews r \
         JOIN tours t ON t.id = r.tour_id \
         WHERE r.status = 'APPROVED' \
         GROUP BY t.agent_id",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EarningsTotals {
    pub monthly_revenue: BigDecimal,
    pub lifetime_revenue: BigDecimal,
    pub booking_count: i64,
}

pub async fn agent_earnings_totals(
    pool: &PgPool,
    agent_id: Uuid,
    month_start: DateTime<Utc>,
) -> Result<EarningsTotals> {
    sqlx::query_as::<_, EarningsTotals>(
        "SELECT COALESCE(SUM(agent_earnings) FILTER (WHERE created_at >= $2), 0) AS monthly_revenue, \
                COALESCE(SUM(agent_earnings), 0) AS lifetime_revenue, \
                COUNT(*) AS booking_count \
         FROM bookings \
         WHERE agent_id = $1 \
           AND status IN ('CONFIRMED', 'PAID', 'IN_PROGRESS', 'COMPLETED')",
    )
    .bind(agent_id)
    .bind(month_start)
    .fetch_one(pool)
    .await
}

// ---------------------------------------------------------------------------
// Platform aggregates

pub async fn count_bookings(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_verified_agents(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agents WHERE is_verified")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn average_approved_rating(pool: &PgPool) -> Result<Option<f64>> {
    let (avg,): (Option<f64>,) =
        sqlx::query_as("SELECT AVG(rating)::float8 FROM reviews WHERE status = 'APPROVED'")
            .fetch_one(pool)
            .await?;
    Ok(avg)
}

pub async fn total_paid_to_agents(pool: &PgPool) -> Result<BigDecimal> {
    let (total,): (BigDecimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0) FROM withdrawal_requests WHERE status = 'COMPLETED'",
    )
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn count_active_tours(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tours WHERE status = 'PUBLISHED'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
