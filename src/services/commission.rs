use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::models::{AgentRevenueRow, CommissionTier};

/// Start of the current calendar month in UTC.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .expect("first of month is always a valid timestamp")
}

/// The agent's share of a booking, fixed at creation time.
pub fn agent_earnings(total_amount: &BigDecimal, commission_rate: &BigDecimal) -> BigDecimal {
    (total_amount * commission_rate).round(2)
}

/// Highest tier whose booking-count and revenue thresholds are both met.
pub fn classify_tier<'a>(
    tiers: &'a [CommissionTier],
    booking_count: i64,
    lifetime_revenue: &BigDecimal,
) -> Option<&'a CommissionTier> {
    tiers
        .iter()
        .filter(|t| i64::from(t.min_bookings) <= booking_count && &t.min_revenue <= lifetime_revenue)
        .max_by(|a, b| {
            (&a.min_revenue, a.min_bookings).cmp(&(&b.min_revenue, b.min_bookings))
        })
}

#[derive(Debug, Clone, Serialize)]
pub struct TopAgent {
    pub id: Uuid,
    pub company_name: String,
    pub revenue: BigDecimal,
    pub bookings: i64,
    pub rating: Option<f64>,
}

/// Rank agents by current-month revenue, descending, ties kept in input
/// order. Zero-revenue agents never appear.
pub fn rank_top_agents(
    rows: Vec<AgentRevenueRow>,
    ratings: &HashMap<Uuid, f64>,
    limit: usize,
) -> Vec<TopAgent> {
    let mut ranked: Vec<TopAgent> = rows
        .into_iter()
        .filter(|row| row.revenue > BigDecimal::from(0))
        .map(|row| TopAgent {
            rating: ratings.get(&row.agent_id).map(|r| round_one_decimal(*r)),
            id: row.agent_id,
            company_name: row.company_name,
            revenue: row.revenue,
            bookings: row.booking_count,
        })
        .collect();

    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked.truncate(limit);
    ranked
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
