use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Booking lifecycle states. No transition table is enforced server-side;
/// any known value may overwrite any other (see admin/agent booking patches).
pub mod booking_status {
    pub const PENDING: &str = "PENDING";
    pub const CONFIRMED: &str = "CONFIRMED";
    pub const PAID: &str = "PAID";
    pub const IN_PROGRESS: &str = "IN_PROGRESS";
    pub const COMPLETED: &str = "COMPLETED";
    pub const CANCELLED: &str = "CANCELLED";

    pub const ALL: [&str; 6] = [PENDING, CONFIRMED, PAID, IN_PROGRESS, COMPLETED, CANCELLED];

    /// Statuses whose earnings count towards agent revenue.
    pub const REVENUE_QUALIFYING: [&str; 4] = [CONFIRMED, PAID, IN_PROGRESS, COMPLETED];

    pub fn is_known(value: &str) -> bool {
        ALL.contains(&value)
    }
}

pub mod agent_status {
    pub const PENDING: &str = "PENDING";
    pub const ACTIVE: &str = "ACTIVE";
    pub const INACTIVE: &str = "INACTIVE";
    pub const SUSPENDED: &str = "SUSPENDED";
}

pub mod tour_status {
    pub const DRAFT: &str = "DRAFT";
    pub const PUBLISHED: &str = "PUBLISHED";
    pub const ARCHIVED: &str = "ARCHIVED";
}

pub mod review_status {
    pub const PENDING: &str = "PENDING";
    pub const APPROVED: &str = "APPROVED";
    pub const REJECTED: &str = "REJECTED";
}

pub mod withdrawal_status {
    pub const PENDING: &str = "PENDING";
    pub const COMPLETED: &str = "COMPLETED";
    pub const REJECTED: &str = "REJECTED";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub status: String,
    pub payment_status: String,
    pub total_amount: BigDecimal,
    pub agent_earnings: BigDecimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub commission_rate: BigDecimal,
    pub is_verified: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tour {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub price: BigDecimal,
    pub duration_days: i32,
    pub status: String,
    pub featured: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub status: String,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommissionTier {
    pub id: Uuid,
    pub name: String,
    pub min_bookings: i32,
    pub min_revenue: BigDecimal,
    pub commission_rate: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WithdrawalRequest {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub amount: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub tour_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Per-agent revenue row for the current month, input to the top-agent ranking.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AgentRevenueRow {
    pub agent_id: Uuid,
    pub company_name: String,
    pub revenue: BigDecimal,
    pub booking_count: i64,
}

/// Average approved-review rating across one agent's tours.
#[derive(Debug, Clone, FromRow)]
pub struct AgentRatingRow {
    pub agent_id: Uuid,
    pub avg_rating: Option<f64>,
}
