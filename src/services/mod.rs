pub mod commission;
pub mod stats_cache;
