// Derived outreach counters over the stored records.

pub mod aggregator;
pub mod handlers;

pub use aggregator::{compute, AggregationError, AnalyticsSnapshot};
