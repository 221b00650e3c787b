//! Analytics Aggregator.
//!
//! Twelve independent counts (five totals, seven day windows) are issued
//! concurrently and joined; the first failure aborts the whole snapshot.
//! All day windows derive from one reference instant, so adjacent windows
//! share an edge and never overlap.

use chrono::{DateTime, Duration, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::models::message::{MessageStatus, MessageType};
use crate::models::target::ConnectionStatus;
use crate::store::{Collection, DocumentStore, Filter, StoreError};

pub const ACTIVITY_DAYS: usize = 7;

#[derive(Debug, Error)]
#[error("Analytics query failed: {0}")]
pub struct AggregationError(#[from] pub StoreError);

/// Per-day message counts, most recent day first. Serializes as a JSON
/// object keyed by `YYYY-MM-DD`, preserving that order.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyActivity(pub Vec<(String, u64)>);

impl Serialize for DailyActivity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (day, count) in &self.0 {
            map.serialize_entry(day, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_targets: u64,
    pub connections_sent: u64,
    pub connections_accepted: u64,
    pub messages_sent: u64,
    pub messages_replied: u64,
    pub acceptance_rate: f64,
    pub reply_rate: f64,
    pub daily_activity: DailyActivity,
}

/// A labelled half-open window `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DayWindow {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The seven trailing 24h windows ending at `now`, most recent first.
/// Window `i` covers `[now - (i+1)d, now - i d)` and is labelled with the
/// calendar date of its end.
pub fn day_windows(now: DateTime<Utc>) -> Vec<DayWindow> {
    (0..ACTIVITY_DAYS as i64)
        .map(|i| {
            let end = now - Duration::days(i);
            DayWindow {
                label: end.format("%Y-%m-%d").to_string(),
                start: end - Duration::days(1),
                end,
            }
        })
        .collect()
}

/// `100 * numerator / max(denominator, 1)`, rounded to 2 places, kept in [0, 100].
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    let raw = numerator as f64 * 100.0 / denominator.max(1) as f64;
    ((raw * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

pub async fn compute(
    store: &dyn DocumentStore,
    now: DateTime<Utc>,
) -> Result<AnalyticsSnapshot, AggregationError> {
    let all = Filter::all();
    let connections_sent_filter = Filter::all()
        .eq("message_type", MessageType::ConnectionRequest.as_str())
        .eq("status", MessageStatus::Sent.as_str());
    let accepted_filter = Filter::all().eq("connection_status", ConnectionStatus::Connected.as_str());
    let sent_filter = Filter::all().eq("status", MessageStatus::Sent.as_str());
    let replied_filter = Filter::all().eq("status", MessageStatus::Replied.as_str());

    let windows = day_windows(now);
    let day_filters: Vec<Filter> = windows
        .iter()
        .map(|w| Filter::all().within("created_at", w.start, w.end))
        .collect();

    let (
        total_targets,
        connections_sent,
        connections_accepted,
        messages_sent,
        messages_replied,
        d0,
        d1,
        d2,
        d3,
        d4,
        d5,
        d6,
    ) = tokio::try_join!(
        store.count(Collection::Targets, &all),
        store.count(Collection::Messages, &connections_sent_filter),
        store.count(Collection::Targets, &accepted_filter),
        store.count(Collection::Messages, &sent_filter),
        store.count(Collection::Messages, &replied_filter),
        store.count(Collection::Messages, &day_filters[0]),
        store.count(Collection::Messages, &day_filters[1]),
        store.count(Collection::Messages, &day_filters[2]),
        store.count(Collection::Messages, &day_filters[3]),
        store.count(Collection::Messages, &day_filters[4]),
        store.count(Collection::Messages, &day_filters[5]),
        store.count(Collection::Messages, &day_filters[6]),
    )?;

    let daily_activity = DailyActivity(
        windows
            .into_iter()
            .zip([d0, d1, d2, d3, d4, d5, d6])
            .map(|(w, count)| (w.label, count))
            .collect(),
    );

    debug!(
        total_targets,
        connections_sent, messages_sent, "Analytics snapshot computed"
    );

    Ok(AnalyticsSnapshot {
        total_targets,
        connections_sent,
        connections_accepted,
        messages_sent,
        messages_replied,
        acceptance_rate: percentage(connections_accepted, connections_sent),
        reply_rate: percentage(messages_replied, messages_sent),
        daily_activity,
    })
}
