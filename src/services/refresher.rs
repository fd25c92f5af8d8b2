//! Refreshes the volatile fields (score, wish count, cover) of stored records.

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::pacer::Pacer;
use crate::clients::{Catalog, Subject};
use crate::config::RefresherConfig;
use crate::models::{AnimeRecord, Document};
use crate::store::{DocumentStore, StoreError};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshStats {
    pub refreshed: usize,
    /// Responses without a rating block; the record was left as is.
    pub unchanged: usize,
    /// Records without an id.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub stats: RefreshStats,
    pub last_updated: String,
    pub total: usize,
}

pub struct Refresher<C> {
    catalog: C,
    delay: Duration,
    offset: FixedOffset,
}

impl<C: Catalog> Refresher<C> {
    pub fn new(catalog: C, config: &RefresherConfig) -> anyhow::Result<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600).with_context(|| {
            format!("Invalid UTC offset: {} hours", config.utc_offset_hours)
        })?;

        Ok(Self {
            catalog,
            delay: config.delay(),
            offset,
        })
    }

    /// Re-fetches every record that has an id and applies its volatile fields.
    pub async fn refresh_records(&self, records: &mut [AnimeRecord]) -> RefreshStats {
        let mut stats = RefreshStats::default();
        let mut pacer = Pacer::new(self.delay);
        let total = records.len();

        for (index, record) in records.iter_mut().enumerate() {
            let Some(id) = record.id else {
                stats.skipped += 1;
                continue;
            };

            pacer.ready().await;

            match self.catalog.get_subject(id).await {
                Ok(subject) => {
                    if apply_volatile_fields(record, &subject) {
                        stats.refreshed += 1;
                        info!(
                            progress = format!("{}/{}", index + 1, total),
                            title = %record.display_title(),
                            score = record.score,
                            wish = record.wish,
                            "Refreshed"
                        );
                    } else {
                        stats.unchanged += 1;
                        debug!(id = %id, "No rating in response, keeping stored values");
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!(title = %record.display_title(), error = %e, "Refresh failed");
                }
            }
        }

        stats
    }

    /// Loads the document, refreshes it and writes it back in the wrapped shape.
    ///
    /// The document is written even when individual refreshes failed. A
    /// document in neither known shape aborts the run before any request.
    pub async fn run(&self, store: &DocumentStore) -> Result<RefreshOutcome, StoreError> {
        let document = store.load().await.inspect_err(|e| {
            error!(error = %e, "Cannot read anime list, nothing refreshed");
        })?;

        let mut items = document.into_items();
        info!(
            event = "refresh_started",
            count = items.len(),
            "Refreshing stored anime"
        );

        let stats = self.refresh_records(&mut items).await;
        let last_updated = format_timestamp(Utc::now(), self.offset);
        let total = items.len();

        store
            .save(&Document::wrapped(last_updated.clone(), items))
            .await?;

        info!(
            event = "refresh_finished",
            refreshed = stats.refreshed,
            unchanged = stats.unchanged,
            skipped = stats.skipped,
            failed = stats.failed,
            last_updated = %last_updated,
            "Refresh complete"
        );

        Ok(RefreshOutcome {
            stats,
            last_updated,
            total,
        })
    }
}

/// Copies score, wish count and cover from a fresh response.
///
/// Nothing changes unless the response carries a rating block; within it,
/// wish and cover are only overwritten when their own blocks are present.
/// Returns whether the record was updated.
pub fn apply_volatile_fields(record: &mut AnimeRecord, subject: &Subject) -> bool {
    let Some(rating) = &subject.rating else {
        return false;
    };

    record.score = rating.score.unwrap_or(0.0);

    if let Some(collection) = &subject.collection {
        record.wish = collection.wish.unwrap_or(0);
    }

    if let Some(cover) = subject.images.as_ref().and_then(|i| i.common.as_ref()) {
        record.cover.clone_from(cover);
    }

    true
}

#[must_use]
pub fn format_timestamp(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string()
}
