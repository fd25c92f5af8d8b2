//! Collects every subject matching the configured tags into a fresh document.

use futures::StreamExt;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

use super::pacer::Pacer;
use super::transform::to_record;
use crate::clients::{Catalog, SubjectQuery};
use crate::config::CollectorConfig;
use crate::domain::SubjectId;
use crate::models::{AnimeRecord, Document};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectSummary {
    pub discovered: usize,
    pub collected: usize,
    pub written: bool,
}

pub struct Collector<C> {
    catalog: C,
    query: SubjectQuery,
    page_size: u32,
    page_delay: Duration,
    detail_delay: Duration,
}

impl<C: Catalog> Collector<C> {
    pub fn new(catalog: C, config: &CollectorConfig) -> Self {
        Self {
            catalog,
            query: config.query(),
            page_size: config.page_size,
            page_delay: config.page_delay(),
            detail_delay: config.detail_delay(),
        }
    }

    /// Pages through the search endpoint and returns every matching id once,
    /// in first-seen order.
    ///
    /// A failed page ends the scan; ids gathered before it are still returned.
    pub async fn discover_ids(&self) -> Vec<SubjectId> {
        info!(
            event = "discovery_started",
            tags = ?self.query.tags,
            "Searching catalog for matching subjects"
        );

        let mut pacer = Pacer::new(self.page_delay);
        let mut offset = 0u32;
        let mut found: Vec<SubjectId> = Vec::new();

        loop {
            pacer.ready().await;

            let page = match self
                .catalog
                .search_subjects(&self.query, self.page_size, offset)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!(offset, error = %e, "Subject search failed");
                    break;
                }
            };

            if page.data.is_empty() {
                break;
            }

            let received = page.data.len();
            found.extend(page.data.into_iter().map(|hit| hit.id));
            info!(collected = found.len(), total = page.total, "Search progress");

            // The server may cap the page below the requested size.
            let step = if page.limit > 0 {
                page.limit
            } else {
                u32::try_from(received).unwrap_or(u32::MAX)
            };
            offset = offset.saturating_add(step);

            if found.len() >= page.total as usize {
                break;
            }
        }

        let mut seen = HashSet::with_capacity(found.len());
        found.retain(|id| seen.insert(*id));

        info!(
            event = "discovery_finished",
            count = found.len(),
            "Subject discovery complete"
        );

        found
    }

    /// Fetches and transforms each subject in order.
    ///
    /// Failed subjects are logged and left out; they never abort the batch.
    pub async fn fetch_records(&self, ids: &[SubjectId]) -> Vec<AnimeRecord> {
        let catalog = &self.catalog;
        let initial = (Vec::with_capacity(ids.len()), Pacer::new(self.detail_delay));

        let (records, _) = futures::stream::iter(ids.iter().copied())
            .fold(initial, move |(mut records, mut pacer), id| async move {
                pacer.ready().await;

                match catalog.get_subject(id).await {
                    Ok(subject) => {
                        let record = to_record(subject);
                        info!(
                            event = "subject_collected",
                            id = %id,
                            title = %record.display_title(),
                            "[OK]"
                        );
                        records.push(record);
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "Failed to fetch subject detail");
                    }
                }

                (records, pacer)
            })
            .await;

        records
    }

    /// Runs discovery and detail fetch, then replaces the stored document.
    ///
    /// Nothing is written when discovery finds no subjects.
    pub async fn run(&self, store: &DocumentStore) -> Result<CollectSummary, StoreError> {
        let ids = self.discover_ids().await;

        if ids.is_empty() {
            warn!("No matching subjects found, leaving the document untouched");
            return Ok(CollectSummary::default());
        }

        let records = self.fetch_records(&ids).await;
        let summary = CollectSummary {
            discovered: ids.len(),
            collected: records.len(),
            written: true,
        };

        store.save(&Document::Bare(records)).await?;

        info!(
            event = "collect_finished",
            discovered = summary.discovered,
            collected = summary.collected,
            "Collection complete"
        );

        Ok(summary)
    }
}
