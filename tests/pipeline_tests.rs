//! Integration tests for the collect, refresh and render stages.
//!
//! The stages run against an in-memory catalog with all delays set to zero,
//! reading and writing documents in the system temp directory.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use anime_sentinel::clients::bangumi::{
    Collection, Images, InfoboxItem, InfoboxValue, Rating, SearchHit, Tag,
};
use anime_sentinel::clients::{Catalog, CatalogError, SearchPage, Subject, SubjectQuery};
use anime_sentinel::config::{CollectorConfig, Config, RefresherConfig};
use anime_sentinel::domain::{Origin, SubjectId};
use anime_sentinel::models::{AnimeRecord, Document};
use anime_sentinel::render::render_page;
use anime_sentinel::services::{Collector, Refresher};
use anime_sentinel::store::{DocumentStore, StoreError};
use async_trait::async_trait;

#[derive(Default)]
struct FakeCatalog {
    /// Search pages keyed by request offset.
    pages: HashMap<u32, SearchPage>,
    failing_offsets: HashSet<u32>,
    subjects: HashMap<u32, Subject>,
    failing_ids: HashSet<u32>,
    search_offsets: Mutex<Vec<u32>>,
    detail_calls: Mutex<Vec<u32>>,
}

impl FakeCatalog {
    fn with_page(mut self, offset: u32, ids: &[u32], total: u32, limit: u32) -> Self {
        let page = SearchPage {
            data: ids
                .iter()
                .map(|id| SearchHit {
                    id: SubjectId::new(*id),
                })
                .collect(),
            total,
            limit,
        };
        self.pages.insert(offset, page);
        self
    }

    fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.insert(subject.id.value(), subject);
        self
    }

    fn search_offsets(&self) -> Vec<u32> {
        self.search_offsets.lock().unwrap().clone()
    }

    fn detail_calls(&self) -> Vec<u32> {
        self.detail_calls.lock().unwrap().clone()
    }
}

fn unavailable() -> CatalogError {
    CatalogError::Status {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "unavailable".to_string(),
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_subjects(
        &self,
        _query: &SubjectQuery,
        _limit: u32,
        offset: u32,
    ) -> Result<SearchPage, CatalogError> {
        self.search_offsets.lock().unwrap().push(offset);

        if self.failing_offsets.contains(&offset) {
            return Err(unavailable());
        }
        Ok(self.pages.get(&offset).cloned().unwrap_or_default())
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Subject, CatalogError> {
        self.detail_calls.lock().unwrap().push(id.value());

        if self.failing_ids.contains(&id.value()) {
            return Err(unavailable());
        }
        self.subjects
            .get(&id.value())
            .cloned()
            .ok_or_else(|| CatalogError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: String::new(),
            })
    }
}

/// Lets a test keep inspecting the catalog after handing it to a service.
#[async_trait]
impl<'a> Catalog for &'a FakeCatalog {
    async fn search_subjects(
        &self,
        query: &SubjectQuery,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, CatalogError> {
        (**self).search_subjects(query, limit, offset).await
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Subject, CatalogError> {
        (**self).get_subject(id).await
    }
}

fn collector_config() -> CollectorConfig {
    CollectorConfig {
        page_size: 2,
        page_delay_ms: 0,
        detail_delay_ms: 0,
        ..CollectorConfig::default()
    }
}

fn refresher_config() -> RefresherConfig {
    RefresherConfig {
        delay_ms: 0,
        ..RefresherConfig::default()
    }
}

fn temp_store(label: &str) -> (DocumentStore, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "anime-sentinel-{label}-{}.json",
        uuid::Uuid::new_v4()
    ));
    (DocumentStore::new(&path), path)
}

fn subject(id: u32, name: &str) -> Subject {
    Subject {
        id: SubjectId::new(id),
        name: name.to_string(),
        name_cn: Some(format!("{name} CN")),
        date: Some("2026-01-10".to_string()),
        infobox: Some(vec![InfoboxItem {
            key: "导演".to_string(),
            value: InfoboxValue::Text("Director".to_string()),
        }]),
        rating: Some(Rating {
            score: Some(7.5),
            rank: Some(120),
        }),
        collection: Some(Collection { wish: Some(40) }),
        images: Some(Images {
            common: Some(format!("https://img.example/{id}.jpg")),
        }),
        tags: Some(vec![
            Tag {
                name: "原创".to_string(),
            },
            Tag {
                name: "日本".to_string(),
            },
        ]),
        ..Subject::default()
    }
}

#[tokio::test]
async fn test_discovery_dedupes_across_pages() {
    let catalog = FakeCatalog::default()
        .with_page(0, &[1, 2], 5, 2)
        .with_page(2, &[2, 3], 5, 2)
        .with_page(4, &[4], 5, 2);
    let collector = Collector::new(&catalog, &collector_config());

    let ids = collector.discover_ids().await;

    let values: Vec<u32> = ids.iter().map(|id| id.value()).collect();
    assert_eq!(values, vec![1, 2, 3, 4]);
    assert_eq!(catalog.search_offsets(), vec![0, 2, 4]);
}

#[tokio::test]
async fn test_discovery_advances_by_server_limit() {
    // The server caps pages at one item even though two were requested.
    let catalog = FakeCatalog::default()
        .with_page(0, &[10], 3, 1)
        .with_page(1, &[11], 3, 1)
        .with_page(2, &[12], 3, 1);
    let collector = Collector::new(&catalog, &collector_config());

    let ids = collector.discover_ids().await;

    assert_eq!(ids.len(), 3);
    assert_eq!(catalog.search_offsets(), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_discovery_stops_on_failed_page() {
    let mut catalog = FakeCatalog::default()
        .with_page(0, &[1, 2], 6, 2)
        .with_page(4, &[5, 6], 6, 2);
    catalog.failing_offsets.insert(2);

    let collector = Collector::new(catalog, &collector_config());
    let ids = collector.discover_ids().await;

    let values: Vec<u32> = ids.iter().map(|id| id.value()).collect();
    assert_eq!(values, vec![1, 2]);
}

#[tokio::test]
async fn test_discovery_stops_on_empty_page() {
    let catalog = FakeCatalog::default().with_page(0, &[1], 50, 2);
    let collector = Collector::new(catalog, &collector_config());

    let ids = collector.discover_ids().await;

    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn test_collect_skips_failed_details_and_keeps_order() {
    let mut catalog = FakeCatalog::default()
        .with_page(0, &[3, 1, 2], 3, 20)
        .with_subject(subject(1, "One"))
        .with_subject(subject(2, "Two"))
        .with_subject(subject(3, "Three"));
    catalog.failing_ids.insert(1);

    let (store, path) = temp_store("collect");
    let collector = Collector::new(&catalog, &collector_config());

    let summary = collector.run(&store).await.unwrap();
    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.collected, 2);
    assert!(summary.written);
    assert_eq!(catalog.detail_calls(), vec![3, 1, 2]);

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.is_array(), "collector writes a bare array");

    let items = store.load().await.unwrap().into_items();
    let ids: Vec<u32> = items.iter().filter_map(|r| r.id).map(|id| id.value()).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(items[0].title, "Three CN");
    assert_eq!(items[0].origin, Some(Origin::Original));
    assert_eq!(items[0].director.as_deref(), Some("Director"));
    assert_eq!(items[0].rank, 120);

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_collect_without_matches_writes_nothing() {
    let catalog = FakeCatalog::default();
    let (store, path) = temp_store("collect-empty");
    let collector = Collector::new(catalog, &collector_config());

    let summary = collector.run(&store).await.unwrap();

    assert!(!summary.written);
    assert_eq!(summary.discovered, 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_refresh_wraps_bare_array() {
    let (store, path) = temp_store("refresh-bare");
    std::fs::write(&path, r#"[{"id": 1, "title": "X", "score": 5.0, "wish": 3}]"#).unwrap();

    let mut fresh = subject(1, "X");
    fresh.rating = Some(Rating {
        score: Some(8.1),
        rank: Some(1),
    });
    fresh.collection = Some(Collection { wish: Some(77) });
    let catalog = FakeCatalog::default().with_subject(fresh);

    let refresher = Refresher::new(catalog, &refresher_config()).unwrap();
    let outcome = refresher.run(&store).await.unwrap();
    assert_eq!(outcome.stats.refreshed, 1);
    assert_eq!(outcome.total, 1);

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(!value["lastUpdated"].as_str().unwrap().is_empty());
    assert_eq!(value["items"][0]["id"], 1);
    assert_eq!(value["items"][0]["wish"], 77);
    assert_eq!(value["items"][0]["title"], "X");

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_refresh_keeps_failures_and_unknown_fields() {
    let (store, path) = temp_store("refresh-wrapped");
    let stored = Document::wrapped(
        "2026/01/01 00:00:00",
        vec![
            AnimeRecord {
                id: Some(SubjectId::new(1)),
                score: 6.0,
                wish: 5,
                ..AnimeRecord::default()
            },
            AnimeRecord {
                id: Some(SubjectId::new(2)),
                score: 4.0,
                wish: 9,
                ..AnimeRecord::default()
            },
            AnimeRecord {
                title: "No id".to_string(),
                ..AnimeRecord::default()
            },
        ],
    );
    store.save(&stored).await.unwrap();

    let mut no_rating = subject(1, "One");
    no_rating.rating = None;
    let mut catalog = FakeCatalog::default().with_subject(no_rating);
    catalog.failing_ids.insert(2);

    let refresher = Refresher::new(catalog, &refresher_config()).unwrap();
    let outcome = refresher.run(&store).await.unwrap();

    assert_eq!(outcome.stats.unchanged, 1);
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.stats.skipped, 1);

    let document = store.load().await.unwrap();
    assert_ne!(document.last_updated(), Some("2026/01/01 00:00:00"));
    let items = document.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].wish, 5);
    assert_eq!(items[1].wish, 9);
    assert_eq!(items[2].title, "No id");

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_refresh_rejects_unknown_shape() {
    let (store, path) = temp_store("refresh-shape");
    std::fs::write(&path, r#"{"foo": 1}"#).unwrap();

    let catalog = FakeCatalog::default();
    let refresher = Refresher::new(&catalog, &refresher_config()).unwrap();

    let err = refresher.run(&store).await.unwrap_err();
    assert!(matches!(err, StoreError::Shape { .. }));
    assert!(catalog.detail_calls().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"foo": 1}"#);

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_refresh_missing_document_makes_no_requests() {
    let (store, _path) = temp_store("refresh-missing");
    let catalog = FakeCatalog::default();
    let refresher = Refresher::new(&catalog, &refresher_config()).unwrap();

    let err = refresher.run(&store).await.unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(catalog.detail_calls().is_empty());
}

#[tokio::test]
async fn test_collect_then_refresh_makes_one_call_per_record() {
    let catalog = FakeCatalog::default()
        .with_page(0, &[1, 2], 2, 20)
        .with_subject(subject(1, "One"))
        .with_subject(subject(2, "Two"));
    let (store, path) = temp_store("round");

    let collector = Collector::new(catalog, &collector_config());
    collector.run(&store).await.unwrap();

    let catalog = FakeCatalog::default()
        .with_subject(subject(1, "One"))
        .with_subject(subject(2, "Two"));
    let refresher = Refresher::new(&catalog, &refresher_config()).unwrap();
    let outcome = refresher.run(&store).await.unwrap();

    assert_eq!(outcome.stats.refreshed, 2);
    assert_eq!(catalog.detail_calls(), vec![1, 2]);
    assert!(store.load().await.unwrap().last_updated().is_some());

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_render_end_to_end() {
    let (store, path) = temp_store("render");
    std::fs::write(
        &path,
        r#"{
            "lastUpdated": "2026/01/20 10:00:00",
            "items": [
                {
                    "id": 7,
                    "title": "X",
                    "originTitle": "X",
                    "cover": "c",
                    "airDate": "2026-01-10",
                    "metaTags": ["原创"],
                    "origin": "原创",
                    "summary": "s",
                    "score": 8.0,
                    "rank": 999,
                    "wish": 100,
                    "pvSearchKeywords": "X PV"
                },
                {
                    "id": 8,
                    "title": "Movie",
                    "airDate": "2026-02-10",
                    "metaTags": ["剧场版"]
                }
            ]
        }"#,
    )
    .unwrap();

    let document = store.load().await.unwrap();
    let html = render_page(document.items(), &Config::default());

    assert_eq!(html.matches(r#"<div class="card""#).count(), 1);
    assert!(html.contains(r#"data-score="8""#));
    assert!(html.contains(r#"data-wish="100""#));
    assert!(html.contains(r#"data-tags="原创""#));
    assert!(html.contains(r#"<button class="filter-btn" data-filter="原创">原创</button>"#));
    assert!(!html.contains("Movie"));

    let _ = std::fs::remove_file(path);
}
