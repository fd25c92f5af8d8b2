use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::Catalog;
use crate::config::CatalogConfig;
use crate::domain::SubjectId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bangumi API error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Tag and type filter for the subject search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectQuery {
    pub subject_type: u32,
    pub tags: Vec<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    filter: SearchFilter<'a>,
}

#[derive(Serialize)]
struct SearchFilter<'a> {
    #[serde(rename = "type")]
    subject_type: [u32; 1],
    tag: &'a [String],
}

impl<'a> From<&'a SubjectQuery> for SearchRequest<'a> {
    fn from(query: &'a SubjectQuery) -> Self {
        Self {
            filter: SearchFilter {
                subject_type: [query.subject_type],
                tag: &query.tags,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub data: Vec<SearchHit>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: SubjectId,
}

/// Subject detail as returned by `GET subjects/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    #[serde(default)]
    pub name: String,
    pub name_cn: Option<String>,
    pub summary: Option<String>,
    pub date: Option<String>,
    pub total_episodes: Option<u32>,
    pub infobox: Option<Vec<InfoboxItem>>,
    pub images: Option<Images>,
    pub rating: Option<Rating>,
    pub collection: Option<Collection>,
    pub tags: Option<Vec<Tag>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfoboxItem {
    pub key: String,
    pub value: InfoboxValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InfoboxValue {
    Text(String),
    List(Vec<InfoboxEntry>),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InfoboxEntry {
    Pair {
        #[serde(default)]
        k: Option<String>,
        v: String,
    },
    Text(String),
    Other(Value),
}

impl InfoboxValue {
    /// Flattens the value to display text; list entries are joined with " / ".
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(entries) => entries
                .iter()
                .map(InfoboxEntry::to_text)
                .collect::<Vec<_>>()
                .join(" / "),
            Self::Other(value) => value_text(value),
        }
    }
}

impl InfoboxEntry {
    fn to_text(&self) -> String {
        match self {
            Self::Pair { v, .. } => v.clone(),
            Self::Text(text) => text.clone(),
            Self::Other(value) => value_text(value),
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Images {
    pub common: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rating {
    pub score: Option<f64>,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collection {
    pub wish: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Clone)]
pub struct BangumiClient {
    client: Client,
    api_base: Url,
}

impl BangumiClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Self {
            client,
            api_base: api_base_url(&config.api_base)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.api_base.join(path)?)
    }
}

#[async_trait]
impl Catalog for BangumiClient {
    async fn search_subjects(
        &self,
        query: &SubjectQuery,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, CatalogError> {
        let mut url = self.endpoint("search/subjects")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        debug!(%url, tags = ?query.tags, "Searching subjects");

        let response = self
            .client
            .post(url)
            .json(&SearchRequest::from(query))
            .send()
            .await?;

        read_json(response).await
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Subject, CatalogError> {
        let url = self.endpoint(&format!("subjects/{id}"))?;

        debug!(%url, "Fetching subject");

        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::Status { status, body });
    }

    Ok(response.json().await?)
}

/// Parses the base URL so that relative endpoints join below it rather than
/// replacing its last path segment.
fn api_base_url(base: &str) -> Result<Url, url::ParseError> {
    if base.ends_with('/') {
        Url::parse(base)
    } else {
        Url::parse(&format!("{base}/"))
    }
}
