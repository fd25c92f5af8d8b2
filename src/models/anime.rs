use crate::domain::{Origin, SubjectId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub const DEFAULT_RANK: u32 = 999;

/// One catalog entry as stored in the document.
///
/// Unknown fields are kept in `extra` so a refresh never drops data written
/// by a newer collector or edited by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<SubjectId>,
    pub title: String,
    pub origin_title: String,
    pub cover: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
    #[serde(
        deserialize_with = "number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub episodes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_design: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ani_song_performers: Option<String>,
    pub meta_tags: Vec<String>,
    /// Absent for hand-edited entries; the collector always sets it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_info: Option<String>,
    pub summary: String,
    #[serde(serialize_with = "whole_as_integer")]
    pub score: f64,
    pub rank: u32,
    pub wish: u32,
    pub pv_search_keywords: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AnimeRecord {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            origin_title: String::new(),
            cover: String::new(),
            air_date: None,
            broadcast: None,
            episodes: None,
            official_site: None,
            director: None,
            studio: None,
            script: None,
            char_design: None,
            music: None,
            ani_song_performers: None,
            meta_tags: Vec::new(),
            origin: None,
            origin_info: None,
            summary: String::new(),
            score: 0.0,
            rank: DEFAULT_RANK,
            wish: 0,
            pv_search_keywords: String::new(),
            extra: Map::new(),
        }
    }
}

impl AnimeRecord {
    /// Name used in progress logs: the localized title, else the native one.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.origin_title
        } else {
            &self.title
        }
    }
}

/// Older documents stored the episode count as a JSON number.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Whole scores are written without a fractional part, so `8` stays `8`.
#[allow(
    clippy::trivially_copy_pass_by_ref,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]
fn whole_as_integer<S>(score: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if score.fract() == 0.0 && score.abs() < MAX_EXACT {
        serializer.serialize_i64(*score as i64)
    } else {
        serializer.serialize_f64(*score)
    }
}
