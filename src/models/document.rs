use super::anime::AnimeRecord;
use serde::Serialize;

/// The persisted collection in one of its two on-disk shapes.
///
/// The collector writes `Bare`, the refresher always writes `Wrapped`. Readers
/// should go through [`Document::items`] and never assume one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Bare(Vec<AnimeRecord>),
    Wrapped {
        #[serde(rename = "lastUpdated")]
        last_updated: String,
        items: Vec<AnimeRecord>,
    },
}

impl Document {
    #[must_use]
    pub fn items(&self) -> &[AnimeRecord] {
        match self {
            Self::Bare(items) | Self::Wrapped { items, .. } => items,
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<AnimeRecord> {
        match self {
            Self::Bare(items) | Self::Wrapped { items, .. } => items,
        }
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<&str> {
        match self {
            Self::Bare(_) => None,
            Self::Wrapped { last_updated, .. } => Some(last_updated),
        }
    }

    #[must_use]
    pub fn wrapped(last_updated: impl Into<String>, items: Vec<AnimeRecord>) -> Self {
        Self::Wrapped {
            last_updated: last_updated.into(),
            items,
        }
    }
}
