//! Domain primitives shared by the collector, refresher and renderer.
//!
//! `SubjectId` keeps catalog identifiers from being mixed with offsets, counts
//! and other integers that flow through the fetch loops. `Origin` is the
//! derived source-material category of a title.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a subject in the upstream catalog.
///
/// # Examples
///
/// ```rust
/// use anime_sentinel::domain::SubjectId;
///
/// let id = SubjectId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(u32);

impl SubjectId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SubjectId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<SubjectId> for u32 {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

/// Source-material category derived from a subject's tags.
///
/// Serialized with the catalog's own tag names so the stored document and the
/// rendered filter buttons use the same strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "漫画改")]
    Manga,
    #[serde(rename = "轻小说改")]
    LightNovel,
    #[serde(rename = "游戏改")]
    Game,
    #[serde(rename = "原创")]
    Original,
    /// Generic anime, used when no adaptation tag is present.
    #[default]
    #[serde(rename = "动画")]
    Anime,
}

impl Origin {
    /// Adaptation categories in classification priority order.
    pub const PRIORITY: [Self; 4] = [Self::Manga, Self::LightNovel, Self::Game, Self::Original];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manga => "漫画改",
            Self::LightNovel => "轻小说改",
            Self::Game => "游戏改",
            Self::Original => "原创",
            Self::Anime => "动画",
        }
    }

    /// Classifies a tag list.
    ///
    /// The first category in [`Origin::PRIORITY`] that appears anywhere in the
    /// tags wins, regardless of where it sits in the list. No match, or no
    /// tags at all, yields [`Origin::Anime`].
    ///
    /// ```rust
    /// use anime_sentinel::domain::Origin;
    ///
    /// assert_eq!(Origin::classify(["原创", "游戏改"]), Origin::Game);
    /// assert_eq!(Origin::classify(Vec::<&str>::new()), Origin::Anime);
    /// ```
    pub fn classify<'a, I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tags: Vec<&str> = tags.into_iter().collect();

        Self::PRIORITY
            .into_iter()
            .find(|origin| tags.contains(&origin.as_str()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
