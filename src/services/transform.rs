//! Mapping from catalog subject detail to the stored record shape.

use crate::clients::bangumi::{InfoboxItem, Subject};
use crate::domain::Origin;
use crate::models::anime::{AnimeRecord, DEFAULT_RANK};

pub const SUMMARY_PLACEHOLDER: &str = "暂无简介";

mod keys {
    pub const AIR_DATE: &[&str] = &["放送开始", "发售日"];
    pub const BROADCAST: &[&str] = &["放送星期"];
    pub const EPISODES: &[&str] = &["话数"];
    pub const OFFICIAL_SITE: &[&str] = &["官方网站"];
    pub const DIRECTOR: &[&str] = &["导演", "监督"];
    pub const STUDIO: &[&str] = &["动画制作", "制作"];
    pub const SCRIPT: &[&str] = &["系列构成", "脚本", "编剧"];
    pub const CHAR_DESIGN: &[&str] = &["人物设定", "角色设计"];
    pub const MUSIC: &[&str] = &["音乐"];
    pub const SONG_PERFORMERS: &[&str] = &["主题歌演出"];
    pub const ORIGINAL_WORK: &[&str] = &["原作"];
}

/// Builds a record from subject detail.
#[must_use]
pub fn to_record(subject: Subject) -> AnimeRecord {
    let infobox = subject.infobox.as_deref().unwrap_or_default();
    let info = |aliases: &[&str]| find_info(infobox, aliases);

    let meta_tags: Vec<String> = subject
        .tags
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|tag| tag.name.clone())
        .collect();
    let origin = Origin::classify(meta_tags.iter().map(String::as_str));

    let episodes = subject
        .total_episodes
        .filter(|&count| count > 0)
        .map(|count| count.to_string())
        .or_else(|| info(keys::EPISODES).filter(|s| !s.is_empty()));

    let air_date = info(keys::AIR_DATE)
        .filter(|s| !s.is_empty())
        .or_else(|| subject.date.clone().filter(|s| !s.is_empty()));

    let summary = subject
        .summary
        .as_deref()
        .filter(|s| !s.is_empty())
        .map_or_else(|| SUMMARY_PLACEHOLDER.to_string(), normalize_line_breaks);

    let rating = subject.rating.as_ref();

    AnimeRecord {
        id: Some(subject.id),
        title: subject.name_cn.clone().unwrap_or_default(),
        origin_title: subject.name.clone(),
        cover: subject
            .images
            .as_ref()
            .and_then(|images| images.common.clone())
            .unwrap_or_default(),
        air_date,
        broadcast: info(keys::BROADCAST),
        episodes,
        official_site: info(keys::OFFICIAL_SITE),
        director: info(keys::DIRECTOR),
        studio: info(keys::STUDIO),
        script: info(keys::SCRIPT),
        char_design: info(keys::CHAR_DESIGN),
        music: info(keys::MUSIC),
        ani_song_performers: info(keys::SONG_PERFORMERS),
        meta_tags,
        origin: Some(origin),
        origin_info: info(keys::ORIGINAL_WORK),
        summary,
        score: rating.and_then(|r| r.score).unwrap_or(0.0),
        rank: rating
            .and_then(|r| r.rank)
            .filter(|&rank| rank > 0)
            .unwrap_or(DEFAULT_RANK),
        wish: subject
            .collection
            .as_ref()
            .and_then(|c| c.wish)
            .unwrap_or(0),
        pv_search_keywords: format!("{} PV Official Trailer", subject.name),
        extra: serde_json::Map::new(),
    }
}

/// Returns the value of the first infobox entry whose key is one of `aliases`.
///
/// Entries are scanned in infobox order, so the earliest matching key wins
/// even when a later alias appears first in `aliases`.
#[must_use]
pub fn find_info(infobox: &[InfoboxItem], aliases: &[&str]) -> Option<String> {
    infobox
        .iter()
        .find(|item| aliases.contains(&item.key.as_str()))
        .map(|item| item.value.to_text())
}

fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
