//! Markup for a single gallery card.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::config::Config;
use crate::domain::Origin;
use crate::models::AnimeRecord;

const UNKNOWN: &str = "未知";

fn line_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n\u{2028}\u{2029}]+").expect("Invalid regex"))
}

/// Collapses runs of line terminators to one space and drops other control
/// characters.
#[must_use]
pub fn clean_summary(summary: &str) -> String {
    line_breaks()
        .replace_all(summary, " ")
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Origin followed by the record's tags, first occurrence kept, blanks dropped.
///
/// Studio is deliberately not part of this set, so it shows up neither on
/// the card nor in the filterable `data-tags` attribute.
#[must_use]
pub fn card_tags(record: &AnimeRecord) -> Vec<&str> {
    let mut seen = HashSet::new();
    record
        .origin
        .map(Origin::as_str)
        .into_iter()
        .chain(record.meta_tags.iter().map(String::as_str))
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(*tag))
        .collect()
}

fn staff_line(label: &str, value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() && value != UNKNOWN => {
            format!("<p><strong>{label}:</strong> {}</p>", text(value))
        }
        _ => String::new(),
    }
}

fn trailer_link(record: &AnimeRecord, config: &Config) -> String {
    format!(
        "{}?search_query={}",
        config.render.trailer_search_url,
        urlencoding::encode(&record.pv_search_keywords)
    )
}

#[must_use]
pub fn render_card(record: &AnimeRecord, config: &Config) -> String {
    let tags = card_tags(record);
    let shown: String = tags
        .iter()
        .take(config.render.max_card_tags)
        .map(|tag| format!(r#"<span class="tag meta-tag">{}</span>"#, text(tag)))
        .collect();

    let mut links = format!(
        r#"<a href="{}" target="_blank" title="搜索 PV">🎬 PV</a>"#,
        attr(&trailer_link(record, config))
    );
    if let Some(site) = record.official_site.as_deref().filter(|s| !s.is_empty()) {
        links.push_str(&format!(
            r#"<a href="{}" target="_blank" title="官方网站">🌐 官网</a>"#,
            attr(site)
        ));
    }
    if let Some(id) = record.id {
        links.push_str(&format!(
            r#"<a href="{}/subject/{id}" target="_blank" title="Bangumi 页面">📺 Bangumi</a>"#,
            attr(config.catalog.site_base.trim_end_matches('/'))
        ));
    }

    let director = record
        .director
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(UNKNOWN);

    format!(
        r#"
    <div class="card" data-wish="{wish}" data-score="{score}" data-origin="{origin}" data-tags="{data_tags}">
        <div class="poster-wrapper">
            <img class="poster" src="{cover}" loading="lazy" alt="{title_attr}">
            <div class="score-badge">★ {score}</div>
        </div>
        <div class="info">
            <h3 class="title" title="{title_attr}">
                <span class="title-cn">{title}</span>
                <span class="title-jp">{origin_title}</span>
            </h3>
            <div class="meta">
                <span>📅 {air_date}</span>
                <span>🔥 {wish} 人想看</span>
            </div>
            <div class="staff-info">
                <p><strong>监督:</strong> {director}</p>
                {music}{performers}
            </div>
            <p class="summary">{summary}...</p>
            <div class="tags">{shown}</div>
            <div class="resource-links">{links}</div>
        </div>
    </div>"#,
        wish = record.wish,
        score = record.score,
        origin = attr(record.origin.map_or("", Origin::as_str)),
        data_tags = attr(&tags.join("|")),
        cover = attr(&record.cover),
        title_attr = attr(&record.title),
        title = text(&record.title),
        origin_title = text(&record.origin_title),
        air_date = text(record.air_date.as_deref().unwrap_or(UNKNOWN)),
        director = text(director),
        music = staff_line("音乐", record.music.as_deref()),
        performers = staff_line("主题歌演出", record.ani_song_performers.as_deref()),
        summary = text(&clean_summary(&record.summary)),
    )
}
