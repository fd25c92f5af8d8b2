//! Static gallery page generation.
//!
//! Rendering is a pure function of the stored records and the configuration;
//! the only I/O is done by the `render` command that reads the document and
//! writes the resulting file. Filtering and sorting in the browser are handled
//! by the inlined script in `assets/gallery.js`.

pub mod card;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::collections::BTreeSet;

use crate::config::{Config, RenderConfig};
use crate::domain::Origin;
use crate::models::AnimeRecord;

pub use card::{card_tags, clean_summary, render_card};

const GALLERY_SCRIPT: &str = include_str!("../../assets/gallery.js");
const GALLERY_STYLE: &str = include_str!("../../assets/gallery.css");

/// Whether a record falls inside the display window.
#[must_use]
pub fn is_displayed(record: &AnimeRecord, config: &RenderConfig) -> bool {
    let airs_after_cutoff = record
        .air_date
        .as_deref()
        .is_some_and(|date| !date.is_empty() && date > config.cutoff_date.as_str());

    airs_after_cutoff
        && !record.meta_tags.is_empty()
        && !record.meta_tags.iter().any(|tag| *tag == config.excluded_tag)
}

#[must_use]
pub fn select_entries<'a>(records: &'a [AnimeRecord], config: &RenderConfig) -> Vec<&'a AnimeRecord> {
    records
        .iter()
        .filter(|record| is_displayed(record, config))
        .collect()
}

/// Distinct filter values across the displayed entries, sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Facets {
    pub origins: Vec<String>,
    pub tags: Vec<String>,
}

#[must_use]
pub fn collect_facets(entries: &[&AnimeRecord]) -> Facets {
    let origins: BTreeSet<&str> = entries
        .iter()
        .filter_map(|r| r.origin.map(Origin::as_str))
        .collect();
    let tags: BTreeSet<&str> = entries
        .iter()
        .flat_map(|r| r.meta_tags.iter().map(String::as_str))
        .filter(|tag| !tag.is_empty())
        .collect();

    Facets {
        origins: origins.into_iter().map(str::to_string).collect(),
        tags: tags.into_iter().map(str::to_string).collect(),
    }
}

fn filter_buttons(values: &[String]) -> String {
    let mut html =
        String::from(r#"<button class="filter-btn active" data-filter="all">全部</button>"#);
    for value in values {
        html.push_str(&format!(
            r#"<button class="filter-btn" data-filter="{}">{}</button>"#,
            attr(value),
            text(value)
        ));
    }
    html
}

/// Renders the full gallery page for the given records.
#[must_use]
pub fn render_page(records: &[AnimeRecord], config: &Config) -> String {
    let entries = select_entries(records, &config.render);
    let facets = collect_facets(&entries);
    let cards: String = entries
        .iter()
        .map(|record| render_card(record, config))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="{stylesheet}">
    <style>
{style}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{title}</h1>
            <div class="header-bottom">
                <div class="controls">
                    <div>
                        <strong>出处筛选</strong>
                        <div class="filter-group" id="origin-filter">{origin_buttons}</div>
                    </div>
                    <div>
                        <strong>标签筛选</strong>
                        <div class="filter-group" id="tag-filter">{tag_buttons}</div>
                    </div>
                </div>
                <div class="sort-group">
                    <select id="sort-select">
                        <option value="wish">按关注度 (想看人数)</option>
                        <option value="score">按评分排序</option>
                    </select>
                </div>
            </div>
        </header>

        <main class="anime-grid">{cards}
        </main>
    </div>

    <script>
{script}
    </script>
</body>
</html>
"#,
        title = text(&config.render.page_title),
        stylesheet = attr(&config.render.stylesheet),
        style = GALLERY_STYLE,
        origin_buttons = filter_buttons(&facets.origins),
        tag_buttons = filter_buttons(&facets.tags),
        cards = cards,
        script = GALLERY_SCRIPT,
    )
}
