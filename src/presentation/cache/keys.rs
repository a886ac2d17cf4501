//! Deterministic cache keys. Every query parameter is part of the key and
//! free-text values are escaped, so distinct queries never share an entry.
//! The default public listing is `articles_page1_size10`.

use crate::application::dto::{ArticleSort, Audience};
use crate::application::queries::articles::ListArticlesQuery;
use std::fmt::Write;
use uuid::Uuid;

pub const ARTICLE_LISTS: &str = "articles_";
pub const ARTICLE_DETAILS: &str = "article_";
pub const TAG_LISTS: &str = "tags_";
pub const PROJECT_LISTS: &str = "projects_";
pub const COMMENT_THREADS: &str = "comments_";

/// Keep `[a-z0-9-]`; percent-encode everything else, including `_`, which
/// separates key segments.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' {
            escaped.push(char::from(byte));
        } else {
            let _ = write!(escaped, "%{byte:02X}");
        }
    }
    escaped
}

fn audience_suffix(key: &mut String, audience: Audience) {
    if audience.is_staff() {
        key.push_str("_staff");
    }
}

pub fn article_list(audience: Audience, query: &ListArticlesQuery) -> String {
    let mut key = format!("{ARTICLE_LISTS}page{}_size{}", query.page, query.page_size);
    if let Some(search) = &query.search {
        key.push_str("_q-");
        key.push_str(&escape(search));
    }
    if let Some(tag) = &query.tag {
        key.push_str("_tag-");
        key.push_str(&escape(tag));
    }
    if query.sort != ArticleSort::default() {
        key.push_str("_sort-");
        key.push_str(query.sort.as_str());
    }
    audience_suffix(&mut key, audience);
    key
}

pub fn article(audience: Audience, id: Uuid) -> String {
    let mut key = format!("{ARTICLE_DETAILS}{id}");
    audience_suffix(&mut key, audience);
    key
}

pub fn article_by_slug(audience: Audience, slug: &str) -> String {
    let mut key = format!("{ARTICLE_DETAILS}slug-{}", escape(slug));
    audience_suffix(&mut key, audience);
    key
}

pub fn tag_list(audience: Audience) -> String {
    let mut key = format!("{TAG_LISTS}all");
    audience_suffix(&mut key, audience);
    key
}

pub fn project_list(audience: Audience) -> String {
    let mut key = format!("{PROJECT_LISTS}all");
    audience_suffix(&mut key, audience);
    key
}

pub fn project(audience: Audience, id: Uuid) -> String {
    let mut key = format!("project_{id}");
    audience_suffix(&mut key, audience);
    key
}

/// Covers both audiences' entries for one project.
pub fn project_prefix(id: Uuid) -> String {
    format!("project_{id}")
}

pub fn approved_comments(article_id: Uuid) -> String {
    format!("{COMMENT_THREADS}{article_id}")
}
