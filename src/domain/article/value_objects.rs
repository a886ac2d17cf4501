use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::slug;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_TITLE_LEN: usize = 200;
const MAX_SUMMARY_LEN: usize = 500;
const MAX_META_TITLE_LEN: usize = 70;
const MAX_META_DESCRIPTION_LEN: usize = 160;
const MAX_META_KEYWORDS_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleTitle(String);

impl ArticleTitle {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::Validation("title cannot be empty".into()));
        }
        if value.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "title cannot exceed {MAX_TITLE_LEN} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ArticleTitle> for String {
    fn from(value: ArticleTitle) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSlug(String);

impl ArticleSlug {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if !slug::is_valid(&value) {
            return Err(DomainError::Validation(format!(
                "`{value}` is not a valid slug"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ArticleSlug> for String {
    fn from(value: ArticleSlug) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent(String);

impl ArticleContent {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::Validation("content cannot be empty".into()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ArticleContent> for String {
    fn from(value: ArticleContent) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary(String);

impl ArticleSummary {
    /// Blank summaries collapse to `None`.
    pub fn parse(value: Option<String>) -> DomainResult<Option<Self>> {
        let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        if value.chars().count() > MAX_SUMMARY_LEN {
            return Err(DomainError::Validation(format!(
                "summary cannot exceed {MAX_SUMMARY_LEN} characters"
            )));
        }
        Ok(Some(Self(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Search-engine metadata rendered into the article page head.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

impl SeoMetadata {
    pub fn new(
        meta_title: Option<String>,
        meta_description: Option<String>,
        meta_keywords: Option<String>,
    ) -> DomainResult<Self> {
        let meta_title = bounded("meta title", meta_title, MAX_META_TITLE_LEN)?;
        let meta_description =
            bounded("meta description", meta_description, MAX_META_DESCRIPTION_LEN)?;
        let meta_keywords = bounded("meta keywords", meta_keywords, MAX_META_KEYWORDS_LEN)?;
        Ok(Self {
            meta_title,
            meta_description,
            meta_keywords,
        })
    }
}

fn bounded(field: &str, value: Option<String>, max: usize) -> DomainResult<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > max => Err(DomainError::Validation(format!(
            "{field} cannot exceed {max} characters"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_required() {
        assert_eq!(ArticleTitle::new("  Hello  ").unwrap().as_str(), "Hello");
        assert!(ArticleTitle::new("   ").is_err());
        assert!(ArticleTitle::new("x".repeat(201)).is_err());
    }

    #[test]
    fn slug_must_be_url_safe() {
        assert!(ArticleSlug::new("hello-world").is_ok());
        assert!(ArticleSlug::new("Hello World").is_err());
        assert!(ArticleSlug::new("").is_err());
    }

    #[test]
    fn blank_summary_is_none() {
        assert!(ArticleSummary::parse(Some("   ".into())).unwrap().is_none());
        assert!(ArticleSummary::parse(Some("x".repeat(501))).is_err());
    }

    #[test]
    fn seo_fields_are_bounded() {
        let seo = SeoMetadata::new(Some(" Title ".into()), None, Some(String::new())).unwrap();
        assert_eq!(seo.meta_title.as_deref(), Some("Title"));
        assert!(seo.meta_keywords.is_none());
        assert!(SeoMetadata::new(None, Some("d".repeat(161)), None).is_err());
    }
}
