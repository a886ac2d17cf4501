// src/domain/slug.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::util::SlugGenerator;
use crate::domain::errors::{DomainError, DomainResult};

pub const MAX_SLUG_LEN: usize = 50;

/// Lower-case, hyphen-separated ASCII: `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn is_valid(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

/// Map free text to a URL-safe slug of at most [`MAX_SLUG_LEN`] characters.
/// The result may be empty when the input has no usable characters.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_separator = true;
        }
    }

    truncate(&slug, MAX_SLUG_LEN).to_string()
}

fn truncate(slug: &str, max: usize) -> &str {
    // slugs are ASCII, so byte offsets are char offsets
    let cut = slug.len().min(max);
    slug[..cut].trim_end_matches('-')
}

/// `base-n`, shortening `base` so the whole candidate still fits.
pub fn with_suffix(base: &str, n: u64) -> String {
    let suffix = format!("-{n}");
    let room = MAX_SLUG_LEN.saturating_sub(suffix.len());
    format!("{}{suffix}", truncate(base, room))
}

/// Case-insensitive existence check against stored slugs.
#[async_trait]
pub trait SlugLookup: Send + Sync {
    async fn slug_taken(&self, candidate: &str, ignore: Option<Uuid>) -> DomainResult<bool>;
}

/// Produces collision-free slugs for tags and articles.
///
/// The existence check and the later insert are separate round trips; the
/// unique index on `LOWER(slug)` rejects the loser of a concurrent race with
/// a persistence error rather than storing a duplicate.
#[derive(Clone)]
pub struct SlugService {
    generator: Arc<dyn SlugGenerator>,
}

impl SlugService {
    pub fn new(generator: Arc<dyn SlugGenerator>) -> Self {
        Self { generator }
    }

    pub fn slugify(&self, text: &str) -> String {
        self.generator.slugify(text)
    }

    pub async fn generate_unique_slug(
        &self,
        lookup: &dyn SlugLookup,
        name: &str,
        ignore: Option<Uuid>,
    ) -> DomainResult<String> {
        let base = self.generator.slugify(name);
        if base.is_empty() {
            return Err(DomainError::validation(format!(
                "`{name}` does not contain any characters usable in a slug"
            )));
        }
        first_free(lookup, &base, ignore).await
    }

    /// Article slugs fall back to `article-<unix time>` for titles without
    /// usable characters.
    pub async fn generate_article_slug(
        &self,
        lookup: &dyn SlugLookup,
        title: &str,
        ignore: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> DomainResult<String> {
        let base = self.generator.slugify(title);
        let base = if base.is_empty() {
            format!("article-{}", now.timestamp())
        } else {
            base
        };
        first_free(lookup, &base, ignore).await
    }
}

async fn first_free(
    lookup: &dyn SlugLookup,
    base: &str,
    ignore: Option<Uuid>,
) -> DomainResult<String> {
    if !lookup.slug_taken(base, ignore).await? {
        return Ok(base.to_string());
    }

    let mut counter = 1u64;
    loop {
        let candidate = with_suffix(base, counter);
        if !lookup.slug_taken(&candidate, ignore).await? {
            return Ok(candidate);
        }
        counter = counter
            .checked_add(1)
            .ok_or_else(|| DomainError::validation(format!("no free slug left for `{base}`")))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct Taken(Mutex<HashSet<String>>);

    impl Taken {
        fn new(items: &[&str]) -> Self {
            Self(Mutex::new(items.iter().map(|s| (*s).to_string()).collect()))
        }
    }

    #[async_trait]
    impl SlugLookup for Taken {
        async fn slug_taken(&self, candidate: &str, _ignore: Option<Uuid>) -> DomainResult<bool> {
            Ok(self.0.lock().unwrap().contains(&candidate.to_lowercase()))
        }
    }

    struct Builtin;

    impl SlugGenerator for Builtin {
        fn slugify(&self, input: &str) -> String {
            slugify(input)
        }
    }

    fn service() -> SlugService {
        SlugService::new(Arc::new(Builtin))
    }

    #[test]
    fn slugify_strips_and_collapses() {
        assert_eq!(slugify("C# .NET!!"), "c-net");
        assert_eq!(slugify("  Hello   World  "), "hello-world");
        assert_eq!(slugify("--rust--lang--"), "rust-lang");
        assert_eq!(slugify("Crème brûlée"), "crme-brle");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_truncates_without_trailing_hyphen() {
        let input = format!("{} tail", "a".repeat(49));
        let slug = slugify(&input);
        assert_eq!(slug, "a".repeat(49));
        assert!(is_valid(&slug));
    }

    #[test]
    fn suffix_keeps_length_bound() {
        let base = "b".repeat(50);
        let candidate = with_suffix(&base, 12);
        assert_eq!(candidate.len(), MAX_SLUG_LEN);
        assert!(candidate.ends_with("-12"));
        assert!(is_valid(&candidate));
    }

    #[test]
    fn validity_matches_slug_shape() {
        assert!(is_valid("c-net-1"));
        assert!(!is_valid(""));
        assert!(!is_valid("-c"));
        assert!(!is_valid("c--net"));
        assert!(!is_valid("C-net"));
    }

    #[tokio::test]
    async fn collisions_get_numeric_suffixes() {
        let lookup = Taken::new(&["c-net"]);
        let slug = service()
            .generate_unique_slug(&lookup, "C# .NET", None)
            .await
            .unwrap();
        assert_eq!(slug, "c-net-1");

        let lookup = Taken::new(&["c-net", "c-net-1"]);
        let slug = service()
            .generate_unique_slug(&lookup, "C# .NET", None)
            .await
            .unwrap();
        assert_eq!(slug, "c-net-2");
    }

    #[tokio::test]
    async fn empty_names_are_rejected_but_articles_fall_back() {
        let lookup = Taken::new(&[]);
        assert!(matches!(
            service().generate_unique_slug(&lookup, "???", None).await,
            Err(DomainError::Validation(_))
        ));

        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let slug = service()
            .generate_article_slug(&lookup, "???", None, now)
            .await
            .unwrap();
        assert_eq!(slug, "article-1700000000");
    }
}
