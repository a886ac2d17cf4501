use crate::{
    application::{error::ApplicationResult, unit_of_work::UnitOfWork},
    domain::{
        persistence::Predicate,
        slug::SlugService,
        tag::{Tag, TagColumn, TagName, TagSlug},
    },
};
use chrono::{DateTime, Utc};

/// Map tag display names to tags, creating the missing ones.
///
/// Existing tags are matched on their slug, case-insensitively. New tags are
/// flushed one by one so later names in the same call (and the caller's
/// transaction) see them. Order follows `names`; duplicates collapse.
pub(crate) async fn resolve_tags(
    uow: &UnitOfWork,
    slugs: &SlugService,
    names: &[String],
    now: DateTime<Utc>,
) -> ApplicationResult<Vec<Tag>> {
    let tags = uow.tags();
    let mut resolved: Vec<Tag> = Vec::with_capacity(names.len());

    for raw in names {
        let name = TagName::new(raw.as_str())?;
        let base = slugs.slugify(name.as_str());
        let existing = if base.is_empty() {
            None
        } else {
            tags.get_all(Some(Predicate::eq_ignore_case(TagColumn::Slug, base)))
                .await?
                .into_iter()
                .next()
        };

        let tag = match existing {
            Some(tag) => tag,
            None => {
                let slug = slugs
                    .generate_unique_slug(&tags, name.as_str(), None)
                    .await?;
                let tag = tags.add(Tag::new(name, TagSlug::new(slug)?, None, now)?).await?;
                uow.save_changes().await?;
                tracing::debug!(tag_id = %tag.id, slug = %tag.slug, "tag created for article");
                tag
            }
        };

        if !resolved.iter().any(|known| known.id == tag.id) {
            resolved.push(tag);
        }
    }

    Ok(resolved)
}
