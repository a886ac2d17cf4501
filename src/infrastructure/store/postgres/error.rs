use crate::domain::errors::DomainError;

const IDX_ARTICLE_SLUG: &str = "articles_slug_lower_key";
const IDX_TAG_SLUG: &str = "tags_slug_lower_key";
const CNT_ARTICLE_TAG: &str = "article_tags_pkey";
const CNT_ARTICLE_PUBLISHED_CHECK: &str = "articles_published_requires_timestamp_chk";
const CNT_ARTICLE_DRAFT_CHECK: &str = "articles_draft_has_no_timestamp_chk";

/// Classify a driver error. Transport-level failures are transient and
/// retryable; anything the server rejected is a persistence failure.
pub fn map_sqlx(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => DomainError::Connectivity(err.to_string()),
        sqlx::Error::Database(db_err) => {
            if let Some(constraint) = db_err.constraint() {
                return match constraint {
                    IDX_ARTICLE_SLUG => DomainError::persistence("article slug already exists"),
                    IDX_TAG_SLUG => DomainError::persistence("tag slug already exists"),
                    CNT_ARTICLE_TAG => DomainError::persistence("tag attached twice"),
                    CNT_ARTICLE_PUBLISHED_CHECK => {
                        DomainError::persistence("published articles require published_at")
                    }
                    CNT_ARTICLE_DRAFT_CHECK => {
                        DomainError::persistence("draft articles cannot carry published_at")
                    }
                    other => {
                        DomainError::persistence(format!("database constraint violation: {other}"))
                    }
                };
            }

            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "23505" => return DomainError::persistence("unique constraint violated"),
                    "23503" => return DomainError::persistence("referenced record not found"),
                    "23514" => return DomainError::persistence("check constraint violated"),
                    // connection exceptions and operator intervention
                    c if c.starts_with("08") || c == "57P01" || c == "57P03" => {
                        return DomainError::Connectivity(db_err.message().to_string());
                    }
                    _ => {}
                }
            }

            DomainError::Persistence(db_err.message().to_string())
        }
        _ => DomainError::Persistence(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_transient() {
        assert!(map_sqlx(sqlx::Error::PoolTimedOut).is_transient());
        assert!(map_sqlx(sqlx::Error::Io(std::io::Error::other("reset"))).is_transient());
        assert!(!map_sqlx(sqlx::Error::RowNotFound).is_transient());
    }
}
