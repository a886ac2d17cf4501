use crate::domain::errors::{DomainError, DomainResult};

const MAX_AUTHOR_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_BODY_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::Validation("author name cannot be empty".into()));
        }
        if value.chars().count() > MAX_AUTHOR_NAME_LEN {
            return Err(DomainError::Validation(format!(
                "author name cannot exceed {MAX_AUTHOR_NAME_LEN} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorEmail(String);

impl AuthorEmail {
    /// Shape check only: one `@` with text on both sides and a dot in the
    /// domain part.
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into().trim().to_string();
        let well_formed = value.len() <= MAX_EMAIL_LEN
            && !value.contains(char::is_whitespace)
            && value.split_once('@').is_some_and(|(local, domain)| {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            });
        if !well_formed {
            return Err(DomainError::Validation(
                "author email is not a valid address".into(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::Validation("comment cannot be empty".into()));
        }
        if value.chars().count() > MAX_BODY_LEN {
            return Err(DomainError::Validation(format!(
                "comment cannot exceed {MAX_BODY_LEN} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(AuthorEmail::new("reader@example.com").is_ok());
        assert!(AuthorEmail::new("reader@localhost").is_err());
        assert!(AuthorEmail::new("@example.com").is_err());
        assert!(AuthorEmail::new("a b@example.com").is_err());
        assert!(AuthorEmail::new("a@b@example.com").is_err());
    }

    #[test]
    fn body_and_name_are_required() {
        assert!(CommentBody::new("  ").is_err());
        assert!(AuthorName::new("").is_err());
        assert_eq!(AuthorName::new(" Ada ").unwrap().as_str(), "Ada");
    }
}
