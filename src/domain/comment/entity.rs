use super::value_objects::{AuthorEmail, AuthorName, CommentBody};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::{ArticleId, CommentId, ConcurrencyToken};
use crate::domain::persistence::entity::unexpected_record;
use crate::domain::persistence::{Column, Entity, EntityKind, FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Spam,
}

impl CommentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Spam => "spam",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "spam" => Ok(Self::Spam),
            other => Err(DomainError::validation(format!(
                "unknown comment status `{other}`"
            ))),
        }
    }
}

impl From<CommentStatus> for FieldValue {
    fn from(value: CommentStatus) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

/// Moderator decision. Every action is legal from every state so mistakes
/// can be corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
    MarkSpam,
}

impl ModerationAction {
    pub const fn target(self) -> CommentStatus {
        match self {
            Self::Approve => CommentStatus::Approved,
            Self::Reject => CommentStatus::Rejected,
            Self::MarkSpam => CommentStatus::Spam,
        }
    }

    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Approve => "CommentApproved",
            Self::Reject => "CommentRejected",
            Self::MarkSpam => "CommentMarkedSpam",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub author_name: AuthorName,
    pub author_email: AuthorEmail,
    pub content: CommentBody,
    pub submitted_at: DateTime<Utc>,
    /// Anti-abuse triage metadata; no behaviour depends on it.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    status: CommentStatus,
    approved_at: Option<DateTime<Utc>>,
    version: ConcurrencyToken,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: ArticleId,
    pub author_name: AuthorName,
    pub author_email: AuthorEmail,
    pub content: CommentBody,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommentParts {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub author_name: AuthorName,
    pub author_email: AuthorEmail,
    pub content: CommentBody,
    pub submitted_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: CommentStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub version: ConcurrencyToken,
}

impl Comment {
    /// Every submission starts unmoderated.
    pub fn submit(new: NewComment, now: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::new(),
            article_id: new.article_id,
            author_name: new.author_name,
            author_email: new.author_email,
            content: new.content,
            submitted_at: now,
            ip_address: new.ip_address,
            user_agent: new.user_agent,
            status: CommentStatus::Pending,
            approved_at: None,
            version: ConcurrencyToken::unsaved(),
        }
    }

    pub fn restore(parts: CommentParts) -> Self {
        Self {
            id: parts.id,
            article_id: parts.article_id,
            author_name: parts.author_name,
            author_email: parts.author_email,
            content: parts.content,
            submitted_at: parts.submitted_at,
            ip_address: parts.ip_address,
            user_agent: parts.user_agent,
            status: parts.status,
            approved_at: parts.approved_at,
            version: parts.version,
        }
    }

    pub const fn status(&self) -> CommentStatus {
        self.status
    }

    pub const fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub const fn version(&self) -> ConcurrencyToken {
        self.version
    }

    #[must_use]
    pub fn with_expected_version(mut self, version: ConcurrencyToken) -> Self {
        self.version = version;
        self
    }

    pub fn moderate(&mut self, action: ModerationAction, now: DateTime<Utc>) {
        match action {
            ModerationAction::Approve => self.approve(now),
            ModerationAction::Reject => self.reject(),
            ModerationAction::MarkSpam => self.mark_spam(),
        }
    }

    pub fn approve(&mut self, now: DateTime<Utc>) {
        self.status = CommentStatus::Approved;
        self.approved_at = Some(now);
    }

    pub fn reject(&mut self) {
        self.status = CommentStatus::Rejected;
        self.approved_at = None;
    }

    pub fn mark_spam(&mut self) {
        self.status = CommentStatus::Spam;
        self.approved_at = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentColumn {
    Id,
    ArticleId,
    AuthorName,
    AuthorEmail,
    Content,
    Status,
    SubmittedAt,
    ApprovedAt,
    IpAddress,
    UserAgent,
}

impl Column for CommentColumn {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::ArticleId,
        Self::AuthorName,
        Self::AuthorEmail,
        Self::Content,
        Self::Status,
        Self::SubmittedAt,
        Self::ApprovedAt,
        Self::IpAddress,
        Self::UserAgent,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ArticleId => "article_id",
            Self::AuthorName => "author_name",
            Self::AuthorEmail => "author_email",
            Self::Content => "content",
            Self::Status => "status",
            Self::SubmittedAt => "submitted_at",
            Self::ApprovedAt => "approved_at",
            Self::IpAddress => "ip_address",
            Self::UserAgent => "user_agent",
        }
    }
}

impl Entity for Comment {
    type Id = CommentId;
    type Column = CommentColumn;

    const KIND: EntityKind = EntityKind::Comment;

    fn id(&self) -> CommentId {
        self.id
    }

    fn concurrency_token(&self) -> Option<ConcurrencyToken> {
        Some(self.version)
    }

    fn assign_concurrency_token(&mut self, token: ConcurrencyToken) {
        self.version = token;
    }

    fn field(&self, column: CommentColumn) -> FieldValue {
        match column {
            CommentColumn::Id => self.id.into(),
            CommentColumn::ArticleId => self.article_id.into(),
            CommentColumn::AuthorName => self.author_name.as_str().into(),
            CommentColumn::AuthorEmail => self.author_email.as_str().into(),
            CommentColumn::Content => self.content.as_str().into(),
            CommentColumn::Status => self.status.into(),
            CommentColumn::SubmittedAt => self.submitted_at.into(),
            CommentColumn::ApprovedAt => self.approved_at.into(),
            CommentColumn::IpAddress => self.ip_address.clone().into(),
            CommentColumn::UserAgent => self.user_agent.clone().into(),
        }
    }

    fn into_record(self) -> Record {
        Record::Comment(self)
    }

    fn from_record(record: Record) -> DomainResult<Self> {
        match record {
            Record::Comment(comment) => Ok(comment),
            other => Err(unexpected_record(EntityKind::Comment, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> Comment {
        Comment::submit(
            NewComment {
                article_id: ArticleId::new(),
                author_name: AuthorName::new("Ada").unwrap(),
                author_email: AuthorEmail::new("ada@example.com").unwrap(),
                content: CommentBody::new("Nice post").unwrap(),
                ip_address: Some("203.0.113.7".into()),
                user_agent: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn submission_is_always_pending() {
        let comment = submitted();
        assert_eq!(comment.status(), CommentStatus::Pending);
        assert!(comment.approved_at().is_none());
    }

    #[test]
    fn moderation_can_move_between_any_states() {
        let mut comment = submitted();
        let now = Utc::now();

        comment.moderate(ModerationAction::MarkSpam, now);
        assert_eq!(comment.status(), CommentStatus::Spam);

        comment.moderate(ModerationAction::Approve, now);
        assert_eq!(comment.status(), CommentStatus::Approved);
        assert_eq!(comment.approved_at(), Some(now));

        comment.moderate(ModerationAction::Reject, now);
        assert_eq!(comment.status(), CommentStatus::Rejected);
        assert!(comment.approved_at().is_none());

        comment.moderate(ModerationAction::Approve, now);
        assert_eq!(comment.status(), CommentStatus::Approved);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            CommentStatus::Pending,
            CommentStatus::Approved,
            CommentStatus::Rejected,
            CommentStatus::Spam,
        ] {
            assert_eq!(status.as_str().parse::<CommentStatus>().unwrap(), status);
        }
    }
}
