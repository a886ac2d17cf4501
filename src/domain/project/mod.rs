use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::ConcurrencyToken;
use crate::domain::persistence::entity::unexpected_record;
use crate::domain::persistence::{Column, Entity, EntityKind, FieldValue, Record};
use chrono::{DateTime, NaiveDate, Utc};

pub use crate::domain::ids::ProjectId;

const MAX_TITLE_LEN: usize = 150;
const MAX_TECH_STACK_LEN: usize = 500;

/// Portfolio entry shown on the projects page, ordered by `display_order`.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub display_order: i32,
    pub is_active: bool,
    pub completed_on: Option<NaiveDate>,
    pub repository_url: Option<String>,
    pub live_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    version: ConcurrencyToken,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectDetails {
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub display_order: i32,
    pub is_active: bool,
    pub completed_on: Option<NaiveDate>,
    pub repository_url: Option<String>,
    pub live_url: Option<String>,
}

impl ProjectDetails {
    pub fn validate(&self) -> DomainResult<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("title cannot be empty".into()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "title cannot exceed {MAX_TITLE_LEN} characters"
            )));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::Validation("description cannot be empty".into()));
        }
        if self.tech_stack.chars().count() > MAX_TECH_STACK_LEN {
            return Err(DomainError::Validation(format!(
                "tech stack cannot exceed {MAX_TECH_STACK_LEN} characters"
            )));
        }
        if self.display_order < 0 {
            return Err(DomainError::Validation(
                "display order cannot be negative".into(),
            ));
        }
        for url in [&self.repository_url, &self.live_url].into_iter().flatten() {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(DomainError::Validation(format!(
                    "`{url}` is not an http(s) link"
                )));
            }
        }
        Ok(())
    }
}

impl Project {
    pub fn new(details: ProjectDetails, now: DateTime<Utc>) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id: ProjectId::new(),
            title: details.title.trim().to_string(),
            description: details.description,
            tech_stack: details.tech_stack,
            display_order: details.display_order,
            is_active: details.is_active,
            completed_on: details.completed_on,
            repository_url: details.repository_url,
            live_url: details.live_url,
            created_at: now,
            updated_at: now,
            version: ConcurrencyToken::unsaved(),
        })
    }

    /// Rebuild from stored state.
    pub fn restore(
        id: ProjectId,
        details: ProjectDetails,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: ConcurrencyToken,
    ) -> Self {
        Self {
            id,
            title: details.title,
            description: details.description,
            tech_stack: details.tech_stack,
            display_order: details.display_order,
            is_active: details.is_active,
            completed_on: details.completed_on,
            repository_url: details.repository_url,
            live_url: details.live_url,
            created_at,
            updated_at,
            version,
        }
    }

    pub fn apply(&mut self, details: ProjectDetails, now: DateTime<Utc>) -> DomainResult<()> {
        details.validate()?;
        self.title = details.title.trim().to_string();
        self.description = details.description;
        self.tech_stack = details.tech_stack;
        self.display_order = details.display_order;
        self.is_active = details.is_active;
        self.completed_on = details.completed_on;
        self.repository_url = details.repository_url;
        self.live_url = details.live_url;
        self.updated_at = now;
        Ok(())
    }

    pub fn details(&self) -> ProjectDetails {
        ProjectDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            tech_stack: self.tech_stack.clone(),
            display_order: self.display_order,
            is_active: self.is_active,
            completed_on: self.completed_on,
            repository_url: self.repository_url.clone(),
            live_url: self.live_url.clone(),
        }
    }

    pub const fn version(&self) -> ConcurrencyToken {
        self.version
    }

    #[must_use]
    pub fn with_expected_version(mut self, version: ConcurrencyToken) -> Self {
        self.version = version;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectColumn {
    Id,
    Title,
    Description,
    TechStack,
    DisplayOrder,
    IsActive,
    CompletedOn,
    RepositoryUrl,
    LiveUrl,
    CreatedAt,
    UpdatedAt,
}

impl Column for ProjectColumn {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Title,
        Self::Description,
        Self::TechStack,
        Self::DisplayOrder,
        Self::IsActive,
        Self::CompletedOn,
        Self::RepositoryUrl,
        Self::LiveUrl,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::TechStack => "tech_stack",
            Self::DisplayOrder => "display_order",
            Self::IsActive => "is_active",
            Self::CompletedOn => "completed_on",
            Self::RepositoryUrl => "repository_url",
            Self::LiveUrl => "live_url",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl Entity for Project {
    type Id = ProjectId;
    type Column = ProjectColumn;

    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> ProjectId {
        self.id
    }

    fn concurrency_token(&self) -> Option<ConcurrencyToken> {
        Some(self.version)
    }

    fn assign_concurrency_token(&mut self, token: ConcurrencyToken) {
        self.version = token;
    }

    fn field(&self, column: ProjectColumn) -> FieldValue {
        match column {
            ProjectColumn::Id => self.id.into(),
            ProjectColumn::Title => self.title.as_str().into(),
            ProjectColumn::Description => self.description.as_str().into(),
            ProjectColumn::TechStack => self.tech_stack.as_str().into(),
            ProjectColumn::DisplayOrder => self.display_order.into(),
            ProjectColumn::IsActive => self.is_active.into(),
            ProjectColumn::CompletedOn => self.completed_on.into(),
            ProjectColumn::RepositoryUrl => self.repository_url.clone().into(),
            ProjectColumn::LiveUrl => self.live_url.clone().into(),
            ProjectColumn::CreatedAt => self.created_at.into(),
            ProjectColumn::UpdatedAt => self.updated_at.into(),
        }
    }

    fn into_record(self) -> Record {
        Record::Project(self)
    }

    fn from_record(record: Record) -> DomainResult<Self> {
        match record {
            Record::Project(project) => Ok(project),
            other => Err(unexpected_record(EntityKind::Project, &other)),
        }
    }
}
