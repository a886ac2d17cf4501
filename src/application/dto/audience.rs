use serde::{Deserialize, Serialize};

/// Who is reading. Authentication happens upstream; this crate only needs
/// to know which view to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Published articles, active projects and approved comments only.
    #[default]
    Public,
    /// Everything, including drafts and the moderation queue.
    Staff,
}

impl Audience {
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Staff)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Staff => "staff",
        }
    }
}
