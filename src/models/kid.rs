use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A child followed through the workshops.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kid {
    pub id: Uuid,
    pub name: String,
    pub level: KidLevel,
    /// Reference to the kid's photo, usually a URL or a data URI.
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The level chip shown next to a kid's name.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KidLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl KidLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Input for creating a new kid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateKidInput {
    pub name: String,
    /// Defaults to `Beginner` if not specified.
    #[serde(default)]
    pub level: Option<KidLevel>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Input for updating an existing kid. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateKidInput {
    pub name: Option<String>,
    pub level: Option<KidLevel>,
}

/// Input for replacing a kid's photo. `None` removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetKidPhotoInput {
    pub photo_url: Option<String>,
}
