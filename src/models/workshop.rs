use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An activity kids are presented with and later validated on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workshop {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new workshop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkshopInput {
    pub name: String,
}

/// Input for updating an existing workshop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkshopInput {
    pub name: Option<String>,
}
