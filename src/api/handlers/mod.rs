pub mod pages;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::board::KidBoard;
use crate::db::Database;
use crate::error::TrackerError;
use crate::models::*;
use crate::report::{self, KidReport, ReportPeriod};

// ============================================================
// Error Handling
// ============================================================

/// Map a store error to a response.
///
/// Domain errors ([`TrackerError`]) are safe to show to the client. Anything
/// else is logged in full and replaced by a generic message.
fn internal_error(e: anyhow::Error) -> (StatusCode, String) {
    match e.downcast_ref::<TrackerError>() {
        Some(TrackerError::NotFound(_)) => {
            tracing::warn!("Not found: {}", e);
            (StatusCode::NOT_FOUND, e.to_string())
        }
        Some(TrackerError::Invalid(_)) => {
            tracing::warn!("Validation error: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        None => {
            tracing::error!("Internal error: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

fn not_found(what: &'static str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, TrackerError::NotFound(what).to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Kids
// ============================================================

pub async fn list_kids(
    State(db): State<Database>,
) -> Result<Json<Vec<Kid>>, (StatusCode, String)> {
    db.get_all_kids().map(Json).map_err(internal_error)
}

pub async fn get_kid(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Kid>, (StatusCode, String)> {
    db.get_kid(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Kid"))
}

pub async fn create_kid(
    State(db): State<Database>,
    Json(input): Json<CreateKidInput>,
) -> Result<(StatusCode, Json<Kid>), (StatusCode, String)> {
    db.create_kid(input)
        .map(|k| (StatusCode::CREATED, Json(k)))
        .map_err(internal_error)
}

pub async fn update_kid(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateKidInput>,
) -> Result<Json<Kid>, (StatusCode, String)> {
    db.update_kid(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Kid"))
}

pub async fn set_kid_photo(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<SetKidPhotoInput>,
) -> Result<Json<Kid>, (StatusCode, String)> {
    db.set_kid_photo(id, input.photo_url)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Kid"))
}

pub async fn delete_kid(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_kid(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Kid"))
    }
}

pub async fn list_kid_progress(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Progress>>, (StatusCode, String)> {
    db.get_kid(id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Kid"))?;

    db.get_progresses_for_kid(id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_kid_board(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<KidBoard>, (StatusCode, String)> {
    db.get_kid(id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Kid"))?;

    let workshops = db.get_all_workshops().map_err(internal_error)?;
    let progresses = db.get_progresses_for_kid(id).map_err(internal_error)?;
    Ok(Json(KidBoard::build(&workshops, &progresses)))
}

/// Query parameters shared by the JSON and HTML reports.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "kidId")]
    pub kid_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Only the literal `"true"` enables percentages.
    #[serde(rename = "includePercentages")]
    pub include_percentages: Option<String>,
}

impl ReportQuery {
    pub fn period(&self) -> ReportPeriod {
        ReportPeriod::parse(self.from.as_deref(), self.to.as_deref())
    }

    pub fn include_percentages(&self) -> bool {
        self.include_percentages.as_deref() == Some("true")
    }
}

pub async fn get_kid_report(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<KidReport>, (StatusCode, String)> {
    report::kid_report(&db, id, &query.period(), query.include_percentages())
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Kid"))
}

pub async fn apply_progress_action(
    State(db): State<Database>,
    Path((kid_id, workshop_id, action)): Path<(Uuid, Uuid, String)>,
    input: Option<Json<ProgressActionInput>>,
) -> Result<Json<Progress>, (StatusCode, String)> {
    let action = ProgressAction::from_str(&action).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("Unknown progress action: {}", action),
        )
    })?;
    let at = input.and_then(|Json(i)| i.at).unwrap_or_else(Utc::now);

    db.apply_progress_action(kid_id, workshop_id, action, at)
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// Workshops
// ============================================================

pub async fn list_workshops(
    State(db): State<Database>,
) -> Result<Json<Vec<Workshop>>, (StatusCode, String)> {
    db.get_all_workshops().map(Json).map_err(internal_error)
}

pub async fn get_workshop(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Workshop>, (StatusCode, String)> {
    db.get_workshop(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Workshop"))
}

pub async fn create_workshop(
    State(db): State<Database>,
    Json(input): Json<CreateWorkshopInput>,
) -> Result<(StatusCode, Json<Workshop>), (StatusCode, String)> {
    db.create_workshop(input)
        .map(|w| (StatusCode::CREATED, Json(w)))
        .map_err(internal_error)
}

pub async fn update_workshop(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateWorkshopInput>,
) -> Result<Json<Workshop>, (StatusCode, String)> {
    db.update_workshop(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Workshop"))
}

pub async fn delete_workshop(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_workshop(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Workshop"))
    }
}

pub async fn list_workshop_progress(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Progress>>, (StatusCode, String)> {
    db.get_workshop(id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Workshop"))?;

    db.get_progresses_for_workshop(id)
        .map(Json)
        .map_err(internal_error)
}
