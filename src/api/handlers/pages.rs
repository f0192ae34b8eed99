//! The printable progress report page.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use uuid::Uuid;

use super::{internal_error, ReportQuery};
use crate::db::Database;
use crate::report::{self, render};

const PAGE_TITLE: &str = "Progression";

/// `GET /settings/progress/{mode}`
///
/// `mode == "all"` prints every kid, one per page. Any other mode prints the
/// kid named by `kidId`. An unknown kid yields an empty page, and a missing
/// `kidId` yields an inline message.
pub async fn progress_report(
    State(db): State<Database>,
    Path(mode): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<(StatusCode, Html<String>), (StatusCode, String)> {
    let period = query.period();
    let include_percentages = query.include_percentages();
    tracing::debug!(mode = %mode, ?period, include_percentages, "Rendering progress report");

    if mode == "all" {
        let reports = report::all_kids_reports(&db, &period, include_percentages)
            .map_err(internal_error)?;
        let body = render::render_reports(&reports);
        return Ok((StatusCode::OK, Html(render::render_page(PAGE_TITLE, &body))));
    }

    let Some(kid_id) = query.kid_id.as_deref().filter(|s| !s.is_empty()) else {
        let body = render::render_missing_kid_id();
        return Ok((
            StatusCode::BAD_REQUEST,
            Html(render::render_page(PAGE_TITLE, &body)),
        ));
    };

    let report = match Uuid::parse_str(kid_id) {
        Ok(id) => report::kid_report(&db, id, &period, include_percentages)
            .map_err(internal_error)?,
        Err(_) => {
            tracing::debug!("Report requested for malformed kid id {:?}", kid_id);
            None
        }
    };

    let body = report
        .as_ref()
        .map(render::render_kid_report)
        .unwrap_or_default();
    Ok((StatusCode::OK, Html(render::render_page(PAGE_TITLE, &body))))
}
