use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::types::stored_table;
use crate::app::{
    db,
    error::AppError,
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

/// `attachment; filename="<name>.csv"` with characters that would break the header replaced.
pub fn content_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{}.csv\"", safe)
}

/// GET /api/analysis/reports/:id/download. A report without a table downloads as an empty file.
pub async fn download_report(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let scope = scope(&principal, ResourceKind::Report);
    let report = db::reports::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;

    let body = stored_table(&report).map(|table| table.to_csv()).unwrap_or_default();

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&report.name)),
        ],
        body,
    )
        .into_response())
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/analysis/reports/:id/download", get(download_report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_quoted_and_sanitised() {
        assert_eq!(content_disposition("Q1 summary"), "attachment; filename=\"Q1 summary.csv\"");
        assert_eq!(content_disposition("a\"b\nc"), "attachment; filename=\"a_b_c.csv\"");
    }
}
