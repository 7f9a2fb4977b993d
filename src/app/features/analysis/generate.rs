//! Report generation. Each typed report kind builds its table from the generating
//! principal's scoped collections, narrowed to the report's organization when it has one.
//!
//! The table is shared by everyone who can read the report, so only principals who reach
//! the report's organization (or, for reports without one, its creator) may rebuild it.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use super::types::ReportResponse;
use crate::app::{
    db::{self, reports::Report},
    domain::{metrics::attendance_rate, Principal, ReportTable, ReportType},
    error::AppError,
    scope::{scope, ResourceFacts, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

fn report_type(report: &Report) -> Result<ReportType, AppError> {
    report.report_type.parse::<ReportType>().map_err(|_| {
        tracing::error!(report_id = %report.id, report_type = %report.report_type, "unknown report type");
        AppError::Internal
    })
}

/// Collection a report kind is built from.
fn source_kind(report_type: ReportType) -> ResourceKind {
    match report_type {
        ReportType::IndicatorSummary => ResourceKind::Aggregate,
        ReportType::EventAttendance => ResourceKind::Event,
        ReportType::ReferralStatus => ResourceKind::Referral,
        ReportType::Custom => ResourceKind::Report,
    }
}

/// Whether `principal` may overwrite the shared table of `report`.
pub fn may_generate(principal: &Principal, report: &Report, report_type: ReportType) -> bool {
    if principal.is_admin() {
        return true;
    }
    match report.organization_id.as_deref() {
        Some(organization) => {
            scope(principal, source_kind(report_type)).admits(&ResourceFacts::reaching([organization]))
        }
        None => report.created_by.as_deref() == Some(principal.user_id.as_str()),
    }
}

/// Build the table for `report`. Returns None for custom reports, whose table is client-supplied.
pub async fn build_table(
    pool: &SqlitePool,
    principal: &Principal,
    report: &Report,
) -> Result<Option<ReportTable>, AppError> {
    let report_type = report_type(report)?;
    let organization = report.organization_id.as_deref();

    let table = match report_type {
        ReportType::IndicatorSummary => {
            let scope = scope(principal, ResourceKind::Aggregate);
            let totals = db::aggregates::totals_by_indicator(pool, &scope, organization).await?;
            let mut table = ReportTable::new(["indicator_id", "indicator", "aggregate_count", "total_value"]);
            for total in totals {
                table.push_row(vec![
                    json!(total.indicator_id),
                    json!(total.indicator_name),
                    json!(total.aggregate_count),
                    json!(total.total_value),
                ]);
            }
            table
        }
        ReportType::EventAttendance => {
            let scope = scope(principal, ResourceKind::Event);
            let events = db::events::all_scoped(pool, &scope).await?;
            let mut table = ReportTable::new([
                "event_id",
                "title",
                "start_date",
                "status",
                "expected_participants",
                "actual_participants",
                "attendance_rate",
            ]);
            for event in events
                .into_iter()
                .filter(|event| organization.map_or(true, |org| event.organization_id == org))
            {
                let rate = attendance_rate(event.expected_participants, event.actual_participants);
                table.push_row(vec![
                    json!(event.id),
                    json!(event.title),
                    json!(event.start_date),
                    json!(event.status),
                    json!(event.expected_participants),
                    json!(event.actual_participants),
                    json!(rate),
                ]);
            }
            table
        }
        ReportType::ReferralStatus => {
            let scope = scope(principal, ResourceKind::Referral);
            let counts = db::referrals::count_by_status(pool, &scope, organization).await?;
            let mut table = ReportTable::new(["status", "count"]);
            for count in counts {
                table.push_row(vec![Value::String(count.status), json!(count.count)]);
            }
            table
        }
        ReportType::Custom => return Ok(None),
    };

    Ok(Some(table))
}

/// POST /api/analysis/reports/:id/generate. Rebuilds the table and stamps `last_generated`.
pub async fn generate_report(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>, AppError> {
    let scope = scope(&principal, ResourceKind::Report);
    let report = db::reports::find_scoped(&state.db, &scope, &id)
        .await?
        .ok_or_else(AppError::not_found)?;
    if !may_generate(&principal, &report, report_type(&report)?) {
        tracing::warn!(report_id = %report.id, user_id = %principal.user_id, "report generation refused");
        return Err(AppError::not_found());
    }

    let table = build_table(&state.db, &principal, &report).await?;
    let encoded = table
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|_| AppError::Internal)?;
    db::reports::store_generated(&state.db, &report.id, encoded.as_deref()).await?;

    tracing::info!(
        report_id = %report.id,
        report_type = %report.report_type,
        rows = table.as_ref().map_or(0, |t| t.rows.len()),
        "report generated"
    );

    let generated = db::reports::find_scoped(&state.db, &scope, &report.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok(Json(generated.into()))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/analysis/reports/:id/generate", post(generate_report))
}
