use serde::Serialize;
use serde_json::Value;

use crate::app::{
    db::reports::Report,
    domain::{CachedDataInput, ReportTable},
    error::AppError,
    features::pagination::invalid,
};

/// Report with its JSON columns decoded.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub parameters: Value,
    pub cached_data: Option<ReportTable>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        let parameters = serde_json::from_str(&report.parameters).unwrap_or_else(|err| {
            tracing::warn!(report_id = %report.id, %err, "stored report parameters are unreadable");
            Value::Object(Default::default())
        });
        let cached_data = stored_table(&report);
        Self {
            report,
            parameters,
            cached_data,
        }
    }
}

/// Decode the stored table. A report without one, or with an unreadable one, has no table.
pub fn stored_table(report: &Report) -> Option<ReportTable> {
    let raw = report.cached_data.as_deref()?;
    match serde_json::from_str::<ReportTable>(raw) {
        Ok(table) => Some(table),
        Err(err) => {
            tracing::warn!(report_id = %report.id, %err, "stored report table is unreadable");
            None
        }
    }
}

/// Validate a client-supplied table and encode it for storage.
pub fn encode_table(input: CachedDataInput) -> Result<String, AppError> {
    let table = input
        .into_table()
        .map_err(|err| AppError::Validation(format!("Invalid input: cached_data ({})", err)))?;
    serde_json::to_string(&table).map_err(|_| AppError::Internal)
}

/// `parameters` must be a JSON object.
pub fn encode_parameters(parameters: &Value) -> Result<String, AppError> {
    if !parameters.is_object() {
        return Err(invalid("parameters"));
    }
    Ok(parameters.to_string())
}
