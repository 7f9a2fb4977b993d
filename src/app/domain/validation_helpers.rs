use std::borrow::Cow;

use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use validator::{ValidationError, ValidationErrors};

/// Calendar dates are stored and exchanged as `YYYY-MM-DD`.
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse an ISO calendar date.
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, DATE_FORMAT).ok()
}

/// Today's date (UTC) in storage format.
pub fn today() -> String {
    OffsetDateTime::now_utc().date().to_string()
}

/// Validator hook for `YYYY-MM-DD` fields.
pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    if parse_date(value).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("date");
    err.message = Some(Cow::Borrowed("must be a date formatted YYYY-MM-DD"));
    Err(err)
}

/// Check that an optional end date does not precede the start date.
/// Both values must already be valid dates; unparseable input is left to `validate_iso_date`.
pub fn check_date_order(start: &str, end: Option<&str>) -> Result<(), &'static str> {
    match (parse_date(start), end.and_then(parse_date)) {
        (Some(s), Some(e)) if e < s => Err("must not be before the start date"),
        _ => Ok(()),
    }
}

/// Turn validator output into a message naming every offending field, e.g. `Invalid input: title, start_date`.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();
    format!("Invalid input: {}", fields.join(", "))
}
