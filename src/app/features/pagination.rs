//! Query-string handling shared by every list endpoint: paging, ordering, search
//! and equality filters, plus the `{count, next, previous, results}` envelope.

use serde::{Deserialize, Serialize};

use crate::app::{
    config::Config,
    db::listing::{self, FilterValue, Page},
    error::AppError,
};

/// Paging, ordering and search parameters. Values arrive as raw strings so bad
/// input is reported as a JSON validation error naming the parameter.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub ordering: Option<String>,
    pub search: Option<String>,
}

impl PageParams {
    /// Resolve the requested page. `page_size` is clamped to the configured maximum.
    pub fn page(&self, config: &Config) -> Result<Page, AppError> {
        let number = match self.page.as_deref() {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| invalid("page"))?,
        };
        let size = match self.page_size.as_deref() {
            None | Some("") => config.default_page_size,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| invalid("page_size"))?
                .min(config.max_page_size),
        };
        number
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(size))
            .ok_or_else(|| invalid("page"))?;
        Ok(Page { number, size })
    }

    pub fn order_by(&self, allowed: &[(&str, &str)], default: &str) -> String {
        listing::order_clause(self.ordering.as_deref(), allowed, default)
    }

    pub fn search(&self, columns: &'static [&'static str]) -> Option<(&'static [&'static str], String)> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| (columns, term.to_string()))
    }
}

/// List response envelope. `next` and `previous` are page numbers.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(results: Vec<T>, count: i64, page: Page) -> Self {
        let next = (page.number.saturating_mul(page.size) < count).then_some(page.number + 1);
        let previous = (page.number > 1).then_some(page.number - 1);
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Validation error for a single named parameter or field.
pub fn invalid(field: &str) -> AppError {
    AppError::Validation(format!("Invalid input: {}", field))
}

/// Equality filters collected from query parameters. Empty values are ignored.
#[derive(Debug, Default)]
pub struct Filters(Vec<(&'static str, FilterValue)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, column: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.0.push((column, FilterValue::Text(value)));
        }
        self
    }

    /// Boolean filter. Accepts `true`/`false` and `1`/`0`; anything else names `field` in the error.
    pub fn flag(mut self, column: &'static str, field: &str, value: Option<String>) -> Result<Self, AppError> {
        if let Some(raw) = value.filter(|v| !v.is_empty()) {
            self.0.push((column, FilterValue::Bool(parse_bool(&raw).ok_or_else(|| invalid(field))?)));
        }
        Ok(self)
    }

    pub fn into_vec(self) -> Vec<(&'static str, FilterValue)> {
        self.0
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
