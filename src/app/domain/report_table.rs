//! Typed snapshot stored on a report. The column set is fixed when the table is built,
//! so export never has to guess a header from loosely shaped rows.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered columns plus rows of cells. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Why a client-supplied table was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTableError {
    /// Row at this index has a different width than the header.
    RowWidth(usize),
    /// Record at this index does not have the same keys as the first record.
    ColumnMismatch(usize),
}

impl std::fmt::Display for ReportTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportTableError::RowWidth(i) => write!(f, "row {} does not match the column count", i),
            ReportTableError::ColumnMismatch(i) => write!(f, "record {} does not have the same keys as the first record", i),
        }
    }
}

/// Wire shape accepted for `cached_data`: either the typed table or a list of uniform objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CachedDataInput {
    Table(ReportTable),
    Records(Vec<Map<String, Value>>),
}

impl CachedDataInput {
    pub fn into_table(self) -> Result<ReportTable, ReportTableError> {
        match self {
            CachedDataInput::Table(table) => {
                table.check_widths()?;
                Ok(table)
            }
            CachedDataInput::Records(records) => ReportTable::from_records(records),
        }
    }
}

impl ReportTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row built by the caller. Width is checked by `check_widths` at the boundary.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Build from a list of objects. The first record's key order becomes the header.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Result<Self, ReportTableError> {
        let Some(first) = records.first() else {
            return Ok(Self::default());
        };
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(records.len());
        for (index, mut record) in records.into_iter().enumerate() {
            if record.len() != columns.len() {
                return Err(ReportTableError::ColumnMismatch(index));
            }
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = record
                    .remove(column)
                    .ok_or(ReportTableError::ColumnMismatch(index))?;
                row.push(value);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn check_widths(&self) -> Result<(), ReportTableError> {
        match self.rows.iter().position(|r| r.len() != self.columns.len()) {
            Some(i) => Err(ReportTableError::RowWidth(i)),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render as CSV: header line then one line per row, `\n` terminated.
    pub fn to_csv(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        write_line(&mut out, self.columns.iter().map(|c| Cow::Borrowed(c.as_str())));
        for row in &self.rows {
            write_line(&mut out, row.iter().map(cell_text));
        }
        out
    }
}

fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => "".into(),
        Value::String(s) => s.as_str().into(),
        Value::Bool(b) => b.to_string().into(),
        Value::Number(n) => n.to_string().into(),
        other => other.to_string().into(),
    }
}

fn write_line<'a, I>(out: &mut String, fields: I)
where
    I: Iterator<Item = Cow<'a, str>>,
{
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains(&[',', '"', '\n', '\r'][..]) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(&field);
        }
    }
    out.push('\n');
}
