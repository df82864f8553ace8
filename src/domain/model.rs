use chrono::{Datelike, Days, Local, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;

use crate::utils::error::{Result, TollError};

pub const PORTAL_DATE_FORMAT: &str = "%m/%d/%Y";

/// Inclusive calendar date range covering one full month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// The full calendar month preceding `today`.
    pub fn previous_month(today: NaiveDate) -> Self {
        let first_of_month = today - Days::new(u64::from(today.day0()));
        let end = first_of_month - Days::new(1);
        let start = end - Days::new(u64::from(end.day0()));
        Self { start, end }
    }

    pub fn for_today() -> Self {
        Self::previous_month(Local::now().date_naive())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `(startDate, endDate)` as the portal's `MM/DD/YYYY` form values.
    pub fn portal_fields(&self) -> (String, String) {
        (
            self.start.format(PORTAL_DATE_FORMAT).to_string(),
            self.end.format(PORTAL_DATE_FORMAT).to_string(),
        )
    }

    /// `YYYY-MM` label used in output object names.
    pub fn month_label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.portal_fields();
        write!(f, "{} - {}", start, end)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Unparsed HTML returned by the portal's transaction query.
#[derive(Debug, Clone)]
pub struct RawDocument(String);

impl RawDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Allow-list filtered transaction table. Every row is aligned with the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != header.len())
        {
            return Err(TollError::MalformedRow {
                row: idx + 1,
                found: row.len(),
                required: header.len(),
            });
        }
        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Zero-based index of the column whose header equals `name`, ignoring case.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| TollError::ColumnNotFound {
                column: name.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Total(Decimal);

impl Total {
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Everything fetched from the outside world for one run.
#[derive(Debug, Clone)]
pub struct ExtractedData {
    pub range: DateRange,
    pub document: RawDocument,
    pub expense_report: Vec<u8>,
}

/// Both workbooks serialized as xlsx, ready for delivery.
#[derive(Debug, Clone)]
pub struct FinishedReports {
    pub range: DateRange,
    pub total: Total,
    pub transactions: usize,
    pub expense_report: Vec<u8>,
    pub tolls_report: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub range: DateRange,
    pub total: Total,
    pub transactions: usize,
    pub output_location: String,
}
