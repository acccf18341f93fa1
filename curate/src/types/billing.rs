//! Billing period resolution.
//!
//! A report covers the half-open month `[start, end)`. Its manifest lives under
//! `{report_path}/{YYYYMMDD-YYYYMMDD}/{report_name}-Manifest.json` and the converted output is
//! written to `{prefix}/{database}/{report_id}/{YYYYMM}`. Everything here is pure date math.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::ValidationError;

/// Default day-of-month up to which a missing manifest falls back to the previous month
pub const DEFAULT_MANIFEST_GRACE_DAYS: u32 = 3;

const OVERRIDE_DATE_FORMAT: &str = "%Y%m%d";

/// Parses an explicit `YYYYMMDD` anchor date.
pub fn parse_override_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidDate { value: value.to_string(), reason };

    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected 8 digits in YYYYMMDD form".to_string()));
    }
    NaiveDate::parse_from_str(value, OVERRIDE_DATE_FORMAT).map_err(|e| invalid(e.to_string()))
}

/// Resolves the anchor date: the override when present, otherwise `today`.
pub fn resolve_anchor(date_override: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    match date_override {
        Some(value) => parse_override_date(value),
        None => Ok(today),
    }
}

/// One calendar month of billing data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingPeriod {
    /// The month containing `anchor`
    pub fn containing(anchor: NaiveDate) -> Self {
        let start = first_of_month(anchor);
        let end = start + Months::new(1);
        Self { start, end }
    }

    /// The calendar month before this one
    pub fn previous(&self) -> Self {
        let start = self.start - Months::new(1);
        Self { start, end: self.start }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `YYYYMMDD-YYYYMMDD`, both sides on the first of their month
    pub fn period_tag(&self) -> String {
        format!("{}-{}", self.start.format(OVERRIDE_DATE_FORMAT), self.end.format(OVERRIDE_DATE_FORMAT))
    }

    /// `YYYYMM` of the period start
    pub fn partition_tag(&self) -> String {
        self.start.format("%Y%m").to_string()
    }

    pub fn manifest_key(&self, report_path: &str, report_name: &str) -> String {
        format!("{}/{}/{}-Manifest.json", report_path, self.period_tag(), report_name)
    }

    pub fn destination_path(&self, destination_prefix: &str, database: &str, report_id: &str) -> String {
        format!("{}/{}/{}/{}", destination_prefix, database, report_id, self.partition_tag())
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

/// When the current month's manifest is missing early in the month, the previous month is
/// processed instead: providers publish a new month's manifest a few days late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestFallback {
    pub grace_days: u32,
}

impl Default for ManifestFallback {
    fn default() -> Self {
        Self { grace_days: DEFAULT_MANIFEST_GRACE_DAYS }
    }
}

impl ManifestFallback {
    pub fn new(grace_days: u32) -> Self {
        Self { grace_days }
    }

    pub fn applies(&self, anchor: NaiveDate) -> bool {
        anchor.day() <= self.grace_days
    }
}
