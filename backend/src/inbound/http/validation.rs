//! Shared validation helpers for inbound HTTP adapters.
//!
//! Parsing failures are collected as [`FieldIssue`]s so a single `400`
//! response can report every offending field.

use std::str::FromStr;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::domain::{
    CoffeeSize, CoffeeType, DateRange, Error, FieldIssue, PAGE_LIMIT_DEFAULT, PAGE_LIMIT_MAX,
    PageRequest, Patch, RangeEnd,
};

/// Validation issue codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IssueCode {
    Required,
    InvalidUuid,
    InvalidDate,
    InvalidValue,
    OutOfRange,
}

impl IssueCode {
    fn as_str(self) -> &'static str {
        match self {
            IssueCode::Required => "required",
            IssueCode::InvalidUuid => "invalid_uuid",
            IssueCode::InvalidDate => "invalid_date",
            IssueCode::InvalidValue => "invalid_value",
            IssueCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn issue(field: FieldName, code: IssueCode, message: impl Into<String>) -> FieldIssue {
    FieldIssue::new(field.as_str(), code.as_str(), message)
}

pub(crate) fn missing_field(field: FieldName) -> FieldIssue {
    let name = field.as_str();
    issue(field, IssueCode::Required, format!("{name} is required"))
}

pub(crate) fn null_field(field: FieldName) -> FieldIssue {
    let name = field.as_str();
    issue(field, IssueCode::Required, format!("{name} must not be null"))
}

/// Accumulates issues while parsing a request body.
#[derive(Debug, Default)]
pub(crate) struct Issues(Vec<FieldIssue>);

impl Issues {
    /// Keep the value, or record the issue and yield `None`.
    pub(crate) fn check<T>(&mut self, result: Result<T, FieldIssue>) -> Option<T> {
        result.map_err(|issue| self.0.push(issue)).ok()
    }

    pub(crate) fn extend(&mut self, issues: Vec<FieldIssue>) {
        self.0.extend(issues);
    }

    /// Fail with a validation error when anything was recorded.
    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(self.0))
        }
    }
}

pub(crate) fn parse_uuid<T: FromStr>(value: &str, field: FieldName) -> Result<T, FieldIssue> {
    let name = field.as_str();
    value
        .parse()
        .map_err(|_| issue(field, IssueCode::InvalidUuid, format!("{name} must be a valid UUID")))
}

pub(crate) fn parse_uuid_list<T: FromStr>(
    values: &[String],
    field: FieldName,
) -> Result<Vec<T>, FieldIssue> {
    let name = field.as_str();
    values
        .iter()
        .map(|value| value.parse())
        .collect::<Result<_, _>>()
        .map_err(|_| {
            issue(
                field,
                IssueCode::InvalidUuid,
                format!("{name} must contain valid UUIDs"),
            )
        })
}

/// Parse a path identifier; malformed ids are reported exactly like absent
/// rows.
pub(crate) fn parse_path_id<T: FromStr>(raw: &str, not_found: &'static str) -> Result<T, Error> {
    raw.parse().map_err(|_| Error::not_found(not_found))
}

pub(crate) fn parse_coffee_type(value: &str, field: FieldName) -> Result<CoffeeType, FieldIssue> {
    let name = field.as_str();
    value.parse().map_err(|_| {
        let allowed: Vec<&str> = CoffeeType::ALL.iter().map(|t| t.as_str()).collect();
        issue(
            field,
            IssueCode::InvalidValue,
            format!("{name} must be one of {}", allowed.join(", ")),
        )
    })
}

pub(crate) fn parse_coffee_size(value: &str, field: FieldName) -> Result<CoffeeSize, FieldIssue> {
    let name = field.as_str();
    value.parse().map_err(|_| {
        let allowed: Vec<&str> = CoffeeSize::ALL.iter().map(|s| s.as_str()).collect();
        issue(
            field,
            IssueCode::InvalidValue,
            format!("{name} must be one of {}", allowed.join(", ")),
        )
    })
}

/// A query bound given either as a full timestamp or a bare calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateBound {
    Instant(DateTime<Utc>),
    Day(NaiveDate),
}

impl DateBound {
    /// Inclusive lower bound; a bare date starts at its UTC midnight.
    pub(crate) fn as_start(self) -> DateTime<Utc> {
        match self {
            Self::Instant(instant) => instant,
            Self::Day(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Upper bound; a bare date covers the whole day and stops before the
    /// next midnight. `None` only for the last representable date.
    pub(crate) fn as_end(self) -> Option<RangeEnd> {
        match self {
            Self::Instant(instant) => Some(RangeEnd::Through(instant)),
            Self::Day(date) => date
                .succ_opt()
                .map(|next| RangeEnd::Before(next.and_time(NaiveTime::MIN).and_utc())),
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub(crate) fn parse_date_bound(value: &str, field: FieldName) -> Result<DateBound, FieldIssue> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(DateBound::Instant(timestamp.with_timezone(&Utc)));
    }
    let name = field.as_str();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(DateBound::Day)
        .map_err(|_| {
            issue(
                field,
                IssueCode::InvalidDate,
                format!("{name} must be an RFC 3339 timestamp or YYYY-MM-DD date"),
            )
        })
}

/// Parse a full RFC 3339 timestamp from a request body.
pub(crate) fn parse_timestamp(value: &str, field: FieldName) -> Result<DateTime<Utc>, FieldIssue> {
    let name = field.as_str();
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            issue(
                field,
                IssueCode::InvalidDate,
                format!("{name} must be an RFC 3339 timestamp"),
            )
        })
}

/// Parse the optional `startDate`/`endDate` query pair.
pub(crate) fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
    issues: &mut Issues,
) -> DateRange {
    let start = start
        .and_then(|raw| issues.check(parse_date_bound(raw, FieldName::new("startDate"))))
        .map(DateBound::as_start);
    let end = end
        .and_then(|raw| issues.check(parse_date_bound(raw, FieldName::new("endDate"))))
        .and_then(DateBound::as_end);
    DateRange::new(start, end)
}

/// Validate `limit`/`offset`, applying defaults for absent values.
pub(crate) fn parse_page(
    limit: Option<i64>,
    offset: Option<i64>,
    issues: &mut Issues,
) -> PageRequest {
    let limit = match limit {
        None => Some(PAGE_LIMIT_DEFAULT),
        Some(value) => issues.check(
            u32::try_from(value)
                .ok()
                .filter(|limit| (1..=PAGE_LIMIT_MAX).contains(limit))
                .ok_or_else(|| {
                    issue(
                        FieldName::new("limit"),
                        IssueCode::OutOfRange,
                        format!("limit must be between 1 and {PAGE_LIMIT_MAX}"),
                    )
                }),
        ),
    };
    let offset = match offset {
        None => Some(0),
        Some(value) => issues.check(u64::try_from(value).map_err(|_| {
            issue(
                FieldName::new("offset"),
                IssueCode::OutOfRange,
                "offset must not be negative",
            )
        })),
    };
    PageRequest {
        limit: limit.unwrap_or(PAGE_LIMIT_DEFAULT),
        offset: offset.unwrap_or(0),
    }
}

/// Resolve a tri-state field that must never be cleared.
pub(crate) fn non_null<T>(
    patch: Patch<String>,
    field: FieldName,
    parse: impl FnOnce(&str, FieldName) -> Result<T, FieldIssue>,
) -> Result<Option<T>, FieldIssue> {
    match patch {
        Patch::Absent => Ok(None),
        Patch::Clear => Err(null_field(field)),
        Patch::Set(raw) => parse(&raw, field).map(Some),
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON payload");
    let message = match err {
        JsonPayloadError::ContentType => "Content-Type must be application/json",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large"
        }
        _ => "Malformed JSON body",
    };
    Error::invalid_request(message).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected query string");
    Error::invalid_request("Malformed query string").into()
}

/// JSON extractor configuration mapping payload failures to `400` bodies.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

/// Query extractor configuration mapping parse failures to `400` bodies.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomTypeId, ErrorCode};
    use rstest::rstest;

    const START: FieldName = FieldName::new("startDate");

    #[rstest]
    #[case("2024-03-15", "2024-03-15T00:00:00+00:00")]
    #[case("2024-03-15T08:30:00+02:00", "2024-03-15T06:30:00+00:00")]
    fn start_bounds_accept_dates_and_timestamps(#[case] raw: &str, #[case] expected: &str) {
        let parsed = parse_date_bound(raw, START).expect("valid bound");
        assert_eq!(parsed.as_start().to_rfc3339(), expected);
    }

    #[rstest]
    fn date_only_end_stops_before_next_midnight() {
        let parsed = parse_date_bound("2024-03-15", START).expect("valid bound");
        let next_midnight = NaiveDate::from_ymd_opt(2024, 3, 16)
            .expect("date")
            .and_time(NaiveTime::MIN)
            .and_utc();
        assert_eq!(parsed.as_end(), Some(RangeEnd::Before(next_midnight)));
    }

    #[rstest]
    fn timestamp_end_is_inclusive() {
        let parsed = parse_date_bound("2024-03-15T08:30:00Z", START).expect("valid bound");
        let Some(RangeEnd::Through(end)) = parsed.as_end() else {
            panic!("timestamp should give an inclusive end");
        };
        assert_eq!(end.to_rfc3339(), "2024-03-15T08:30:00+00:00");
    }

    #[rstest]
    fn date_only_window_keeps_sub_millisecond_entries() {
        let mut issues = Issues::default();
        let range = parse_date_range(Some("2024-01-05"), Some("2024-01-05"), &mut issues);
        let late = DateTime::parse_from_rfc3339("2024-01-05T23:59:59.9995Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        assert!(range.contains(late));
        let next_day = DateTime::parse_from_rfc3339("2024-01-06T00:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        assert!(!range.contains(next_day));
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2024-13-01")]
    #[case("15/03/2024")]
    fn bounds_reject_other_formats(#[case] raw: &str) {
        let issue = parse_date_bound(raw, START).expect_err("invalid");
        assert_eq!(issue.field, "startDate");
        assert_eq!(issue.code, "invalid_date");
    }

    #[rstest]
    #[case(None, None, 50, 0)]
    #[case(Some(1), Some(0), 1, 0)]
    #[case(Some(100), Some(250), 100, 250)]
    fn page_defaults_and_bounds(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected_limit: u32,
        #[case] expected_offset: u64,
    ) {
        let mut issues = Issues::default();
        let page = parse_page(limit, offset, &mut issues);
        assert!(issues.finish().is_ok());
        assert_eq!((page.limit, page.offset), (expected_limit, expected_offset));
    }

    #[rstest]
    #[case(Some(0), None, "limit")]
    #[case(Some(101), None, "limit")]
    #[case(None, Some(-1), "offset")]
    fn page_rejects_out_of_range(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] field: &str,
    ) {
        let mut issues = Issues::default();
        parse_page(limit, offset, &mut issues);
        let error = issues.finish().expect_err("out of range");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        let details = error.details().expect("details");
        assert_eq!(details[0]["field"], field);
        assert_eq!(details[0]["code"], "out_of_range");
    }

    #[rstest]
    fn malformed_path_ids_are_not_found() {
        let error = parse_path_id::<CustomTypeId>("42", "Custom type not found")
            .expect_err("malformed");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Custom type not found");
    }

    #[rstest]
    fn unknown_enum_values_list_alternatives() {
        let issue = parse_coffee_size("HUGE", FieldName::new("size")).expect_err("unknown");
        assert_eq!(issue.code, "invalid_value");
        assert_eq!(
            issue.message,
            "size must be one of SMALL, MEDIUM, LARGE, EXTRA_LARGE"
        );
    }

    #[rstest]
    fn null_is_rejected_for_mandatory_patches() {
        let field = FieldName::new("size");
        let issue = non_null(Patch::Clear, field, parse_coffee_size).expect_err("null");
        assert_eq!(issue.message, "size must not be null");
        assert_eq!(
            non_null(Patch::Absent, field, parse_coffee_size).expect("absent"),
            None
        );
    }
}
