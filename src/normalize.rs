//! Metadata normalization: titles, timestamps and date codes.
//!
//! Extractors hand over whatever the page printed. Everything here is pure
//! and turns that into the [`CanonicalRecord`] the download director names
//! files from.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::extractors::ExtractionRecord;
use crate::sanitize::{NamingMode, sanitize_filename};

/// Civil time the original sites publish in (KST, no DST).
pub const REFERENCE_OFFSET: FixedOffset = match FixedOffset::east_opt(9 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid reference offset"),
};

const OFFSET_SPECIFIERS: &[&str] = &["%z", "%:z", "%::z", "%#z"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot parse timestamp {raw:?} with format {format:?}")]
pub struct ParseError {
    pub raw: String,
    pub format: String,
}

/// Post metadata ready for download planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub title_sanitized: String,
    pub timestamp: NaiveDateTime,
    pub date_code: String,
    pub image_urls: Vec<String>,
    pub series_name: Option<String>,
    pub location_tag: Option<String>,
    pub folder_label: Option<String>,
}

/// Collapses whitespace runs (newlines included) to one space, trims, then
/// sanitizes for the filesystem.
pub fn sanitize_title(raw: &str, mode: NamingMode) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    sanitize_filename(&collapsed, mode)
}

/// Parses `raw` with the chrono pattern `format`.
///
/// Offset-carrying formats are shifted into `tz` (or [`REFERENCE_OFFSET`])
/// and the offset dropped; naming only needs the local calendar time.
/// Date-only formats parse to midnight.
pub fn normalize_timestamp(
    raw: &str,
    format: &str,
    tz: Option<FixedOffset>,
) -> Result<NaiveDateTime, ParseError> {
    let raw = raw.trim();
    let err = || ParseError {
        raw: raw.to_string(),
        format: format.to_string(),
    };

    if OFFSET_SPECIFIERS.iter().any(|pat| format.contains(pat)) {
        let parsed = DateTime::parse_from_str(raw, format).map_err(|_| err())?;
        let tz = tz.unwrap_or(REFERENCE_OFFSET);
        return Ok(parsed.with_timezone(&tz).naive_local());
    }

    NaiveDateTime::parse_from_str(raw, format)
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, format)
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| err())
}

/// `YYMMDD`; sorts chronologically as a string within one century.
pub fn date_code(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%y%m%d").to_string()
}

/// Turns a raw extraction into a canonical record.
pub fn canonicalize(
    record: ExtractionRecord,
    mode: NamingMode,
    tz: Option<FixedOffset>,
) -> Result<CanonicalRecord, ParseError> {
    let timestamp = normalize_timestamp(&record.timestamp_raw, &record.timestamp_format, tz)?;

    Ok(CanonicalRecord {
        title_sanitized: sanitize_title(&record.title, mode),
        date_code: date_code(&timestamp),
        timestamp,
        image_urls: record.image_urls,
        series_name: record.series_name,
        location_tag: record.location_tag,
        folder_label: record.folder_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_title_collapses_newlines_and_runs() {
        let raw = "  봄 화보\n\n공개 \t 2024  ";
        assert_eq!(sanitize_title(raw, NamingMode::Strict), "봄 화보 공개 2024");
    }

    #[test]
    fn test_strict_title_has_no_reserved_chars() {
        let out = sanitize_title("IU: \"Love wins\" <B-cut>?", NamingMode::Strict);
        assert!(!out.contains(['\\', '/', ':', '*', '?', '"', '<', '>', '|']));
        assert_eq!(sanitize_title(&out, NamingMode::Strict), out);
    }

    #[test]
    fn test_parses_naive_format() {
        let ts = normalize_timestamp("2023.05.04. 18:30", "%Y.%m.%d. %H:%M", None).unwrap();
        assert_eq!(date_code(&ts), "230504");
        assert_eq!(ts.hour(), 18);
    }

    #[test]
    fn test_offset_is_converted_to_reference_time() {
        let ts = normalize_timestamp(
            "2023-05-04T20:00:00+00:00",
            "%Y-%m-%dT%H:%M:%S%:z",
            None,
        )
        .unwrap();
        assert_eq!(date_code(&ts), "230505");
        assert_eq!(ts.hour(), 5);
    }

    #[test]
    fn test_offset_uses_given_zone() {
        let sgt = FixedOffset::east_opt(8 * 3600).unwrap();
        let ts = normalize_timestamp(
            "2023-05-04T23:30:00+09:00",
            "%Y-%m-%dT%H:%M:%S%:z",
            Some(sgt),
        )
        .unwrap();
        assert_eq!(ts.hour(), 22);
        assert_eq!(date_code(&ts), "230504");
    }

    #[test]
    fn test_date_only_format_is_midnight() {
        let ts = normalize_timestamp("20240131", "%Y%m%d", None).unwrap();
        assert_eq!(date_code(&ts), "240131");
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_error_carries_raw_and_format() {
        let err = normalize_timestamp("yesterday", "%Y-%m-%d", None).unwrap_err();
        assert_eq!(err.raw, "yesterday");
        assert_eq!(err.format, "%Y-%m-%d");
    }

    #[test]
    fn test_date_codes_sort_chronologically() {
        let fmt = "%Y-%m-%d %H:%M";
        let inputs = [
            "2001-01-01 00:00",
            "2009-12-31 23:59",
            "2010-01-01 00:00",
            "2023-02-28 10:00",
            "2023-11-05 09:00",
            "2099-12-31 23:59",
        ];
        let codes: Vec<String> = inputs
            .iter()
            .map(|s| date_code(&normalize_timestamp(s, fmt, None).unwrap()))
            .collect();

        for code in &codes {
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(sorted, codes);
    }

    #[test]
    fn test_canonicalize_carries_fields() {
        let mut record = ExtractionRecord::new(
            vec!["https://a/1.jpg".into()],
            "Title\nLine",
            "2024-03-01 12:00:00",
            "%Y-%m-%d %H:%M:%S",
        )
        .with_series("Series");
        record.location_tag = Some("KR".into());
        record.folder_label = Some("W Korea".into());

        let canonical = canonicalize(record, NamingMode::Strict, None).unwrap();
        assert_eq!(canonical.title_sanitized, "Title Line");
        assert_eq!(canonical.date_code, "240301");
        assert_eq!(canonical.series_name.as_deref(), Some("Series"));
        assert_eq!(canonical.location_tag.as_deref(), Some("KR"));
        assert_eq!(canonical.image_urls.len(), 1);
    }
}
