//! Upload parsing: CSV (two schema variants) and JSON into `RawReview`s.
//!
//! Rows missing their required fields are dropped here and never reach
//! scoring. Only a file that yields no usable rows at all is an error.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{ByteRecord, ReaderBuilder};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DEFAULT_CSV_ROW_CAP;
use crate::error::{AnalysisError, ParseError};
use crate::models::RawReview;

/// Columns whose presence on the first data row marks the extended
/// (Amazon fine-food style) layout.
const EXTENDED_SENTINELS: [&str; 3] = ["Text", "Score", "ProductId"];

const UNKNOWN_PRODUCT: &str = "Unknown Product";

// ============================================================================
// File kind
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Json,
}

impl FileKind {
    /// Resolves the kind from the uploaded file name (extension is case-insensitive).
    pub fn from_file_name(name: &str) -> Result<Self, AnalysisError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileKind::Csv),
            "json" => Ok(FileKind::Json),
            _ => Err(AnalysisError::UnsupportedFileType(name.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Csv => ".csv",
            FileKind::Json => ".json",
        }
    }
}

// ============================================================================
// Schema variants
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    /// Id, ProductId, UserId, ProfileName, HelpfulnessNumerator,
    /// HelpfulnessDenominator, Score, Time, Summary, Text
    Extended,
    /// review_text, review_id, rating, product_name, user_id, review_date, summary
    Simple,
}

impl SchemaVariant {
    /// Evaluated once, against the first data row.
    pub fn detect(first_row: &CsvRow<'_>) -> Self {
        if EXTENDED_SENTINELS.iter().all(|col| first_row.get(col).is_some()) {
            SchemaVariant::Extended
        } else {
            SchemaVariant::Simple
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchemaVariant::Extended => "extended",
            SchemaVariant::Simple => "simple",
        }
    }

    /// Maps a row to a review, or `None` when a required field is missing.
    pub fn map_row(&self, row: &CsvRow<'_>, now: &str) -> Option<RawReview> {
        match self {
            SchemaVariant::Extended => map_extended(row, now),
            SchemaVariant::Simple => map_simple(row, now),
        }
    }
}

/// A decoded CSV record viewed through its header row.
pub struct CsvRow<'a> {
    headers: &'a [String],
    fields: &'a [String],
}

impl<'a> CsvRow<'a> {
    pub fn new(headers: &'a [String], fields: &'a [String]) -> Self {
        Self { headers, fields }
    }

    /// Non-empty value of `column`, if the column exists on this row.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.fields
            .get(idx)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Fields as text. Invalid UTF-8 sequences become U+FFFD instead of failing
/// the whole file.
fn decode_record(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

fn map_extended(row: &CsvRow<'_>, now: &str) -> Option<RawReview> {
    let text = row.get("Text").filter(|t| !t.trim().is_empty())?;
    let score = row.get("Score")?;

    let review_date = row
        .get("Time")
        .and_then(parse_int_prefix)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| now.to_string());

    let product = row.get("ProductId").map(str::to_string);

    Some(RawReview {
        review_id: row
            .get("Id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("amazon_{}", Uuid::new_v4())),
        review_text: text.to_string(),
        rating: parse_int_prefix(score).unwrap_or(0),
        product_id: product.clone(),
        product_name: product,
        user_id: row.get("UserId").map(str::to_string),
        profile_name: row.get("ProfileName").map(str::to_string),
        review_date,
        date: None,
        summary: row.get("Summary").unwrap_or_default().to_string(),
        helpfulness_numerator: int_field(row.get("HelpfulnessNumerator")),
        helpfulness_denominator: int_field(row.get("HelpfulnessDenominator")),
    })
}

fn map_simple(row: &CsvRow<'_>, now: &str) -> Option<RawReview> {
    let text = row.get("review_text").filter(|t| !t.trim().is_empty())?;
    let id = row.get("review_id")?;

    Some(RawReview {
        review_id: id.to_string(),
        review_text: text.to_string(),
        rating: int_field(row.get("rating")),
        product_id: row.get("product_id").map(str::to_string),
        product_name: Some(row.get("product_name").unwrap_or(UNKNOWN_PRODUCT).to_string()),
        user_id: Some(row.get("user_id").unwrap_or_default().to_string()),
        profile_name: None,
        review_date: row.get("review_date").unwrap_or(now).to_string(),
        date: None,
        summary: row.get("summary").unwrap_or_default().to_string(),
        helpfulness_numerator: 0,
        helpfulness_denominator: 0,
    })
}

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Maximum number of valid rows taken from a CSV file. JSON is uncapped.
    pub csv_row_cap: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            csv_row_cap: DEFAULT_CSV_ROW_CAP,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedReviews {
    pub reviews: Vec<RawReview>,
    /// Detected CSV layout; `None` for JSON.
    pub variant: Option<SchemaVariant>,
    /// The CSV row cap was reached and the rest of the input was not read.
    pub capped: bool,
}

pub fn parse_upload(
    kind: FileKind,
    bytes: &[u8],
    options: &ParseOptions,
) -> Result<ParsedReviews, ParseError> {
    match kind {
        FileKind::Csv => parse_csv(bytes, options),
        FileKind::Json => parse_json(bytes),
    }
}

/// Reads CSV rows in order until the input ends or `csv_row_cap` valid rows
/// have been collected. Nothing past the cap is consumed.
pub fn parse_csv<R: Read>(reader: R, options: &ParseOptions) -> Result<ParsedReviews, ParseError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = decode_record(rdr.byte_headers()?);
    let now = now_iso();

    let mut reviews = Vec::new();
    let mut detected = None;
    let mut row_count = 0usize;
    let mut record = ByteRecord::new();

    while reviews.len() < options.csv_row_cap && rdr.read_byte_record(&mut record)? {
        row_count += 1;
        if row_count % 5000 == 0 {
            debug!("Parsed {} rows from CSV...", row_count);
        }

        let fields = decode_record(&record);
        let row = CsvRow::new(&headers, &fields);
        let schema = *detected.get_or_insert_with(|| SchemaVariant::detect(&row));

        if let Some(review) = schema.map_row(&row, &now) {
            reviews.push(review);
        }
    }

    // Any trailing input counts, even a record that would not parse.
    let capped = reviews.len() >= options.csv_row_cap
        && !matches!(rdr.read_byte_record(&mut record), Ok(false));

    let variant = detected.unwrap_or(SchemaVariant::Simple);
    if reviews.is_empty() {
        return Err(ParseError::NoValidRows {
            format: "CSV",
            required: match variant {
                SchemaVariant::Extended => "Text and Score",
                SchemaVariant::Simple => "review_text and review_id",
            },
        });
    }

    info!(
        "Parsed {} reviews from {} format{}",
        reviews.len(),
        variant.name(),
        if capped {
            format!(" (limited to {})", options.csv_row_cap)
        } else {
            String::new()
        }
    );

    Ok(ParsedReviews {
        reviews,
        variant: Some(variant),
        capped,
    })
}

/// Accepts either a bare array of review objects or `{ "reviews": [...] }`.
pub fn parse_json(bytes: &[u8]) -> Result<ParsedReviews, ParseError> {
    let document: Value = serde_json::from_slice(bytes)?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("reviews") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ParseError::NotAnArray),
            None => Vec::new(),
        },
        _ => Vec::new(),
    };

    let now = now_iso();
    let reviews: Vec<RawReview> = items.iter().filter_map(|item| json_review(item, &now)).collect();

    if reviews.is_empty() {
        return Err(ParseError::NoValidRows {
            format: "JSON",
            required: "review_text and review_id",
        });
    }

    info!("Parsed {} reviews from JSON", reviews.len());

    Ok(ParsedReviews {
        reviews,
        variant: None,
        capped: false,
    })
}

fn json_review(item: &Value, now: &str) -> Option<RawReview> {
    let obj = item.as_object()?;
    let text = obj
        .get("review_text")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())?;
    let id = obj.get("review_id").and_then(json_string)?;

    let string = |key: &str| obj.get(key).and_then(json_string);
    let int = |key: &str| obj.get(key).and_then(json_int).unwrap_or(0);

    Some(RawReview {
        review_id: id,
        review_text: text.to_string(),
        rating: int("rating"),
        product_id: string("product_id"),
        product_name: string("product_name"),
        user_id: string("user_id"),
        profile_name: string("profile_name"),
        review_date: string("review_date").unwrap_or_else(|| now.to_string()),
        date: string("date"),
        summary: string("summary").unwrap_or_default(),
        helpfulness_numerator: int("helpfulness_numerator"),
        helpfulness_denominator: int("helpfulness_denominator"),
    })
}

fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn int_field(value: Option<&str>) -> i64 {
    value.and_then(parse_int_prefix).unwrap_or(0)
}

/// Leading integer of `s` after optional whitespace and sign: `"4.5"` -> 4.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_csv(rows: usize) -> String {
        let mut out = String::from("review_id,review_text,rating,product_name\n");
        for i in 0..rows {
            out.push_str(&format!("r{},Review number {},4,Widget\n", i, i));
        }
        out
    }

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_file_name("reviews.csv").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_file_name("REVIEWS.JSON").unwrap(), FileKind::Json);
        assert!(matches!(
            FileKind::from_file_name("reviews.xlsx"),
            Err(AnalysisError::UnsupportedFileType(_))
        ));
        assert!(FileKind::from_file_name("no_extension").is_err());
    }

    #[test]
    fn test_extended_schema_with_extra_columns() {
        let data = "Id,ProductId,UserId,ProfileName,HelpfulnessNumerator,HelpfulnessDenominator,Score,Time,Summary,Text,Extra\n\
                    1,B001E4KFG0,A3SGXH7AUHU8GW,delmartian,1,1,5,1303862400,Good Quality,I have bought several of these,zzz\n";
        let parsed = parse_csv(data.as_bytes(), &ParseOptions::default()).unwrap();

        assert_eq!(parsed.variant, Some(SchemaVariant::Extended));
        let review = &parsed.reviews[0];
        assert_eq!(review.review_id, "1");
        assert_eq!(review.rating, 5);
        assert_eq!(review.product_id.as_deref(), Some("B001E4KFG0"));
        assert_eq!(review.product_name.as_deref(), Some("B001E4KFG0"));
        assert_eq!(review.profile_name.as_deref(), Some("delmartian"));
        assert_eq!(review.review_date, "2011-04-27T00:00:00.000Z");
        assert_eq!(review.summary, "Good Quality");
        assert_eq!(review.helpfulness_numerator, 1);
        assert_eq!(review.helpfulness_denominator, 1);
    }

    #[test]
    fn test_extended_schema_generates_missing_id() {
        let data = "Id,ProductId,Score,Text\n,B0001,3,Fine enough\n";
        let parsed = parse_csv(data.as_bytes(), &ParseOptions::default()).unwrap();
        assert!(parsed.reviews[0].review_id.starts_with("amazon_"));
    }

    #[test]
    fn test_simple_schema_defaults() {
        let data = "review_id,review_text,rating\nabc,Works well,4.5\n";
        let parsed = parse_csv(data.as_bytes(), &ParseOptions::default()).unwrap();

        assert_eq!(parsed.variant, Some(SchemaVariant::Simple));
        let review = &parsed.reviews[0];
        assert_eq!(review.rating, 4);
        assert_eq!(review.product_name.as_deref(), Some("Unknown Product"));
        assert_eq!(review.user_id.as_deref(), Some(""));
        assert!(!review.review_date.is_empty());
    }

    #[test]
    fn test_sentinels_must_all_be_present() {
        // Text and Score but no ProductId falls back to the simple mapping,
        // which then finds no review_text/review_id columns.
        let data = "Text,Score\nGreat,5\n";
        let err = parse_csv(data.as_bytes(), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::NoValidRows { format: "CSV", .. }));
    }

    #[test]
    fn test_invalid_rows_are_skipped() {
        let data = "review_id,review_text\n1,first\n,missing id\n3,   \n4,fourth\n";
        let parsed = parse_csv(data.as_bytes(), &ParseOptions::default()).unwrap();
        let ids: Vec<_> = parsed.reviews.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_csv_row_cap_keeps_first_rows_in_order() {
        let data = simple_csv(10_005);
        let parsed = parse_csv(data.as_bytes(), &ParseOptions::default()).unwrap();

        assert_eq!(parsed.reviews.len(), 10_000);
        assert!(parsed.capped);
        assert_eq!(parsed.reviews[0].review_id, "r0");
        assert_eq!(parsed.reviews[9_999].review_id, "r9999");
    }

    #[test]
    fn test_csv_under_cap_is_not_capped() {
        let parsed = parse_csv(simple_csv(10).as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(parsed.reviews.len(), 10);
        assert!(!parsed.capped);
    }

    #[test]
    fn test_csv_invalid_utf8_is_decoded_lossily() {
        let data: &[u8] = b"review_id,review_text\n1,Great coffee\n2,Caf\xE9 was fine\n3,Loved it\n";
        let parsed = parse_csv(data, &ParseOptions::default()).unwrap();

        let ids: Vec<_> = parsed.reviews.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(parsed.reviews[1].review_text, "Caf\u{FFFD} was fine");
    }

    #[test]
    fn test_csv_stops_reading_at_cap() {
        let data: &[u8] = b"review_id,review_text\n1,one\n2,two\n3,bad \xff byte\n4,\"unterminated\n";
        let parsed = parse_csv(data, &ParseOptions { csv_row_cap: 2 }).unwrap();

        assert_eq!(parsed.reviews.len(), 2);
        assert_eq!(parsed.reviews[1].review_id, "2");
        assert!(parsed.capped);
    }

    #[test]
    fn test_csv_exactly_at_cap_is_not_capped() {
        let parsed = parse_csv(simple_csv(3).as_bytes(), &ParseOptions { csv_row_cap: 3 }).unwrap();
        assert_eq!(parsed.reviews.len(), 3);
        assert!(!parsed.capped);
    }

    #[test]
    fn test_csv_without_valid_rows_fails() {
        let err = parse_csv("review_id,review_text\n".as_bytes(), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::NoValidRows { .. }));
    }

    #[test]
    fn test_json_array_and_wrapped_object() {
        let array = br#"[{"review_id": 7, "review_text": "Nice", "rating": "5", "date": "2024-01-02"}]"#;
        let parsed = parse_json(array).unwrap();
        assert_eq!(parsed.reviews[0].review_id, "7");
        assert_eq!(parsed.reviews[0].rating, 5);
        assert_eq!(parsed.reviews[0].date.as_deref(), Some("2024-01-02"));
        assert!(parsed.variant.is_none());

        let wrapped = br#"{"reviews": [{"review_id": "a", "review_text": "Nice"}, {"review_id": "b"}]}"#;
        let parsed = parse_json(wrapped).unwrap();
        assert_eq!(parsed.reviews.len(), 1);
        assert_eq!(parsed.reviews[0].rating, 0);
    }

    #[test]
    fn test_json_is_not_capped() {
        let items: Vec<Value> = (0..10_001)
            .map(|i| serde_json::json!({"review_id": format!("j{}", i), "review_text": "ok"}))
            .collect();
        let bytes = serde_json::to_vec(&items).unwrap();
        let parsed = parse_upload(FileKind::Json, &bytes, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.reviews.len(), 10_001);
        assert!(!parsed.capped);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(parse_json(b"{not json"), Err(ParseError::Json(_))));
        assert!(matches!(
            parse_json(br#"{"reviews": {"review_id": "1"}}"#),
            Err(ParseError::NotAnArray)
        ));
        assert!(matches!(
            parse_json(br#"[{"review_id": "1", "review_text": ""}]"#),
            Err(ParseError::NoValidRows { format: "JSON", .. })
        ));
        assert!(matches!(
            parse_json(br#"{"items": []}"#),
            Err(ParseError::NoValidRows { .. })
        ));
        assert!(matches!(
            parse_json(br#"{"reviews": null}"#),
            Err(ParseError::NotAnArray)
        ));
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix(" -3abc"), Some(-3));
        assert_eq!(parse_int_prefix("4.9"), Some(4));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
    }
}
