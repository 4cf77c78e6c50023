//! Local CSV parsing for offline lead previews.
//!
//! Handles BOMs, non-UTF-8 exports (detected and transcoded), delimiter
//! auto-detection and header/skip-row options, so a file can be reviewed and
//! mapped before it is uploaded.

use chardetng::EncodingDetector;
use csv::{ReaderBuilder, Terminator};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};
use crate::Result;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Lines inspected when guessing the delimiter.
const DELIMITER_SAMPLE_LINES: usize = 10;

/// Options for parsing a lead export.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParseConfig {
    /// Whether the file has a header row (default: true)
    pub has_header_row: Option<bool>,
    /// Delimiter: ",", ";", "\t", "|" or "auto" (default: "auto")
    pub delimiter: Option<String>,
    /// Quote character (default: "\"")
    pub quote_char: Option<String>,
    /// Rows to drop before the header, e.g. export banners (default: 0)
    pub skip_top_rows: Option<usize>,
    /// Rows to drop at the end, e.g. totals (default: 0)
    pub skip_bottom_rows: Option<usize>,
    /// Whether blank rows are dropped (default: true)
    pub skip_empty_rows: Option<bool>,
}

impl ParseConfig {
    pub fn has_header(&self) -> bool {
        self.has_header_row.unwrap_or(true)
    }

    pub fn top_skip(&self) -> usize {
        self.skip_top_rows.unwrap_or(0)
    }

    pub fn bottom_skip(&self) -> usize {
        self.skip_bottom_rows.unwrap_or(0)
    }

    pub fn skip_empty(&self) -> bool {
        self.skip_empty_rows.unwrap_or(true)
    }

    pub fn quote_byte(&self) -> u8 {
        self.quote_char
            .as_deref()
            .and_then(|s| s.bytes().next())
            .unwrap_or(b'"')
    }

    /// The configured delimiter byte, or `None` for auto-detection.
    fn explicit_delimiter(&self) -> Option<u8> {
        match self.delimiter.as_deref().map(str::trim) {
            None | Some("") | Some("auto") => None,
            Some("\\t") | Some("tab") => Some(b'\t'),
            Some(other) => other.bytes().next(),
        }
    }
}

/// A locally parsed CSV file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCsvResult {
    pub headers: Vec<String>,
    /// Data rows, padded or truncated to the header width
    pub rows: Vec<Vec<String>>,
    /// Options actually applied, with the detected delimiter filled in
    pub detected_config: ParseConfig,
    /// Name of the source encoding the content was decoded from
    pub encoding: String,
    /// Non-fatal problems found while parsing
    pub errors: Vec<ParseError>,
    /// Number of data rows
    pub row_count: usize,
}

/// Kind of non-fatal parsing problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorKind {
    Parse,
    Encoding,
    Structure,
}

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    /// 1-based position, when the problem is tied to one row. Read failures
    /// count source records; structure problems count data rows, after the
    /// skipped rows and the header, matching `ParsedCsvResult::rows`.
    pub row: Option<usize>,
    pub message: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    fn at_row(kind: ParseErrorKind, row: usize, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            message: message.into(),
            kind,
        }
    }

    fn encoding(message: impl Into<String>) -> Self {
        Self {
            row: None,
            message: message.into(),
            kind: ParseErrorKind::Encoding,
        }
    }
}

/// Parses CSV bytes with the given options.
pub fn parse_csv(content: &[u8], config: &ParseConfig) -> Result<ParsedCsvResult> {
    let mut errors = Vec::new();

    let (text, encoding) = decode_content(content, &mut errors);
    let delimiter = config
        .explicit_delimiter()
        .unwrap_or_else(|| detect_delimiter(&text));

    let records = read_records(&text, delimiter, config.quote_byte(), &mut errors);
    let records = apply_skips(records, config)?;
    let (headers, rows) = split_header(records, config.has_header(), &mut errors);

    let mut detected_config = config.clone();
    detected_config.delimiter = Some((delimiter as char).to_string());
    detected_config.has_header_row = Some(config.has_header());
    detected_config.skip_top_rows = Some(config.top_skip());
    detected_config.skip_bottom_rows = Some(config.bottom_skip());
    detected_config.skip_empty_rows = Some(config.skip_empty());
    detected_config.quote_char = Some((config.quote_byte() as char).to_string());

    let row_count = rows.len();
    Ok(ParsedCsvResult {
        headers,
        rows,
        detected_config,
        encoding: encoding.to_string(),
        errors,
        row_count,
    })
}

/// Decodes content to text. UTF-8 (with or without BOM) is taken as is;
/// anything else is guessed with chardetng and transcoded.
fn decode_content(content: &[u8], errors: &mut Vec<ParseError>) -> (String, &'static str) {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);

    if let Ok(text) = std::str::from_utf8(content) {
        return (text.to_string(), encoding_rs::UTF_8.name());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(content, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, had_errors) = encoding.decode(content);

    errors.push(ParseError::encoding(format!(
        "File is not UTF-8, decoded as {}",
        encoding.name()
    )));
    if had_errors {
        errors.push(ParseError::encoding(
            "Some characters could not be decoded and were replaced",
        ));
    }
    (decoded.into_owned(), encoding.name())
}

/// Picks the candidate delimiter with the most consistent column count.
fn detect_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(DELIMITER_SAMPLE_LINES)
        .collect();

    let mut best = (b',', 0usize);
    for delimiter in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.bytes().filter(|b| *b == delimiter).count())
            .collect();
        let Some(&first) = counts.first() else {
            continue;
        };
        if first == 0 {
            continue;
        }
        let consistent = counts.iter().filter(|&&c| c == first).count();
        let score = first * consistent;
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}

fn read_records(
    text: &str,
    delimiter: u8,
    quote: u8,
    errors: &mut Vec<ParseError>,
) -> Vec<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(quote)
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::CRLF)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record.iter().map(str::to_string).collect()),
            Err(e) => errors.push(ParseError::at_row(
                ParseErrorKind::Parse,
                index + 1,
                format!("Failed to parse record {}: {}", index + 1, e),
            )),
        }
    }
    records
}

fn apply_skips(records: Vec<Vec<String>>, config: &ParseConfig) -> Result<Vec<Vec<String>>> {
    if records.is_empty() {
        return Err(invalid("CSV file is empty or contains no valid records"));
    }

    let top = config.top_skip();
    let end = records.len().saturating_sub(config.bottom_skip());
    if top >= end {
        return Err(invalid(format!(
            "No rows remaining after skipping {} top and {} bottom rows of {}",
            top,
            config.bottom_skip(),
            records.len()
        )));
    }

    let kept: Vec<Vec<String>> = records
        .into_iter()
        .skip(top)
        .take(end - top)
        .filter(|row| !config.skip_empty() || row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    if kept.is_empty() {
        return Err(invalid("No non-empty rows found in CSV"));
    }
    Ok(kept)
}

fn split_header(
    mut records: Vec<Vec<String>>,
    has_header: bool,
    errors: &mut Vec<ParseError>,
) -> (Vec<String>, Vec<Vec<String>>) {
    // Header names are kept byte for byte; they key the uploaded column mapping.
    let headers: Vec<String> = if has_header {
        records.remove(0)
    } else {
        let width = records.iter().map(Vec::len).max().unwrap_or(0);
        (1..=width).map(|i| format!("Column{}", i)).collect()
    };

    let width = headers.len();
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(index, mut row)| {
            if row.len() > width {
                errors.push(ParseError::at_row(
                    ParseErrorKind::Structure,
                    index + 1,
                    format!(
                        "Row {} has {} columns, expected {}. Extra columns ignored.",
                        index + 1,
                        row.len(),
                        width
                    ),
                ));
            }
            row.resize(width, String::new());
            row
        })
        .collect();

    (headers, rows)
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Validation(ValidationError::InvalidInput(message.into()))
}
