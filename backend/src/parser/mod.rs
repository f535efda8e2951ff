//! CSV parser with encoding and delimiter auto-detection.
//!
//! Turns spreadsheet exports (often Latin-1 or Windows-1252, sometimes with a
//! byte-order mark, sometimes `;`-separated) into [`InputRow`]s. Malformed
//! CSV is reported here; nothing in this module knows about campaigns.

pub mod export;

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::InputRow;

pub use export::{error_table_to_csv, input_template_csv, mapped_table_to_csv, UTF8_BOM};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows, numbered by data record from 1 (blank records skipped)
    pub rows: Vec<InputRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    if bytes.starts_with(UTF8_BOM) {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding. A leading UTF-8
/// byte-order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.to_string(),
            None => String::from_utf8_lossy(bytes).to_string(),
        },
    };
    Ok(decoded)
}

/// Detect the delimiter by counting occurrences in the header line.
/// Defaults to `,` (the bulk-import format's own delimiter).
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use bulkmap::parser::parse_str;
///
/// let csv = "Input Level,Campaign Name\ncampaign,Spring";
/// let result = parse_str(csv, ',').unwrap();
/// assert_eq!(result.rows[0].get("Campaign Name"), Some("Spring"));
/// ```
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<ParseResult> {
    parse_string_with_metadata(content, delimiter, "utf-8".to_string())
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> CsvResult<ParseResult> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter = u8::try_from(delimiter).map_err(|_| CsvError::ParseError {
        line: 1,
        message: format!("Unsupported delimiter '{}'", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    // Numbered by data record so skipped blank records don't shift later rows.
    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = InputRow::new(index + 1);
        for (header, cell) in headers.iter().zip(record.iter()) {
            if !header.is_empty() {
                row.set(header.as_str(), cell);
            }
        }
        rows.push(row);
    }

    Ok(ParseResult {
        rows,
        encoding,
        delimiter: char::from(delimiter),
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "Input Level,Campaign Name\ncampaign,Spring\nadset,";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].number, 1);
        assert_eq!(result.rows[0].get("Campaign Name"), Some("Spring"));
        assert_eq!(result.rows[1].number, 2);
        assert_eq!(result.rows[1].get("Campaign Name"), None);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "Title,Body\n\"Hello, world\",\"Line one\nLine two\"";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.rows[0].get("Title"), Some("Hello, world"));
        assert_eq!(result.rows[0].get("Body"), Some("Line one\nLine two"));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n,\n3,4\n";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].number, 3);
        assert_eq!(result.rows[1].get("a"), Some("3"));
    }

    #[test]
    fn test_blank_record_keeps_error_rows_aligned() {
        use crate::transform::{transform, MappingProfile};

        let csv = "Input Level,Campaign Name\ncampaign,Spring\n,\nbogus,\n";
        let result = parse_str(csv, ',').unwrap();
        let output = transform(&result.rows, &MappingProfile::revised());

        let rows: Vec<usize> = output.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![3]);
    }

    #[test]
    fn test_short_and_long_records() {
        let csv = "a,b,c\n1\n1,2,3,4";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.rows[0].get("a"), Some("1"));
        assert_eq!(result.rows[0].get("c"), None);
        assert_eq!(result.rows[1].get("c"), Some("3"));
    }

    #[test]
    fn test_headers_trimmed() {
        let csv = " Input Level ; Ad Name \nadset;Hero";
        let result = parse_str(csv, ';').unwrap();
        assert_eq!(result.headers, vec!["Input Level", "Ad Name"]);
        assert_eq!(result.rows[0].get("Ad Name"), Some("Hero"));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_str("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b"  \n"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Input Level;Ad Name\nadset;Hero".as_bytes());
        let result = parse_bytes_auto(&bytes).unwrap();

        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.headers[0], "Input Level");
        assert_eq!(result.rows[0].get("Input Level"), Some("adset"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simple.csv");
        std::fs::write(&path, "Input Level,Ad Set Name\nadset,Young\n").unwrap();

        let result = parse_csv_file_auto(&path).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].get("Ad Set Name"), Some("Young"));
    }
}
