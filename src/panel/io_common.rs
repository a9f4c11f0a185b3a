// Primitives shared by the readers.

use std::fs::File;
use std::path::Path;

use csv::ByteRecord;

use crate::panel::*;

/// Markers used by the ACS tables in place of a value.
const MISSING_MARKERS: [&str; 7] = ["", "-", "N", "(X)", "*", "**", "***"];

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Fails when an expected input is not there. No fallback is attempted.
pub fn require_file(path: &Path) -> PrepResult<String> {
    let p = path.display().to_string();
    if !path.is_file() {
        return MissingInputSnafu { path: p }.fail();
    }
    Ok(p)
}

/// Opens a delimited file without interpreting its header.
///
/// The readers handle the header themselves since some publishers put more than
/// one header line in their files.
pub fn open_csv(path: &str, delimiter: u8) -> PrepResult<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .context(CsvOpenSnafu { path })
}

/// IRS files are ISO-8859-1: every byte is one code point.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn field(record: &ByteRecord, idx: usize, path: &str, lineno: usize) -> PrepResult<String> {
    record
        .get(idx)
        .map(latin1)
        .context(CsvLineTooShortSnafu { path, lineno })
}

/// Column positions, looked up by name in a header line.
pub struct HeaderIndex {
    path: String,
    names: Vec<String>,
}

impl HeaderIndex {
    pub fn new(path: &str, header: &ByteRecord) -> HeaderIndex {
        HeaderIndex {
            path: path.to_string(),
            names: header.iter().map(|b| latin1(b).trim().to_string()).collect(),
        }
    }

    pub fn find(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n == column)
    }

    pub fn position(&self, column: &str) -> PrepResult<usize> {
        self.find(column).context(MissingHeaderSnafu {
            path: self.path.clone(),
            column,
        })
    }
}

/// Reads the next line, which must exist.
pub fn next_record(
    records: &mut csv::ByteRecordsIntoIter<File>,
    path: &str,
    lineno: usize,
) -> PrepResult<ByteRecord> {
    match records.next() {
        Some(r) => r.context(CsvLineParseSnafu { path, lineno }),
        None => CsvLineTooShortSnafu { path, lineno }.fail(),
    }
}

/// A numeric cell. Empty cells and the ACS markers are missing values, anything
/// else that does not parse is an error.
pub fn parse_number(content: &str, path: &str, lineno: usize) -> PrepResult<Option<f64>> {
    let s = content.trim();
    if MISSING_MARKERS.contains(&s) || s.chars().all(|c| c == '*') {
        return Ok(None);
    }
    match s.replace(',', "").parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Some(x)),
        _ => MalformedNumberSnafu {
            path,
            lineno,
            content: s,
        }
        .fail(),
    }
}

/// A numeric cell where anything unreadable counts as missing, such as the top-coded
/// incomes (`250,000+`).
pub fn parse_number_lenient(content: &str) -> Option<f64> {
    content
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_markers() {
        assert_eq!(parse_number(" 12.5 ", "f", 1).unwrap(), Some(12.5));
        assert_eq!(parse_number("1,234", "f", 1).unwrap(), Some(1234.0));
        assert_eq!(parse_number("(X)", "f", 1).unwrap(), None);
        assert_eq!(parse_number("*****", "f", 1).unwrap(), None);
        assert_eq!(parse_number("", "f", 1).unwrap(), None);
        assert!(parse_number("abc", "f", 3).is_err());
        assert!(parse_number("NaN", "f", 3).is_err());
        assert_eq!(parse_number_lenient("250,000+"), None);
        assert_eq!(parse_number_lenient("61,234"), Some(61234.0));
    }

    #[test]
    fn latin1_bytes() {
        assert_eq!(latin1(b"Do\xf1a Ana"), "Doña Ana");
    }
}
