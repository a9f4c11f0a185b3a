// IRS e-file provider listings: one pipe-delimited file per state and year.

use std::path::{Path, PathBuf};

use crate::panel::{io_common::*, *};

/// Position of the ZIP code in the fixed layout:
/// name, addr1, addr2, city, state, zip, zip4, fname, mi, lname, phone, bk1..bk4
const ZIP_COLUMN: usize = 5;

pub fn listing_path(root: &Path, year: u16, state: &str) -> PathBuf {
    [
        root.to_path_buf(),
        PathBuf::from("paid_preparers"),
        PathBuf::from(year.to_string()),
        PathBuf::from(format!("{}.txt", state)),
    ]
    .iter()
    .collect()
}

/// Reads the ZIP code of every listing in the file.
///
/// The first line is a header. Listings whose ZIP code is not a number are
/// dropped, as they cannot be placed in a county.
pub fn read_listing_zips(path: &Path) -> PrepResult<Vec<u32>> {
    let p = require_file(path)?;
    info!("Attempting to read preparer listings {:?}", p);
    let rdr = open_csv(&p, b'|')?;
    let mut records = rdr.into_byte_records();
    // The header line is skipped.
    let _ = next_record(&mut records, &p, 1)?;

    let mut zips: Vec<u32> = Vec::new();
    let mut dropped = 0_usize;
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {
            path: p.clone(),
            lineno,
        })?;
        let raw = field(&line, ZIP_COLUMN, &p, lineno)?;
        match parse_zip(&raw) {
            Some(zip) => zips.push(zip),
            None => {
                debug!("read_listing_zips: {}:{}: dropping ZIP {:?}", p, lineno, raw);
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        warn!(
            "{}: dropped {} listings without a numeric ZIP code",
            simplify_file_name(&p),
            dropped
        );
    }
    debug!("read_listing_zips: {}: {} listings", p, zips.len());
    Ok(zips)
}

/// ZIP codes may lose their leading zeros or come out of a spreadsheet as `6001.0`.
pub fn parse_zip(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if let Ok(z) = s.parse::<u32>() {
        return Some(z);
    }
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x <= u32::MAX as f64 => {
            Some(x as u32)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn zip_codes() {
        assert_eq!(parse_zip("06001"), Some(6001));
        assert_eq!(parse_zip(" 35004 "), Some(35004));
        assert_eq!(parse_zip("6001.0"), Some(6001));
        assert_eq!(parse_zip("35004-1234"), None);
        assert_eq!(parse_zip(""), None);
        assert_eq!(parse_zip("-5"), None);
    }

    #[test]
    fn reads_latin1_listings() {
        let dir = std::env::temp_dir().join("prep_panel_io_preparers");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("nm.txt");
        let mut content: Vec<u8> = Vec::new();
        content.extend_from_slice(b"NAME|A1|A2|CITY|ST|ZIP|ZIP4|F|M|L|PHONE|B1|B2|B3|B4\n");
        content.extend_from_slice(b"ACME TAX|1 MAIN||LAS CRUCES|NM|88001|1234|JOS\xc9||PE\xd1A|5555555||||\n");
        content.extend_from_slice(b"ACME TAX|2 MAIN||LAS CRUCES|NM|88001||ANA||RUIZ|5555555||||\n");
        content.extend_from_slice(b"FOREIGN|||TORONTO||M5V 2T6||||||||||\n");
        fs::write(&path, content).unwrap();

        let zips = read_listing_zips(&path).unwrap();
        assert_eq!(zips, vec![88001, 88001]);
    }

    #[test]
    fn missing_listing_fails() {
        let path = std::env::temp_dir().join("prep_panel_io_preparers_missing/zz.txt");
        assert!(matches!(
            read_listing_zips(&path),
            Err(PrepError::MissingInput { .. })
        ));
    }

    #[test]
    fn listing_layout() {
        let p = listing_path(Path::new("/data"), 2021, "ak");
        assert_eq!(p, PathBuf::from("/data/paid_preparers/2021/ak.txt"));
    }
}
