// HUD USPS ZIP to county crosswalk.

use std::path::{Path, PathBuf};

use county_panel::{CountyKey, CrosswalkEntry};

use crate::panel::{io_common::*, io_preparers::parse_zip, *};

/// The first-quarter crosswalk of the given year.
pub fn crosswalk_path(root: &Path, year: u16) -> PathBuf {
    [
        root.to_path_buf(),
        PathBuf::from("zip_county_xwalk"),
        PathBuf::from(format!("ZIP_COUNTY_03{}.csv", year)),
    ]
    .iter()
    .collect()
}

/// Reads the `ZIP` and `COUNTY` columns. The ratio columns are not used.
///
/// A missing file is an error: the crosswalk of another year is never used in
/// its place.
pub fn read_crosswalk(path: &Path) -> PrepResult<Vec<CrosswalkEntry>> {
    let p = require_file(path)?;
    info!("Attempting to read crosswalk {:?}", p);
    let rdr = open_csv(&p, b',')?;
    let mut records = rdr.into_byte_records();
    let header = HeaderIndex::new(&p, &next_record(&mut records, &p, 1)?);
    let zip_idx = header.position("ZIP")?;
    let county_idx = header.position("COUNTY")?;

    let mut res: Vec<CrosswalkEntry> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {
            path: p.clone(),
            lineno,
        })?;
        let raw_zip = field(&line, zip_idx, &p, lineno)?;
        let zip = match parse_zip(&raw_zip) {
            Some(z) => z,
            None => {
                return MalformedNumberSnafu {
                    path: p.clone(),
                    lineno,
                    content: raw_zip,
                }
                .fail()
            }
        };
        let county = CountyKey::parse(&field(&line, county_idx, &p, lineno)?)
            .context(PanelSnafu {})?;
        res.push(CrosswalkEntry { zip, county });
    }
    debug!("read_crosswalk: {}: {} entries", p, res.len());
    Ok(res)
}
