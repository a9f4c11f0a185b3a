// IRS Statistics of Income county files.

use std::path::{Path, PathBuf};

use county_panel::{columns, SoiRecord};

use crate::panel::{io_common::*, *};

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SoiCut {
    /// All returns, one row per county.
    Overall,
    /// One row per county and income bracket.
    Agi,
}

pub fn soi_path(root: &Path, year: u16, cut: SoiCut) -> PathBuf {
    let name = match cut {
        SoiCut::Overall => format!("{:02}incyallnoagi.csv", year % 100),
        SoiCut::Agi => format!("{:02}incyallagi.csv", year % 100),
    };
    [root.to_path_buf(), PathBuf::from("SOI"), PathBuf::from(name)]
        .iter()
        .collect()
}

// Positions of the columns used from a SOI file.
struct SoiColumns {
    state: usize,
    county: usize,
    agi_stub: Option<usize>,
    n1: usize,
    prep: usize,
    n11070: usize,
    a11070: usize,
    n59660: usize,
    a59660: usize,
    // The recovery rebate credit only exists from 2020 on.
    n10971: Option<usize>,
    a10971: Option<usize>,
}

impl SoiColumns {
    fn locate(header: &HeaderIndex) -> PrepResult<SoiColumns> {
        Ok(SoiColumns {
            state: header.position("STATEFIPS")?,
            county: header.position("COUNTYFIPS")?,
            agi_stub: header.find("agi_stub"),
            n1: header.position(columns::N1)?,
            prep: header.position(columns::PREP)?,
            n11070: header.position(columns::N11070)?,
            a11070: header.position(columns::A11070)?,
            n59660: header.position(columns::N59660)?,
            a59660: header.position(columns::A59660)?,
            n10971: header.find(columns::N10971),
            a10971: header.find(columns::A10971),
        })
    }
}

/// Reads the rows of a SOI county file.
///
/// The state totals are kept; they are told apart from counties when the table
/// is aggregated. An AGI file has an `agi_stub` column; the overall file may not.
pub fn read_soi(path: &Path) -> PrepResult<Vec<SoiRecord>> {
    let p = require_file(path)?;
    info!("Attempting to read SOI file {:?}", p);
    let rdr = open_csv(&p, b',')?;
    let mut records = rdr.into_byte_records();
    let header = HeaderIndex::new(&p, &next_record(&mut records, &p, 1)?);
    let cols = SoiColumns::locate(&header)?;
    if cols.n10971.is_none() {
        debug!("read_soi: {}: no economic impact payment columns", p);
    }

    let mut res: Vec<SoiRecord> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {
            path: p.clone(),
            lineno,
        })?;
        let text = |i: usize| field(&line, i, &p, lineno);
        let number = |i: usize| -> PrepResult<Option<f64>> { parse_number(&text(i)?, &p, lineno) };
        let optional = |i: Option<usize>| -> PrepResult<Option<f64>> {
            match i {
                Some(i) => number(i),
                None => Ok(None),
            }
        };
        let agi_stub = match cols.agi_stub {
            Some(i) => {
                let raw = text(i)?;
                match raw.trim().parse::<u32>() {
                    Ok(stub) => Some(stub),
                    Err(_) => {
                        return MalformedNumberSnafu {
                            path: p.clone(),
                            lineno,
                            content: raw,
                        }
                        .fail()
                    }
                }
            }
            None => None,
        };
        res.push(SoiRecord {
            state_fips: text(cols.state)?,
            county_fips: text(cols.county)?,
            agi_stub,
            n1: number(cols.n1)?,
            prep: number(cols.prep)?,
            n11070: number(cols.n11070)?,
            a11070: number(cols.a11070)?,
            n59660: number(cols.n59660)?,
            a59660: number(cols.a59660)?,
            n10971: optional(cols.n10971)?,
            a10971: optional(cols.a10971)?,
        });
    }
    debug!("read_soi: {}: {} rows", p, res.len());
    Ok(res)
}

/// Like [`read_soi`], for a file that must have one row per county and bracket.
pub fn read_soi_agi(path: &Path) -> PrepResult<Vec<SoiRecord>> {
    let rows = read_soi(path)?;
    if let Some(r) = rows.iter().find(|r| r.agi_stub.is_none()) {
        whatever!(
            "{}: AGI file without an agi_stub column (first row: state {}, county {})",
            path.display(),
            r.state_fips,
            r.county_fips
        )
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("prep_panel_io_soi");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_an_overall_file_without_eip() {
        let path = write_file(
            "17incyallnoagi.csv",
            "STATEFIPS,STATE,COUNTYFIPS,COUNTYNAME,N1,PREP,N11070,A11070,N59660,A59660\n\
             01,AL,000,Alabama,2000,900,300,600,100,250\n\
             01,AL,001,Autauga County,1000,400,150,300,50,125\n",
        );
        let rows = read_soi(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].county_fips, "001");
        assert_eq!(rows[1].agi_stub, None);
        assert_eq!(rows[1].prep, Some(400.0));
        assert_eq!(rows[1].n10971, None);
    }

    #[test]
    fn reads_brackets() {
        let path = write_file(
            "21incyallagi.csv",
            "STATEFIPS,COUNTYFIPS,agi_stub,N1,PREP,N11070,A11070,N59660,A59660,N10971,A10971\n\
             1,1,1,100,50,10,20,30,40,50,60\n\
             1,1,2,100,50,10,20,30,40,50,60\n",
        );
        let rows = read_soi_agi(&path).unwrap();
        assert_eq!(rows[1].agi_stub, Some(2));
        assert_eq!(rows[1].a10971, Some(60.0));
    }

    #[test]
    fn brackets_are_required_in_agi_files() {
        let path = write_file(
            "19incyallagi.csv",
            "STATEFIPS,COUNTYFIPS,N1,PREP,N11070,A11070,N59660,A59660\n\
             1,1,100,50,10,20,30,40\n",
        );
        assert!(matches!(
            read_soi_agi(&path),
            Err(PrepError::Whatever { .. })
        ));
    }

    #[test]
    fn missing_measure_column() {
        let path = write_file(
            "18incyallnoagi.csv",
            "STATEFIPS,COUNTYFIPS,N1,N11070,A11070,N59660,A59660\n1,1,100,10,20,30,40\n",
        );
        match read_soi(&path) {
            Err(PrepError::MissingHeader { column, .. }) => assert_eq!(column, "PREP"),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn malformed_numbers_fail() {
        let path = write_file(
            "16incyallnoagi.csv",
            "STATEFIPS,COUNTYFIPS,N1,PREP,N11070,A11070,N59660,A59660\n1,1,100,lots,10,20,30,40\n",
        );
        assert!(matches!(
            read_soi(&path),
            Err(PrepError::MalformedNumber { lineno: 2, .. })
        ));
    }

    #[test]
    fn file_names() {
        assert_eq!(
            soi_path(Path::new("/d"), 2021, SoiCut::Agi),
            PathBuf::from("/d/SOI/21incyallagi.csv")
        );
        assert_eq!(
            soi_path(Path::new("/d"), 2017, SoiCut::Overall),
            PathBuf::from("/d/SOI/17incyallnoagi.csv")
        );
    }
}
