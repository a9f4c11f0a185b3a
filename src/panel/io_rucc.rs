// USDA rural-urban continuum codes, as published (xlsx) or exported to csv.

use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use county_panel::{columns::RUCC, CountyKey, CountyTable};

use crate::panel::{io_common::*, *};

const TABLE: &str = "rural_urban";
const FIPS: &str = "FIPS";

/// Reads the FIPS and RUCC_2023 columns into a table with one `RUCC_2023` column.
///
/// The format is chosen from the file extension.
pub fn read_rural_urban(path: &Path) -> PrepResult<CountyTable> {
    let p = require_file(path)?;
    info!("Attempting to read rural-urban codes {:?}", p);
    let is_excel = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    let rows = if is_excel {
        read_excel_rows(&p)?
    } else {
        read_csv_rows(&p)?
    };
    let mut table = CountyTable::new(TABLE, &[RUCC]);
    for (key, code) in rows {
        table.insert(key, vec![code]).context(PanelSnafu {})?;
    }
    debug!("read_rural_urban: {}: {} counties", p, table.len());
    Ok(table)
}

fn read_csv_rows(p: &str) -> PrepResult<Vec<(CountyKey, Option<f64>)>> {
    let rdr = open_csv(p, b',')?;
    let mut records = rdr.into_byte_records();
    let header = HeaderIndex::new(p, &next_record(&mut records, p, 1)?);
    let fips_idx = header.position(FIPS)?;
    let rucc_idx = header.position(RUCC)?;
    let mut res = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path: p, lineno })?;
        let key = CountyKey::parse(&field(&line, fips_idx, p, lineno)?).context(PanelSnafu {})?;
        let code = parse_number(&field(&line, rucc_idx, p, lineno)?, p, lineno)?;
        res.push((key, code));
    }
    Ok(res)
}

fn read_excel_rows(p: &str) -> PrepResult<Vec<(CountyKey, Option<f64>)>> {
    let mut workbook: Xlsx<_> = open_workbook(p).context(OpeningExcelSnafu { path: p })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path: p })?
        .context(OpeningExcelSnafu { path: p })?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path: p })?;
    debug!("read_excel_rows: header: {:?}", header);
    let position = |name: &str| {
        header
            .iter()
            .position(|c| matches!(c, DataType::String(s) if s.trim() == name))
            .context(MissingHeaderSnafu { path: p, column: name })
    };
    let fips_idx = position(FIPS)?;
    let rucc_idx = position(RUCC)?;

    let mut res = Vec::new();
    let mut skipped = 0;
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        let fips = match row.get(fips_idx) {
            Some(DataType::String(s)) => s.clone(),
            Some(DataType::Float(f)) => f.to_string(),
            Some(DataType::Int(i)) => i.to_string(),
            Some(DataType::Empty) | None => {
                debug!("read_excel_rows: {}:{}: skipping row {:?}", p, lineno, row);
                skipped += 1;
                continue;
            }
            Some(cell) => {
                return ExcelWrongCellTypeSnafu {
                    path: p,
                    lineno,
                    content: format!("{:?}", cell),
                }
                .fail()
            }
        };
        let key = CountyKey::parse(&fips).context(PanelSnafu {})?;
        let code = match row.get(rucc_idx) {
            Some(DataType::Float(f)) => Some(*f),
            Some(DataType::Int(i)) => Some(*i as f64),
            Some(DataType::String(s)) => parse_number(s, p, lineno)?,
            Some(DataType::Empty) | None => None,
            Some(cell) => {
                return ExcelWrongCellTypeSnafu {
                    path: p,
                    lineno,
                    content: format!("{:?}", cell),
                }
                .fail()
            }
        };
        res.push((key, code));
    }
    if skipped > 0 {
        warn!(
            "{}: skipped {} rows without a FIPS code",
            simplify_file_name(p),
            skipped
        );
    }
    Ok(res)
}
