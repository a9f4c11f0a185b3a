// Writers for the panel and the summary statistics.

use std::path::Path;

use county_panel::{columns::COUNTY, summary::SummaryRow, CountyTable};
use serde::Serialize;

use crate::panel::*;

#[derive(PartialEq, Debug, Clone, Serialize)]
struct SummaryLine<'a> {
    variable: &'a str,
    period: &'a str,
    n: usize,
    mean: Option<f64>,
    std: Option<f64>,
}

/// Renders the panel as CSV: one row per county in key order, missing values as
/// empty cells, numbers in their shortest round-trip form.
pub fn render_panel(panel: &CountyTable) -> PrepResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header: Vec<&str> = vec![COUNTY];
    header.extend(panel.columns().iter().map(|c| c.as_str()));
    wtr.write_record(&header)
        .context(CsvWriteSnafu { path: panel.name() })?;
    for (key, values) in panel.rows() {
        let mut record: Vec<String> = Vec::with_capacity(values.len() + 1);
        record.push(key.to_string());
        record.extend(values.iter().map(|v| match v {
            Some(x) => x.to_string(),
            None => String::new(),
        }));
        wtr.write_record(&record)
            .context(CsvWriteSnafu { path: panel.name() })?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(WritingSnafu { path: panel.name() })?;
    String::from_utf8(bytes).whatever_context("panel output is not valid UTF-8")
}

pub fn write_summary(path: &Path, rows: &[SummaryRow]) -> PrepResult<()> {
    let p = path.display().to_string();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingSnafu { path: p.clone() })?;
        }
    }
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path: p.clone() })?;
    for r in rows.iter() {
        wtr.serialize(SummaryLine {
            variable: &r.variable,
            period: &r.period,
            n: r.n,
            mean: r.mean,
            std: r.std,
        })
        .context(CsvWriteSnafu { path: p.clone() })?;
    }
    wtr.flush().context(WritingSnafu { path: p })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use county_panel::CountyKey;

    #[test]
    fn renders_keys_padded_and_gaps_empty() {
        let mut t = CountyTable::new("panel", &["counts_2021", "share_ctc"]);
        t.insert(CountyKey::parse("9003").unwrap(), vec![Some(2.5), None])
            .unwrap();
        t.insert(CountyKey::parse("01001").unwrap(), vec![Some(3.0), Some(0.125)])
            .unwrap();
        let s = render_panel(&t).unwrap();
        assert_eq!(
            s,
            "county,counts_2021,share_ctc\n01001,3,0.125\n09003,2.5,\n"
        );
    }

    #[test]
    fn summary_header() {
        let path = std::env::temp_dir()
            .join("prep_panel_io_output")
            .join("summary.csv");
        let rows = vec![SummaryRow {
            variable: "share_ctc".to_string(),
            period: "2021".to_string(),
            n: 1,
            mean: Some(0.5),
            std: None,
        }];
        write_summary(&path, &rows).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "variable,period,n,mean,std\nshare_ctc,2021,1,0.5,\n");
    }
}
