// American Community Survey county extracts.
//
// The files have two header lines: the variable codes, then the labels. Columns
// are found by label.

use std::path::{Path, PathBuf};

use county_panel::{columns::*, CountyKey, CountyTable};

use crate::panel::{io_common::*, *};

const GEOGRAPHY: &str = "Geography";

/// Where to find a census table and which of its columns to keep.
#[derive(PartialEq, Debug, Clone)]
pub struct CensusSchema {
    pub table: &'static str,
    pub file_name: &'static str,
    /// (label in the file, column name in the table)
    pub columns: &'static [(&'static str, &'static str)],
    /// Columns where any unreadable value is missing instead of an error.
    pub lenient: &'static [&'static str],
}

pub const DEMOGRAPHICS: CensusSchema = CensusSchema {
    table: "demographics",
    file_name: "census_5yr_acs_2021.csv",
    columns: &[
        ("Estimate!!SEX AND AGE!!Total population", TOT_POP),
        (
            "Estimate!!Race alone or in combination with one or more other races!!Total population!!Black or African American",
            BLACK_POP,
        ),
        (
            "Percent!!HISPANIC OR LATINO AND RACE!!Total population!!Hispanic or Latino (of any race)",
            PCT_HISP,
        ),
        ("Percent!!SEX AND AGE!!Total population!!Male", PCT_MALE),
        ("Estimate!!SEX AND AGE!!Total population!!20 to 24 years", POP_20_24),
        ("Estimate!!SEX AND AGE!!Total population!!25 to 34 years", POP_25_34),
        ("Estimate!!SEX AND AGE!!Total population!!35 to 44 years", POP_35_44),
        ("Estimate!!SEX AND AGE!!Total population!!45 to 54 years", POP_45_54),
        ("Estimate!!SEX AND AGE!!Total population!!55 to 59 years", POP_55_59),
        ("Estimate!!SEX AND AGE!!Total population!!60 to 64 years", POP_60_64),
        ("Estimate!!SEX AND AGE!!Total population!!65 to 74 years", POP_65_74),
        ("Estimate!!SEX AND AGE!!Total population!!75 to 84 years", POP_75_84),
        ("Estimate!!SEX AND AGE!!Total population!!85 years and over", POP_85_PLUS),
    ],
    lenient: &[],
};

pub const EDUCATION: CensusSchema = CensusSchema {
    table: "education",
    file_name: "census_educ_2021.csv",
    columns: &[
        (
            "Estimate!!Total!!AGE BY EDUCATIONAL ATTAINMENT!!Population 18 to 24 years",
            POP_18_24,
        ),
        (
            "Estimate!!Total!!AGE BY EDUCATIONAL ATTAINMENT!!Population 18 to 24 years!!Bachelor's degree or higher",
            BACHELORS_18_24,
        ),
        (
            "Estimate!!Total!!AGE BY EDUCATIONAL ATTAINMENT!!Population 25 years and over",
            POP_25_PLUS,
        ),
        (
            "Estimate!!Total!!AGE BY EDUCATIONAL ATTAINMENT!!Population 25 years and over!!Bachelor's degree or higher",
            BACHELORS_25_PLUS,
        ),
    ],
    lenient: &[],
};

pub const ECONOMICS: CensusSchema = CensusSchema {
    table: "economics",
    file_name: "census_econ_2021.csv",
    columns: &[
        (
            "Percent!!EMPLOYMENT STATUS!!Population 16 years and over!!In labor force",
            R_LFP,
        ),
        (
            "Percent!!EMPLOYMENT STATUS!!Population 16 years and over!!In labor force!!Civilian labor force!!Unemployed",
            R_UNEMP,
        ),
        (
            "Estimate!!INCOME AND BENEFITS (IN 2021 INFLATION-ADJUSTED DOLLARS)!!Total households!!Median household income (dollars)",
            MEDIAN_HH_INC,
        ),
    ],
    // Top-coded as `250,000+`.
    lenient: &[MEDIAN_HH_INC],
};

pub const MARRIAGE: CensusSchema = CensusSchema {
    table: "marriage",
    file_name: "census_marriage_2021.csv",
    columns: &[(
        "Estimate!!Now married (except separated)!!Population 15 years and over",
        PCT_MARRIED,
    )],
    lenient: &[],
};

pub fn census_path(root: &Path, schema: &CensusSchema) -> PathBuf {
    [
        root.to_path_buf(),
        PathBuf::from("census"),
        PathBuf::from(schema.file_name),
    ]
    .iter()
    .collect()
}

/// Reads a census extract into a county table with the short column names of
/// the schema.
pub fn read_census_table(path: &Path, schema: &CensusSchema) -> PrepResult<CountyTable> {
    let p = require_file(path)?;
    info!("Attempting to read census table {:?}", p);
    let rdr = open_csv(&p, b',')?;
    let mut records = rdr.into_byte_records();
    // Variable codes (GEO_ID, NAME, DP05_0001E, ...)
    let _ = next_record(&mut records, &p, 1)?;
    let header = HeaderIndex::new(&p, &next_record(&mut records, &p, 2)?);
    let geo_idx = header.position(GEOGRAPHY)?;
    let mut positions: Vec<(usize, bool)> = Vec::new();
    for (label, name) in schema.columns.iter() {
        positions.push((header.position(label)?, schema.lenient.contains(name)));
    }

    let names: Vec<&str> = schema.columns.iter().map(|(_, name)| *name).collect();
    let mut table = CountyTable::new(schema.table, &names);
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 3;
        let line = line_r.context(CsvLineParseSnafu {
            path: p.clone(),
            lineno,
        })?;
        let key = CountyKey::from_geo_label(&field(&line, geo_idx, &p, lineno)?)
            .context(PanelSnafu {})?;
        let mut values: Vec<Option<f64>> = Vec::with_capacity(positions.len());
        for (col_idx, lenient) in positions.iter() {
            let content = field(&line, *col_idx, &p, lineno)?;
            let v = if *lenient {
                parse_number_lenient(&content)
            } else {
                parse_number(&content, &p, lineno)?
            };
            values.push(v);
        }
        table.insert(key, values).context(PanelSnafu {})?;
    }
    debug!("read_census_table: {}: {} counties", p, table.len());
    Ok(table)
}
