/*!
Builds a county-level panel of paid tax preparer usage.

The crate contains the parts of the pipeline that carry invariants, without any
file access:

* [`CountyKey`] normalizes state and county FIPS codes into one five digit key;
* [`apportion()`] moves preparer counts from ZIP codes to counties, splitting a
  ZIP evenly across the counties it overlaps;
* [`CountyTable`] holds one row per county and left-joins sources onto the panel,
  failing on any duplicated county;
* [`metrics`] derives claim rates, mean amounts, year-over-year changes and
  percentiles from the raw counts.

[`build_panel`] runs all of them in order, given sources that have been read
elsewhere.
*/

mod apportion;
pub mod columns;
mod config;
mod fips;
mod merge;
pub mod metrics;
pub mod soi;
pub mod summary;

use log::info;

pub use crate::apportion::apportion;
pub use crate::config::*;
pub use crate::fips::{CountyKey, INCOMPATIBLE_COUNTIES};
pub use crate::merge::CountyTable;

/// The inputs that belong to one tax year.
#[derive(PartialEq, Debug, Clone)]
pub struct YearSources {
    pub year: u16,
    /// Preparer listings counted by ZIP code, all states together.
    pub preparer_counts: Vec<ZipCount>,
    pub crosswalk: Vec<CrosswalkEntry>,
    pub soi_overall: Vec<SoiRecord>,
    pub soi_agi: Vec<SoiRecord>,
}

/// Everything needed to build the panel.
///
/// The census tables use the raw column names of [`columns`].
#[derive(PartialEq, Debug, Clone)]
pub struct PanelSources {
    pub current: YearSources,
    pub prior: YearSources,
    pub rural_urban: CountyTable,
    pub demographics: CountyTable,
    pub education: CountyTable,
    pub economics: CountyTable,
    pub marriage: CountyTable,
}

#[derive(PartialEq, Debug, Clone)]
pub struct BuiltPanel {
    pub panel: CountyTable,
    pub reports: Vec<ApportionReport>,
}

/// Builds the county panel.
///
/// The counties are those that have a crosswalk entry in the current year, minus
/// the incompatible ones. Every other source is left-joined onto them, so a
/// county missing from a source keeps missing values for its columns.
pub fn build_panel(sources: &PanelSources, config: &PanelConfig) -> Result<BuiltPanel, PanelError> {
    info!(
        "build_panel: {} and {}, {} states, inflation multiplier {}",
        config.current_year,
        config.prior_year,
        config.states.len(),
        config.inflation_multiplier
    );
    let cur = &sources.current;
    let prior = &sources.prior;

    let (cur_counts, cur_report) = apportion(&cur.preparer_counts, &cur.crosswalk, cur.year)?;
    let (prior_counts, prior_report) =
        apportion(&prior.preparer_counts, &prior.crosswalk, prior.year)?;

    let mut panel = cur_counts.left_join_all(&prior_counts)?;
    panel = panel.left_join_all(&metrics::urbanicity(&sources.rural_urban)?)?;
    panel = panel.left_join_all(&metrics::demographics(&sources.demographics)?)?;
    panel = panel.left_join_all(&metrics::education(&sources.education)?)?;
    panel = panel.left_join_all(&metrics::economics(&sources.economics)?)?;
    panel = panel.left_join_all(&metrics::marriage(&sources.marriage)?)?;
    metrics::add_income_percentile(&mut panel)?;

    let soi_overall_name = |y: u16| format!("soi_overall_{}", y);
    let soi_agi_name = |y: u16, stub: u32| format!("soi_agi_{}_stub{}", y, stub);

    let overall = soi::aggregate(&soi_overall_name(cur.year), &cur.soi_overall, None)?;
    panel = panel.left_join_all(&metrics::soi_overall(&overall, cur.year, true, config)?)?;
    let eip_cut = soi::aggregate(
        &soi_agi_name(cur.year, config.eip_max_agi_stub),
        &cur.soi_agi,
        Some(config.eip_max_agi_stub),
    )?;
    panel = panel.left_join_all(&metrics::soi_eip(&eip_cut, cur.year, config)?)?;
    let eitc_cut = soi::aggregate(
        &soi_agi_name(cur.year, config.eitc_max_agi_stub),
        &cur.soi_agi,
        Some(config.eitc_max_agi_stub),
    )?;
    panel = panel.left_join_all(&metrics::soi_eitc(&eitc_cut, cur.year, config)?)?;

    let overall = soi::aggregate(&soi_overall_name(prior.year), &prior.soi_overall, None)?;
    panel = panel.left_join_all(&metrics::soi_overall(&overall, prior.year, false, config)?)?;
    let eitc_cut = soi::aggregate(
        &soi_agi_name(prior.year, config.eitc_max_agi_stub),
        &prior.soi_agi,
        Some(config.eitc_max_agi_stub),
    )?;
    panel = panel.left_join_all(&metrics::soi_eitc(&eitc_cut, prior.year, config)?)?;

    metrics::add_year_over_year(&mut panel, config)?;
    metrics::add_state_indicators(&mut panel)?;

    info!(
        "build_panel: {} counties, {} columns",
        panel.len(),
        panel.columns().len() + 1
    );
    Ok(BuiltPanel {
        panel,
        reports: vec![cur_report, prior_report],
    })
}

#[cfg(test)]
mod tests {
    use super::columns::*;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn key(s: &str) -> CountyKey {
        CountyKey::parse(s).unwrap()
    }

    fn table(name: &str, cols: &[&str], rows: &[(&str, Vec<Option<f64>>)]) -> CountyTable {
        let mut t = CountyTable::new(name, cols);
        for (k, v) in rows.iter() {
            t.insert(key(k), v.clone()).unwrap();
        }
        t
    }

    fn soi(state: &str, county: &str, stub: Option<u32>, n1: f64) -> SoiRecord {
        SoiRecord {
            state_fips: state.to_string(),
            county_fips: county.to_string(),
            agi_stub: stub,
            n1: Some(n1),
            prep: Some(n1 / 2.0),
            n11070: Some(n1 / 4.0),
            a11070: Some(n1 / 8.0),
            n59660: Some(n1 / 10.0),
            a59660: Some(n1 / 5.0),
            n10971: Some(n1 / 2.0),
            a10971: Some(n1),
        }
    }

    fn sources() -> PanelSources {
        let crosswalk = vec![
            CrosswalkEntry { zip: 35004, county: key("01001") },
            CrosswalkEntry { zip: 35004, county: key("01003") },
            CrosswalkEntry { zip: 99686, county: key("02261") },
            CrosswalkEntry { zip: 6001, county: key("09003") },
        ];
        let year = |year: u16, counts: Vec<ZipCount>| YearSources {
            year,
            preparer_counts: counts,
            crosswalk: crosswalk.clone(),
            soi_overall: vec![
                soi("1", "0", None, 1e6),
                soi("1", "1", None, 1000.0),
                soi("1", "3", None, 2000.0),
                soi("9", "3", None, 500.0),
                soi("2", "261", None, 10.0),
            ],
            soi_agi: (1..=8)
                .flat_map(|stub| vec![soi("1", "1", Some(stub), 100.0), soi("9", "3", Some(stub), 10.0)])
                .collect(),
        };
        let mut demog_cols = vec![TOT_POP, BLACK_POP, PCT_HISP, PCT_MALE];
        demog_cols.extend(ADULT_AGE_GROUPS.iter());
        let mut demog_row = vec![Some(900.0), Some(90.0), Some(60.0), Some(50.0)];
        demog_row.extend(std::iter::repeat(Some(70.0)).take(9));

        PanelSources {
            current: year(2021, vec![ZipCount { zip: 35004, count: 10.0 }, ZipCount { zip: 99686, count: 3.0 }]),
            prior: year(2017, vec![ZipCount { zip: 35004, count: 6.0 }, ZipCount { zip: 6001, count: 1.0 }]),
            rural_urban: table(
                "rural_urban",
                &[RUCC],
                &[("01001", vec![Some(2.0)]), ("01003", vec![Some(6.0)])],
            ),
            // 01003 has no demographic row.
            demographics: table("demographics", &demog_cols, &[("01001", demog_row)]),
            education: table(
                "education",
                &[BACHELORS_18_24, BACHELORS_25_PLUS, POP_18_24, POP_25_PLUS],
                &[("01001", vec![Some(10.0), Some(90.0), Some(100.0), Some(300.0)])],
            ),
            economics: table(
                "economics",
                &[R_LFP, R_UNEMP, MEDIAN_HH_INC],
                &[
                    ("01001", vec![Some(60.0), Some(4.0), Some(50000.0)]),
                    ("01003", vec![Some(62.0), Some(3.0), Some(60000.0)]),
                    ("09003", vec![Some(65.0), Some(5.0), None]),
                ],
            ),
            marriage: table("marriage", &[PCT_MARRIED], &[("01003", vec![Some(48.0)])]),
        }
    }

    #[test]
    fn builds_one_row_per_county() {
        init();
        let config = PanelConfig {
            inflation_multiplier: 1.02,
            ..PanelConfig::DEFAULT_CONFIG
        };
        let built = build_panel(&sources(), &config).unwrap();
        let p = &built.panel;

        let keys: Vec<String> = p.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["01001", "01003", "09003"]);

        assert_eq!(p.get(&key("01001"), "counts_2021").unwrap(), Some(5.0));
        assert_eq!(p.get(&key("01003"), "counts_2017").unwrap(), Some(3.0));
        assert_eq!(p.get(&key("09003"), "counts_2021").unwrap(), Some(0.0));
        assert_eq!(p.get(&key("09003"), "counts_2017").unwrap(), Some(1.0));

        assert_eq!(p.get(&key("01001"), URBAN).unwrap(), Some(1.0));
        assert_eq!(p.get(&key("01003"), URBAN).unwrap(), Some(0.0));
        assert_eq!(p.get(&key("09003"), URBAN).unwrap(), None);

        assert_eq!(p.get(&key("01001"), SHARE_BLACK).unwrap(), Some(0.1));
        assert_eq!(p.get(&key("01003"), SHARE_BLACK).unwrap(), None);
        assert_eq!(p.get(&key("01001"), SHARE_COLLEGE).unwrap(), Some(0.25));
        assert_eq!(p.get(&key("01003"), R_MARRIAGE).unwrap(), Some(0.48));

        assert_eq!(p.get(&key("01001"), HH_INC_PCT).unwrap(), Some(0.5));
        assert_eq!(p.get(&key("01003"), HH_INC_PCT).unwrap(), Some(1.0));
        assert_eq!(p.get(&key("09003"), HH_INC_PCT).unwrap(), None);

        assert_eq!(p.get(&key("01001"), SHARE_USING_PP).unwrap(), Some(0.5));
        assert_eq!(p.get(&key("01001"), "share_using_pp_17").unwrap(), Some(0.5));
        assert_eq!(p.get(&key("01001"), MEAN_CTC).unwrap(), Some(500.0));
        assert_eq!(p.get(&key("01001"), MEAN_EIP).unwrap(), Some(2000.0));
        assert_eq!(p.get(&key("01001"), SHARE_EIP).unwrap(), Some(0.5));
        assert_eq!(p.get(&key("01001"), SHARE_EITC).unwrap(), Some(0.1));
        assert_eq!(p.get(&key("01001"), MEAN_EITC).unwrap(), Some(2000.0));
        // 01003 has no AGI rows.
        assert_eq!(p.get(&key("01003"), SHARE_EITC).unwrap(), None);

        let mean_ctc_dif = p.get(&key("01001"), MEAN_CTC_DIF).unwrap().unwrap();
        assert!((mean_ctc_dif - (500.0 - 500.0 * 1.02)).abs() < 1e-9);

        assert_eq!(p.get(&key("09003"), "state_ind_09").unwrap(), Some(1.0));
        assert_eq!(p.get(&key("09003"), "state_ind_01").unwrap(), Some(0.0));
        assert!(!p.has_column("state_ind_02"));

        assert_eq!(built.reports[0].counties_before_exclusion, 4);
        assert_eq!(built.reports[0].counties_after_exclusion, 3);
    }

    #[test]
    fn excluded_counties_stay_out() {
        let built = build_panel(&sources(), &PanelConfig::DEFAULT_CONFIG).unwrap();
        for k in INCOMPATIBLE_COUNTIES.iter() {
            assert!(!built.panel.contains(k));
        }
    }

    #[test]
    fn duplicated_source_rows_abort_the_build() {
        let mut s = sources();
        s.current.soi_overall.push(soi("01", "001", None, 5.0));
        assert!(matches!(
            build_panel(&s, &PanelConfig::DEFAULT_CONFIG),
            Err(PanelError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn bracket_duplicates_name_the_agi_cut() {
        let mut s = sources();
        s.current.soi_agi.push(soi("1", "1", Some(3), 5.0));
        match build_panel(&s, &PanelConfig::DEFAULT_CONFIG) {
            Err(PanelError::DuplicateKey { table, key: k }) => {
                assert_eq!(table, "soi_agi_2021_stub7 (agi_stub 3)");
                assert_eq!(k, key("01001"));
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn rebuilding_gives_the_same_panel() {
        let a = build_panel(&sources(), &PanelConfig::DEFAULT_CONFIG).unwrap();
        let b = build_panel(&sources(), &PanelConfig::DEFAULT_CONFIG).unwrap();
        assert_eq!(a, b);
    }
}
