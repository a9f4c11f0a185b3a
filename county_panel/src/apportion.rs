use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::columns::counts_column;
use crate::config::*;
use crate::fips::CountyKey;
use crate::merge::CountyTable;

impl ZipCount {
    /// Counts the occurrences of each ZIP code, one per listing.
    pub fn tally<I: IntoIterator<Item = u32>>(zips: I) -> Vec<ZipCount> {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for zip in zips {
            *counts.entry(zip).or_insert(0.0) += 1.0;
        }
        counts
            .into_iter()
            .map(|(zip, count)| ZipCount { zip, count })
            .collect()
    }
}

/// Moves ZIP-level counts to counties.
///
/// The crosswalk decides which ZIP codes exist: a crosswalk ZIP without any count
/// contributes zero, and a counted ZIP that is missing from the crosswalk is
/// dropped (and reported). A ZIP that spans several counties is split evenly
/// between them, whatever the population in each part. Counties in
/// [`crate::INCOMPATIBLE_COUNTIES`] are removed at the end.
///
/// The result has a single column, `counts_<year>`.
pub fn apportion(
    counts: &[ZipCount],
    crosswalk: &[CrosswalkEntry],
    year: u16,
) -> Result<(CountyTable, ApportionReport), PanelError> {
    // The same ZIP may come from several files.
    let mut by_zip: BTreeMap<u32, f64> = BTreeMap::new();
    for zc in counts.iter() {
        *by_zip.entry(zc.zip).or_insert(0.0) += zc.count;
    }
    let input_mass: f64 = by_zip.values().sum();

    // A ZIP listed twice for the same county must only count once in the split.
    let mut counties_by_zip: BTreeMap<u32, BTreeSet<CountyKey>> = BTreeMap::new();
    for entry in crosswalk.iter() {
        counties_by_zip
            .entry(entry.zip)
            .or_default()
            .insert(entry.county);
    }

    let unmatched: Vec<u32> = by_zip
        .keys()
        .filter(|zip| !counties_by_zip.contains_key(zip))
        .cloned()
        .collect();
    if !unmatched.is_empty() {
        warn!(
            "apportion: {}: {} ZIP codes with listings are not in the crosswalk",
            year,
            unmatched.len()
        );
        debug!("apportion: {}: unmatched ZIP codes: {:?}", year, unmatched);
    }

    let mut by_county: BTreeMap<CountyKey, f64> = BTreeMap::new();
    for (zip, counties) in counties_by_zip.iter() {
        let count = by_zip.get(zip).cloned().unwrap_or(0.0);
        let share = count / (counties.len() as f64);
        for county in counties.iter() {
            *by_county.entry(*county).or_insert(0.0) += share;
        }
    }
    let apportioned_mass: f64 = by_county.values().sum();
    let counties_before_exclusion = by_county.len();

    let column = counts_column(year);
    let mut table = CountyTable::new(&format!("preparers_{}", year), &[column.as_str()]);
    for (county, count) in by_county.into_iter() {
        if !county.is_incompatible() {
            table.insert(county, vec![Some(count)])?;
        }
    }

    let report = ApportionReport {
        year,
        input_mass,
        apportioned_mass,
        unmatched_zips: unmatched.len(),
        counties_before_exclusion,
        counties_after_exclusion: table.len(),
    };
    info!(
        "apportion: total counties in {}: {}, after dropping incompatible counties: {}",
        year, report.counties_before_exclusion, report.counties_after_exclusion
    );
    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CountyKey {
        CountyKey::parse(s).unwrap()
    }

    fn xw(zip: u32, county: &str) -> CrosswalkEntry {
        CrosswalkEntry {
            zip,
            county: key(county),
        }
    }

    fn zc(zip: u32, count: f64) -> ZipCount {
        ZipCount { zip, count }
    }

    #[test]
    fn tally_counts_listings() {
        let t = ZipCount::tally(vec![99501, 35004, 99501]);
        assert_eq!(t, vec![zc(35004, 1.0), zc(99501, 2.0)]);
    }

    #[test]
    fn splits_evenly_across_counties() {
        let (t, report) =
            apportion(&[zc(35004, 10.0)], &[xw(35004, "01001"), xw(35004, "01003")], 2021)
                .unwrap();
        assert_eq!(t.get(&key("01001"), "counts_2021").unwrap(), Some(5.0));
        assert_eq!(t.get(&key("01003"), "counts_2021").unwrap(), Some(5.0));
        assert_eq!(report.input_mass, 10.0);
        assert_eq!(report.apportioned_mass, 10.0);
    }

    #[test]
    fn duplicate_input_zips_are_summed() {
        let (t, _) = apportion(
            &[zc(35004, 4.0), zc(35004, 2.0)],
            &[xw(35004, "01001")],
            2017,
        )
        .unwrap();
        assert_eq!(t.get(&key("01001"), "counts_2017").unwrap(), Some(6.0));
    }

    #[test]
    fn repeated_crosswalk_pairs_do_not_dilute() {
        let (t, _) = apportion(
            &[zc(35004, 9.0)],
            &[xw(35004, "01001"), xw(35004, "01001"), xw(35004, "01003")],
            2021,
        )
        .unwrap();
        assert_eq!(t.get(&key("01001"), "counts_2021").unwrap(), Some(4.5));
        assert_eq!(t.get(&key("01003"), "counts_2021").unwrap(), Some(4.5));
    }

    #[test]
    fn crosswalk_zips_without_listings_count_zero() {
        let (t, _) = apportion(
            &[zc(35004, 2.0)],
            &[xw(35004, "01001"), xw(36067, "01005")],
            2021,
        )
        .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(&key("01005"), "counts_2021").unwrap(), Some(0.0));
    }

    #[test]
    fn mass_is_conserved_before_exclusion() {
        let counts = vec![zc(1, 7.0), zc(2, 3.0), zc(3, 11.0), zc(4, 1.0)];
        let crosswalk = vec![
            xw(1, "01001"),
            xw(1, "01003"),
            xw(1, "01005"),
            xw(2, "01003"),
            xw(3, "02261"),
            xw(3, "02020"),
            xw(4, "09110"),
        ];
        let (t, report) = apportion(&counts, &crosswalk, 2021).unwrap();
        assert!((report.apportioned_mass - 22.0).abs() < 1e-9);
        assert_eq!(report.counties_before_exclusion, 6);
        assert_eq!(report.counties_after_exclusion, 4);
        let kept: f64 = t.column("counts_2021").unwrap().iter().flatten().sum();
        // 5.5 went to 02261 and 1.0 to 09110.
        assert!((kept - 15.5).abs() < 1e-9);
    }

    #[test]
    fn excluded_counties_never_appear() {
        let crosswalk: Vec<CrosswalkEntry> = crate::INCOMPATIBLE_COUNTIES
            .iter()
            .enumerate()
            .map(|(i, k)| CrosswalkEntry {
                zip: 6000 + i as u32,
                county: *k,
            })
            .collect();
        let counts: Vec<ZipCount> = crosswalk.iter().map(|e| zc(e.zip, 1.0)).collect();
        let (t, report) = apportion(&counts, &crosswalk, 2017).unwrap();
        assert!(t.is_empty());
        assert_eq!(report.counties_before_exclusion, 10);
    }

    #[test]
    fn unmatched_zips_are_reported() {
        let (t, report) = apportion(&[zc(1, 2.0), zc(2, 3.0)], &[xw(1, "01001")], 2021).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(report.unmatched_zips, 1);
        assert_eq!(report.input_mass, 5.0);
        assert_eq!(report.apportioned_mass, 2.0);
    }
}
