use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::columns::SOI_MEASURES;
use crate::config::*;
use crate::fips::CountyKey;
use crate::merge::CountyTable;

impl SoiRecord {
    fn measures(&self) -> [Option<f64>; 8] {
        [
            self.n1,
            self.prep,
            self.n11070,
            self.a11070,
            self.n59660,
            self.a59660,
            self.n10971,
            self.a10971,
        ]
    }

    /// State total rows have a county code of zero.
    fn is_state_total(&self) -> bool {
        self.county_fips
            .trim()
            .split('.')
            .next()
            .map(|s| !s.is_empty() && s.chars().all(|c| c == '0'))
            .unwrap_or(false)
    }
}

/// Builds a county table from SOI rows.
///
/// State totals are dropped and the codes are normalized to county keys. With
/// `max_agi_stub`, the rows of the income brackets up to that stub are summed per
/// county; without it each county must appear once, as in the overall cut.
/// Incompatible counties are dropped here too.
///
/// The columns are [`SOI_MEASURES`]. A sum is missing only when all its terms are.
pub fn aggregate(
    name: &str,
    records: &[SoiRecord],
    max_agi_stub: Option<u32>,
) -> Result<CountyTable, PanelError> {
    let mut table = CountyTable::new(name, &SOI_MEASURES);
    match max_agi_stub {
        None => {
            for r in records.iter().filter(|r| !r.is_state_total()) {
                let key = CountyKey::from_parts(&r.state_fips, &r.county_fips)?;
                if !key.is_incompatible() {
                    table.insert(key, r.measures().to_vec())?;
                }
            }
        }
        Some(max_stub) => {
            let mut sums: BTreeMap<CountyKey, [Option<f64>; 8]> = BTreeMap::new();
            let mut seen: BTreeSet<(CountyKey, u32)> = BTreeSet::new();
            for r in records.iter().filter(|r| !r.is_state_total()) {
                let key = CountyKey::from_parts(&r.state_fips, &r.county_fips)?;
                let stub = match r.agi_stub {
                    Some(s) => s,
                    None => continue,
                };
                if !seen.insert((key, stub)) {
                    return Err(PanelError::DuplicateKey {
                        table: format!("{} (agi_stub {})", name, stub),
                        key,
                    });
                }
                if stub > max_stub || key.is_incompatible() {
                    continue;
                }
                let acc = sums.entry(key).or_insert([None; 8]);
                for (slot, v) in acc.iter_mut().zip(r.measures()) {
                    *slot = match (*slot, v) {
                        (Some(a), Some(b)) => Some(a + b),
                        (a, b) => a.or(b),
                    };
                }
            }
            for (key, values) in sums.into_iter() {
                table.insert(key, values.to_vec())?;
            }
        }
    }
    debug!(
        "aggregate: {}: {} counties from {} rows",
        name,
        table.len(),
        records.len()
    );
    Ok(table)
}
