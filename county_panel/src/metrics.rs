use log::debug;
use std::collections::BTreeSet;

use crate::columns::*;
use crate::config::*;
use crate::merge::CountyTable;

// ******** Scalar rules *********
//
// All of them return a missing value as soon as one input is missing.

/// `numerator / denominator`, missing for a zero denominator.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Average amount per claim, in dollars.
pub fn mean_amount(total: Option<f64>, claims: Option<f64>, unit_scale: f64) -> Option<f64> {
    ratio(total, claims).map(|x| x * unit_scale)
}

/// Current value minus the prior value expressed in current dollars.
pub fn real_difference(current: Option<f64>, prior: Option<f64>, inflation: f64) -> Option<f64> {
    match (current, prior) {
        (Some(c), Some(p)) => Some(c - p * inflation),
        _ => None,
    }
}

pub fn difference(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    real_difference(current, prior, 1.0)
}

/// 1 when the share is strictly above one half, 0 otherwise.
pub fn majority_flag(share: Option<f64>) -> Option<f64> {
    share.map(|s| if s > 0.5 { 1.0 } else { 0.0 })
}

/// Metro counties have a continuum code of 1, 2 or 3.
pub fn urban_flag(rucc: Option<f64>) -> Option<f64> {
    rucc.map(|c| if (1.0..=3.0).contains(&c) { 1.0 } else { 0.0 })
}

fn sum_all(values: &[Option<f64>]) -> Option<f64> {
    values.iter().copied().sum()
}

/// Percentile ranks of the non-missing values, in (0, 1].
///
/// Tied values share the average of their ranks, and the rank is divided by the
/// number of non-missing values.
pub fn percentile_ranks(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.map(|x| (idx, x)))
        .collect();
    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = present.len() as f64;
    let mut res: Vec<Option<f64>> = vec![None; values.len()];
    let mut start = 0;
    while start < present.len() {
        let mut end = start;
        while end + 1 < present.len() && present[end + 1].1 == present[start].1 {
            end += 1;
        }
        // Ranks are 1-based: positions start..=end hold ranks start+1..=end+1.
        let avg_rank = ((start + 1) + (end + 1)) as f64 / 2.0;
        for (idx, _) in present[start..=end].iter() {
            res[*idx] = Some(avg_rank / n);
        }
        start = end + 1;
    }
    res
}

// ******** Source tables *********

/// Shares and counts from the ACS demographic profile.
pub fn demographics(raw: &CountyTable) -> Result<CountyTable, PanelError> {
    let mut t = raw.clone();
    t.derive(SHARE_BLACK, &[BLACK_POP, TOT_POP], |v| ratio(v[0], v[1]))?;
    t.derive(MAJ_BLACK, &[SHARE_BLACK], |v| majority_flag(v[0]))?;
    t.derive(SHARE_HISP, &[PCT_HISP], |v| v[0].map(|p| p / 100.0))?;
    t.derive(MAJ_HISP, &[SHARE_HISP], |v| majority_flag(v[0]))?;
    t.derive(SHARE_MALE, &[PCT_MALE], |v| v[0].map(|p| p / 100.0))?;
    t.derive(ADULT_POP, &ADULT_AGE_GROUPS, sum_all)?;
    let n_elderly = ELDERLY_AGE_GROUPS.len();
    let mut elderly_inputs = ELDERLY_AGE_GROUPS.to_vec();
    elderly_inputs.push(TOT_POP);
    t.derive(SHARE_ELDERLY, &elderly_inputs, |v| {
        ratio(sum_all(&v[..n_elderly]), v[n_elderly])
    })?;
    t.derive(CHILD_POP, &[TOT_POP, ADULT_POP], |v| difference(v[0], v[1]))?;
    t.select(&DEMOGRAPHIC_COLUMNS)
}

/// Share of residents 18 and over holding a bachelor's degree or higher.
pub fn education(raw: &CountyTable) -> Result<CountyTable, PanelError> {
    let mut t = raw.clone();
    t.derive(
        SHARE_COLLEGE,
        &[BACHELORS_18_24, BACHELORS_25_PLUS, POP_18_24, POP_25_PLUS],
        |v| ratio(sum_all(&v[..2]), sum_all(&v[2..])),
    )?;
    t.select(&[SHARE_COLLEGE])
}

/// Labor force participation, unemployment (both as published, in percent) and
/// median household income.
pub fn economics(raw: &CountyTable) -> Result<CountyTable, PanelError> {
    raw.select(&ECONOMIC_COLUMNS)
}

/// Share of residents 15 and over who are married.
pub fn marriage(raw: &CountyTable) -> Result<CountyTable, PanelError> {
    let mut t = raw.clone();
    t.derive(R_MARRIAGE, &[PCT_MARRIED], |v| v[0].map(|p| p / 100.0))?;
    t.select(&[R_MARRIAGE])
}

/// Continuum code and metro indicator.
pub fn urbanicity(raw: &CountyTable) -> Result<CountyTable, PanelError> {
    let mut t = raw.clone();
    t.derive(URBAN, &[RUCC], |v| urban_flag(v[0]))?;
    t.select(&[RUCC, URBAN])
}

/// Preparer use and child tax credit from the overall SOI cut.
///
/// With `with_eip`, the economic impact payment amounts are added (only the
/// current year has them).
pub fn soi_overall(
    raw: &CountyTable,
    year: u16,
    with_eip: bool,
    config: &PanelConfig,
) -> Result<CountyTable, PanelError> {
    let sfx = config.year_suffix(year);
    let scale = config.unit_scale;
    let mut t = raw.clone();
    let mut cols: Vec<String> = Vec::new();

    let name = with_suffix(SHARE_USING_PP, &sfx);
    t.derive(&name, &[PREP, N1], |v| ratio(v[0], v[1]))?;
    cols.push(name);
    let name = with_suffix(SHARE_CTC, &sfx);
    t.derive(&name, &[N11070, N1], |v| ratio(v[0], v[1]))?;
    cols.push(name);
    let name = with_suffix(MEAN_CTC, &sfx);
    t.derive(&name, &[A11070, N11070], |v| mean_amount(v[0], v[1], scale))?;
    cols.push(name);
    let name = with_suffix(TOT_CTC, &sfx);
    t.derive(&name, &[A11070], |v| v[0])?;
    cols.push(name);

    if with_eip {
        let name = with_suffix(EIP_AMOUNT, &sfx);
        t.derive(&name, &[A10971], |v| v[0])?;
        cols.push(name);
        let name = with_suffix(MEAN_EIP, &sfx);
        t.derive(&name, &[A10971, N10971], |v| mean_amount(v[0], v[1], scale))?;
        cols.push(name);
    }

    let selected: Vec<&str> = cols.iter().map(|c| c.as_str()).collect();
    t.select(&selected)
}

/// EITC measures from the AGI cut, restricted to the eligible brackets.
pub fn soi_eitc(raw: &CountyTable, year: u16, config: &PanelConfig) -> Result<CountyTable, PanelError> {
    let sfx = config.year_suffix(year);
    let scale = config.unit_scale;
    let mut t = raw.clone();
    let share = with_suffix(SHARE_EITC, &sfx);
    let mean = with_suffix(MEAN_EITC, &sfx);
    let tot = with_suffix(TOT_EITC, &sfx);
    t.derive(&share, &[N59660, N1], |v| ratio(v[0], v[1]))?;
    t.derive(&mean, &[A59660, N59660], |v| mean_amount(v[0], v[1], scale))?;
    t.derive(&tot, &[A59660], |v| v[0])?;
    t.select(&[share.as_str(), mean.as_str(), tot.as_str()])
}

/// EIP claim rate from the AGI cut, restricted to the eligible brackets.
pub fn soi_eip(raw: &CountyTable, year: u16, config: &PanelConfig) -> Result<CountyTable, PanelError> {
    let share = with_suffix(SHARE_EIP, &config.year_suffix(year));
    let mut t = raw.clone();
    t.derive(&share, &[N10971, N1], |v| ratio(v[0], v[1]))?;
    t.select(&[share.as_str()])
}

// ******** Panel-wide measures *********

/// Changes between the prior and the current year. Dollar amounts of the prior
/// year are scaled by the inflation multiplier first.
pub fn add_year_over_year(panel: &mut CountyTable, config: &PanelConfig) -> Result<(), PanelError> {
    let prior = config.year_suffix(config.prior_year);
    let cur = config.year_suffix(config.current_year);
    let infl = config.inflation_multiplier;
    for (dif, base, is_amount) in [
        (SHARE_CTC_DIF, SHARE_CTC, false),
        (MEAN_CTC_DIF, MEAN_CTC, true),
        (SHARE_EITC_DIF, SHARE_EITC, false),
        (MEAN_EITC_DIF, MEAN_EITC, true),
    ] {
        let c = with_suffix(base, &cur);
        let p = with_suffix(base, &prior);
        let m = if is_amount { infl } else { 1.0 };
        panel.derive(dif, &[c.as_str(), p.as_str()], |v| real_difference(v[0], v[1], m))?;
    }
    Ok(())
}

/// Percentile of the median household income among the counties of the panel.
pub fn add_income_percentile(panel: &mut CountyTable) -> Result<(), PanelError> {
    let incomes = panel.column(MEDIAN_HH_INC)?;
    panel.add_column(HH_INC_PCT, percentile_ranks(&incomes))
}

/// One 1/0 column per state present in the panel, in state order.
pub fn add_state_indicators(panel: &mut CountyTable) -> Result<(), PanelError> {
    let states: BTreeSet<String> = panel.keys().map(|k| k.state()).collect();
    debug!("add_state_indicators: {} states", states.len());
    for state in states.iter() {
        let values: Vec<Option<f64>> = panel
            .keys()
            .map(|k| Some(if k.state() == *state { 1.0 } else { 0.0 }))
            .collect();
        panel.add_column(&format!("{}{}", STATE_INDICATOR_PREFIX, state), values)?;
    }
    Ok(())
}
