//! Column names of the source tables and of the panel.
//!
//! Readers map the publishers' headers to the raw names below; the derived
//! names are the contract with the analysis scripts that read the panel CSV.

pub const COUNTY: &str = "county";

pub fn counts_column(year: u16) -> String {
    format!("counts_{}", year)
}

pub const STATE_INDICATOR_PREFIX: &str = "state_ind_";

// Rural-urban continuum codes
pub const RUCC: &str = "RUCC_2023";
pub const URBAN: &str = "urban";

// ACS demographic profile (raw)
pub const TOT_POP: &str = "tot_pop";
pub const BLACK_POP: &str = "black_pop";
pub const PCT_HISP: &str = "pct_hisp";
pub const PCT_MALE: &str = "pct_male";
pub const POP_20_24: &str = "pop_20_24";
pub const POP_25_34: &str = "pop_25_34";
pub const POP_35_44: &str = "pop_35_44";
pub const POP_45_54: &str = "pop_45_54";
pub const POP_55_59: &str = "pop_55_59";
pub const POP_60_64: &str = "pop_60_64";
pub const POP_65_74: &str = "pop_65_74";
pub const POP_75_84: &str = "pop_75_84";
pub const POP_85_PLUS: &str = "pop_85_plus";

pub const ADULT_AGE_GROUPS: [&str; 9] = [
    POP_20_24,
    POP_25_34,
    POP_35_44,
    POP_45_54,
    POP_55_59,
    POP_60_64,
    POP_65_74,
    POP_75_84,
    POP_85_PLUS,
];

pub const ELDERLY_AGE_GROUPS: [&str; 3] = [POP_65_74, POP_75_84, POP_85_PLUS];

// ACS demographic profile (derived)
pub const SHARE_BLACK: &str = "share_black";
pub const MAJ_BLACK: &str = "maj_black";
pub const SHARE_HISP: &str = "share_hisp";
pub const MAJ_HISP: &str = "maj_hisp";
pub const SHARE_MALE: &str = "share_male";
pub const ADULT_POP: &str = "adult_pop";
pub const SHARE_ELDERLY: &str = "share_elderly";
pub const CHILD_POP: &str = "child_pop";

pub const DEMOGRAPHIC_COLUMNS: [&str; 9] = [
    SHARE_BLACK,
    MAJ_BLACK,
    SHARE_HISP,
    MAJ_HISP,
    SHARE_MALE,
    ADULT_POP,
    TOT_POP,
    SHARE_ELDERLY,
    CHILD_POP,
];

// ACS educational attainment
pub const POP_18_24: &str = "pop_18_24";
pub const BACHELORS_18_24: &str = "bachelors_18_24";
pub const POP_25_PLUS: &str = "pop_25_plus";
pub const BACHELORS_25_PLUS: &str = "bachelors_25_plus";
pub const SHARE_COLLEGE: &str = "share_college";

// ACS economic characteristics
pub const R_LFP: &str = "r_lfp";
pub const R_UNEMP: &str = "r_unemp";
pub const MEDIAN_HH_INC: &str = "median_hh_inc";
pub const HH_INC_PCT: &str = "hh_inc_pct";

pub const ECONOMIC_COLUMNS: [&str; 3] = [R_LFP, R_UNEMP, MEDIAN_HH_INC];

// ACS marital status
pub const PCT_MARRIED: &str = "pct_married";
pub const R_MARRIAGE: &str = "r_marriage";

// SOI measures (raw)
pub const N1: &str = "N1";
pub const PREP: &str = "PREP";
pub const N11070: &str = "N11070";
pub const A11070: &str = "A11070";
pub const N59660: &str = "N59660";
pub const A59660: &str = "A59660";
pub const N10971: &str = "N10971";
pub const A10971: &str = "A10971";

pub const SOI_MEASURES: [&str; 8] = [N1, PREP, N11070, A11070, N59660, A59660, N10971, A10971];

// SOI measures (derived). Prior-year variants carry a suffix such as `_17`.
pub const SHARE_USING_PP: &str = "share_using_pp";
pub const SHARE_CTC: &str = "share_ctc";
pub const MEAN_CTC: &str = "mean_ctc";
pub const TOT_CTC: &str = "tot_ctc";
pub const EIP_AMOUNT: &str = "eip_amount";
pub const MEAN_EIP: &str = "mean_eip";
pub const SHARE_EIP: &str = "share_eip";
pub const SHARE_EITC: &str = "share_eitc_lt_75k";
pub const MEAN_EITC: &str = "mean_eitc";
pub const TOT_EITC: &str = "tot_eitc";

pub const SHARE_CTC_DIF: &str = "share_ctc_dif";
pub const MEAN_CTC_DIF: &str = "mean_ctc_dif";
pub const SHARE_EITC_DIF: &str = "share_eitc_dif";
pub const MEAN_EITC_DIF: &str = "mean_eitc_dif";

pub fn with_suffix(column: &str, suffix: &str) -> String {
    format!("{}{}", column, suffix)
}
