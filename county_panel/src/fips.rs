use std::fmt::Display;

use crate::config::PanelError;

const STATE_WIDTH: usize = 2;
const COUNTY_WIDTH: usize = 3;
const KEY_WIDTH: usize = STATE_WIDTH + COUNTY_WIDTH;

/// A five digit county identifier: two digits of state FIPS followed by three
/// digits of county FIPS.
///
/// It is stored as an integer and always displayed zero-padded, so `1003`
/// prints as `01003`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CountyKey(u32);

/// Counties whose definitions changed between 2017 and 2021.
///
/// Alaska split Valdez-Cordova (02261) and Connecticut replaced its counties with
/// planning regions (09110 to 09190). SOI follows the new definitions while the other
/// sources do not, so these keys are dropped from every panel.
pub const INCOMPATIBLE_COUNTIES: [CountyKey; 10] = [
    CountyKey(2261),
    CountyKey(9110),
    CountyKey(9120),
    CountyKey(9130),
    CountyKey(9140),
    CountyKey(9150),
    CountyKey(9160),
    CountyKey(9170),
    CountyKey(9180),
    CountyKey(9190),
];

impl CountyKey {
    /// Builds a key from separate state and county codes.
    ///
    /// ```
    /// use county_panel::CountyKey;
    ///
    /// let key = CountyKey::from_parts("1", "3")?;
    /// assert_eq!(key.to_string(), "01003");
    /// # Ok::<(), county_panel::PanelError>(())
    /// ```
    pub fn from_parts(state: &str, county: &str) -> Result<CountyKey, PanelError> {
        let s = pad_digits(state, STATE_WIDTH)?;
        let c = pad_digits(county, COUNTY_WIDTH)?;
        CountyKey::parse(&format!("{}{}", s, c))
    }

    /// Parses a combined five digit code, with or without its leading zeros.
    pub fn parse(code: &str) -> Result<CountyKey, PanelError> {
        let padded = pad_digits(code, KEY_WIDTH)?;
        padded
            .parse::<u32>()
            .map(CountyKey)
            .map_err(|_| PanelError::InvalidFips {
                value: code.to_string(),
                width: KEY_WIDTH,
            })
    }

    /// Extracts the key from a census geography label such as `0500000US01003`.
    pub fn from_geo_label(label: &str) -> Result<CountyKey, PanelError> {
        let trimmed = label.trim();
        let chars: Vec<char> = trimmed.chars().collect();
        if chars.len() < KEY_WIDTH {
            return Err(PanelError::InvalidGeoLabel(label.to_string()));
        }
        let tail: String = chars[chars.len() - KEY_WIDTH..].iter().collect();
        if !tail.chars().all(|c| c.is_ascii_digit()) {
            return Err(PanelError::InvalidGeoLabel(label.to_string()));
        }
        CountyKey::parse(&tail)
    }

    /// The two digit state part, zero-padded.
    pub fn state(&self) -> String {
        format!("{:02}", self.0 / 1000)
    }

    pub fn is_incompatible(&self) -> bool {
        INCOMPATIBLE_COUNTIES.contains(self)
    }
}

impl Display for CountyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// Zero-pads a code to a fixed width.
///
/// Accepts text with or without padding and integral floats as they come out of
/// spreadsheets (`6.0`). Anything with more significant digits than the width is
/// rejected instead of truncated.
fn pad_digits(value: &str, width: usize) -> Result<String, PanelError> {
    let invalid = || PanelError::InvalidFips {
        value: value.to_string(),
        width,
    };
    let trimmed = value.trim();
    let integral = match trimmed.split_once('.') {
        Some((int_part, frac)) if frac.chars().all(|c| c == '0') => int_part,
        Some(_) => return Err(invalid()),
        None => trimmed,
    };
    if integral.is_empty() || !integral.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let significant = integral.trim_start_matches('0');
    if significant.len() > width {
        return Err(invalid());
    }
    Ok(format!("{:0>width$}", significant, width = width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_state_and_county() {
        assert_eq!(CountyKey::from_parts("1", "3").unwrap().to_string(), "01003");
        assert_eq!(CountyKey::from_parts("06", "3").unwrap().to_string(), "06003");
        assert_eq!(CountyKey::from_parts("06", "037").unwrap(), CountyKey(6037));
    }

    #[test]
    fn accepts_spreadsheet_floats() {
        assert_eq!(
            CountyKey::from_parts("48.0", "201.0").unwrap().to_string(),
            "48201"
        );
        assert_eq!(CountyKey::parse(" 1001 ").unwrap().to_string(), "01001");
    }

    #[test]
    fn rejects_values_that_do_not_fit() {
        assert_eq!(
            CountyKey::from_parts("123", "1"),
            Err(PanelError::InvalidFips {
                value: "123".to_string(),
                width: 2
            })
        );
        assert!(CountyKey::from_parts("01", "1001").is_err());
        assert!(CountyKey::from_parts("", "001").is_err());
        assert!(CountyKey::from_parts("AK", "001").is_err());
        assert!(CountyKey::from_parts("1.5", "001").is_err());
        assert!(CountyKey::from_parts("-1", "001").is_err());
        assert!(CountyKey::parse("123456").is_err());
    }

    #[test]
    fn extra_leading_zeros_are_not_significant() {
        assert_eq!(CountyKey::from_parts("0001", "0003").unwrap().to_string(), "01003");
    }

    #[test]
    fn keys_are_always_five_wide() {
        for (s, c) in [("0", "0"), ("1", "1"), ("56", "999"), ("9", "45")] {
            let k = CountyKey::from_parts(s, c).unwrap();
            assert_eq!(k.to_string().len(), 5);
        }
    }

    #[test]
    fn reads_census_geography_labels() {
        let k = CountyKey::from_geo_label("0500000US01003").unwrap();
        assert_eq!(k.to_string(), "01003");
        assert_eq!(k.state(), "01");
        assert!(CountyKey::from_geo_label("US01").is_err());
        assert!(CountyKey::from_geo_label("0500000US0100X").is_err());
    }

    #[test]
    fn exclusion_list() {
        assert!(CountyKey::parse("02261").unwrap().is_incompatible());
        assert!(CountyKey::parse("9110").unwrap().is_incompatible());
        assert!(!CountyKey::parse("09001").unwrap().is_incompatible());
    }
}
