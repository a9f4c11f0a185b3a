use crate::columns::with_suffix;
use crate::config::*;
use crate::merge::CountyTable;

/// County-level mean and standard deviation of one variable in one year.
#[derive(PartialEq, Debug, Clone)]
pub struct SummaryRow {
    pub variable: String,
    /// The year, or `difference` for the change between the two years.
    pub period: String,
    pub n: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 in the denominator).
    pub std: Option<f64>,
}

/// Count, mean and sample standard deviation of the non-missing values.
pub fn describe(values: &[Option<f64>]) -> (usize, Option<f64>, Option<f64>) {
    let present: Vec<f64> = values.iter().flatten().cloned().collect();
    let n = present.len();
    if n == 0 {
        return (0, None, None);
    }
    let mean = present.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss: f64 = present.iter().map(|x| (x - mean) * (x - mean)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    } else {
        None
    };
    (n, Some(mean), std)
}

/// Summarizes variables measured in both years.
///
/// Each variable is given by its current-year column name; the prior-year column
/// carries the year suffix. Three rows are produced per variable: current year,
/// prior year and the county-level difference.
pub fn summarize(
    panel: &CountyTable,
    variables: &[String],
    config: &PanelConfig,
) -> Result<Vec<SummaryRow>, PanelError> {
    let prior_sfx = config.year_suffix(config.prior_year);
    let mut res: Vec<SummaryRow> = Vec::new();
    for var in variables.iter() {
        let cur = panel.column(var)?;
        let prior = panel.column(&with_suffix(var, &prior_sfx))?;
        let dif: Vec<Option<f64>> = cur
            .iter()
            .zip(prior.iter())
            .map(|(c, p)| match (c, p) {
                (Some(c), Some(p)) => Some(c - p),
                _ => None,
            })
            .collect();
        for (period, values) in [
            (config.current_year.to_string(), cur),
            (config.prior_year.to_string(), prior),
            ("difference".to_string(), dif),
        ] {
            let (n, mean, std) = describe(&values);
            res.push(SummaryRow {
                variable: var.clone(),
                period,
                n,
                mean,
                std,
            });
        }
    }
    Ok(res)
}
