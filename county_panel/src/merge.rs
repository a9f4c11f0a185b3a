use log::debug;
use std::collections::BTreeMap;

use crate::config::PanelError;
use crate::fips::CountyKey;

/// A table with exactly one row per county.
///
/// Rows are kept sorted by key, so iteration and output are deterministic. The
/// one-row-per-county rule is enforced when rows are inserted: every source is
/// checked once, at load time, and joins can never multiply rows.
#[derive(PartialEq, Debug, Clone)]
pub struct CountyTable {
    name: String,
    columns: Vec<String>,
    rows: BTreeMap<CountyKey, Vec<Option<f64>>>,
}

impl CountyTable {
    pub fn new(name: &str, columns: &[&str]) -> CountyTable {
        CountyTable {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: BTreeMap::new(),
        }
    }

    /// Adds the row of a county.
    ///
    /// The values follow the order of the columns. A county that is already in the
    /// table is an error.
    pub fn insert(&mut self, key: CountyKey, values: Vec<Option<f64>>) -> Result<(), PanelError> {
        assert_eq!(
            values.len(),
            self.columns.len(),
            "row width does not match the columns of {}",
            self.name
        );
        if self.rows.contains_key(&key) {
            return Err(PanelError::DuplicateKey {
                table: self.name.clone(),
                key,
            });
        }
        self.rows.insert(key, values);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CountyKey> {
        self.rows.keys()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&CountyKey, &Vec<Option<f64>>)> {
        self.rows.iter()
    }

    pub fn contains(&self, key: &CountyKey) -> bool {
        self.rows.contains_key(key)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn column_index(&self, column: &str) -> Result<usize, PanelError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| PanelError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// The value of one cell. Missing when the county or the value is absent.
    pub fn get(&self, key: &CountyKey, column: &str) -> Result<Option<f64>, PanelError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.get(key).and_then(|row| row[idx]))
    }

    /// All the values of a column, in key order.
    pub fn column(&self, column: &str) -> Result<Vec<Option<f64>>, PanelError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.values().map(|row| row[idx]).collect())
    }

    /// Appends a column whose values are given in key order.
    pub fn add_column(&mut self, column: &str, values: Vec<Option<f64>>) -> Result<(), PanelError> {
        if self.has_column(column) {
            return Err(PanelError::ColumnCollision {
                table: self.name.clone(),
                column: column.to_string(),
            });
        }
        assert_eq!(values.len(), self.rows.len());
        for (row, v) in self.rows.values_mut().zip(values) {
            row.push(v);
        }
        self.columns.push(column.to_string());
        Ok(())
    }

    /// Appends a column computed row by row from other columns.
    ///
    /// The function receives the values of `inputs`, in the same order.
    pub fn derive<F>(&mut self, column: &str, inputs: &[&str], f: F) -> Result<(), PanelError>
    where
        F: Fn(&[Option<f64>]) -> Option<f64>,
    {
        let idxs = inputs
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<usize>, PanelError>>()?;
        let mut args: Vec<Option<f64>> = Vec::with_capacity(idxs.len());
        let values: Vec<Option<f64>> = self
            .rows
            .values()
            .map(|row| {
                args.clear();
                args.extend(idxs.iter().map(|idx| row[*idx]));
                f(&args)
            })
            .collect();
        self.add_column(column, values)
    }

    /// Restricts the table to some columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<CountyTable, PanelError> {
        let idxs = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<usize>, PanelError>>()?;
        let rows = self
            .rows
            .iter()
            .map(|(k, row)| (*k, idxs.iter().map(|idx| row[*idx]).collect()))
            .collect();
        Ok(CountyTable {
            name: self.name.clone(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    /// Left join of `source` onto this table, restricted to `columns` of the source.
    ///
    /// Every county of this table is kept, in the same order; counties missing from the
    /// source get missing values. Counties of the source that are not in this table are
    /// ignored. The result has exactly as many rows as this table.
    pub fn left_join(&self, source: &CountyTable, columns: &[&str]) -> Result<CountyTable, PanelError> {
        let picked = source.select(columns)?;
        for c in picked.columns.iter() {
            if self.has_column(c) {
                return Err(PanelError::ColumnCollision {
                    table: source.name.clone(),
                    column: c.clone(),
                });
            }
        }

        let width = picked.columns.len();
        let mut joined = CountyTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: BTreeMap::new(),
        };
        joined.columns.extend(picked.columns.iter().cloned());

        let mut matched = 0_usize;
        for (key, row) in self.rows.iter() {
            let mut values = row.clone();
            match picked.rows.get(key) {
                Some(extra) => {
                    matched += 1;
                    values.extend(extra.iter().cloned());
                }
                None => values.extend(std::iter::repeat(None).take(width)),
            }
            joined.insert(*key, values)?;
        }
        debug!(
            "left_join: {} <- {}: {} of {} counties matched ({} source rows)",
            self.name,
            source.name,
            matched,
            self.len(),
            source.len()
        );
        assert_eq!(joined.len(), self.len());
        Ok(joined)
    }

    /// Left join of every column of `source`.
    pub fn left_join_all(&self, source: &CountyTable) -> Result<CountyTable, PanelError> {
        let cols: Vec<&str> = source.columns.iter().map(|c| c.as_str()).collect();
        self.left_join(source, &cols)
    }
}
