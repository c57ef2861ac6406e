// dataset.rs
use crate::error::{DashboardError, Result};
use std::fmt;

/// One value of a loaded table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Reads a raw field the way the loaders see it: blank, `NaN` and
    /// infinities are missing, any other `f64` is a number, the rest is text.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            Ok(_) => Cell::Missing,
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    /// Best-effort numeric view of the cell, `None` when it does not convert.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => None,
            },
            Cell::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => Ok(()),
        }
    }
}

/// Prints whole numbers without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: &str, cells: Vec<Cell>) -> Self {
        Self {
            name: name.to_string(),
            cells,
        }
    }

    /// A column is numeric while none of its cells is text.
    pub fn is_numeric(&self) -> bool {
        !self.cells.iter().any(|c| matches!(c, Cell::Text(_)))
    }

    /// Element-wise numeric coercion, unconvertible cells become `None`.
    pub fn to_numeric(&self) -> Vec<Option<f64>> {
        self.cells.iter().map(Cell::as_number).collect()
    }
}

/// Column-oriented in-memory table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from a header and row-major raw strings. Short rows
    /// are padded with missing cells.
    pub fn from_rows(headers: &[String], rows: &[Vec<String>]) -> Self {
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|h| Column::new(h.trim(), Vec::with_capacity(rows.len())))
            .collect();

        for row in rows {
            for (i, column) in columns.iter_mut().enumerate() {
                let cell = row.get(i).map(|raw| Cell::parse(raw)).unwrap_or(Cell::Missing);
                column.cells.push(cell);
            }
        }

        Self {
            columns,
            row_count: rows.len(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Dataset::column`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| DashboardError::UnknownField(name.to_string()))
    }

    /// Fails with every absent name when any of `names` is not a column.
    pub fn check_columns(&self, names: &[&str]) -> Result<()> {
        let mut missing: Vec<String> = names
            .iter()
            .filter(|n| !self.has_column(n))
            .map(|n| n.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort();
            Err(DashboardError::MissingColumns(missing))
        }
    }

    /// Appends a column, replacing any column of the same name.
    pub fn set_column(&mut self, column: Column) {
        debug_assert!(self.columns.is_empty() || column.cells.len() == self.row_count);
        if self.columns.is_empty() {
            self.row_count = column.cells.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == from) {
            column.name = to.to_string();
        }
    }

    /// Element-wise `left * right`, unconvertible cells counting as zero.
    pub fn product_column(&self, left: &str, right: &str, name: &str) -> Result<Column> {
        let left = self.require_column(left)?.to_numeric();
        let right = self.require_column(right)?.to_numeric();
        let cells = left
            .iter()
            .zip(right.iter())
            .map(|(l, r)| Cell::Number(l.unwrap_or(0.0) * r.unwrap_or(0.0)))
            .collect();
        Ok(Column::new(name, cells))
    }

    /// First `n` rows as a new dataset.
    pub fn head(&self, n: usize) -> Dataset {
        let take = n.min(self.row_count);
        Dataset {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(&c.name, c.cells[..take].to_vec()))
                .collect(),
            row_count: take,
        }
    }

    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[index]).collect()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        let body: Vec<Vec<String>> = (0..self.row_count)
            .map(|i| self.row(i).iter().map(|c| c.to_string()).collect())
            .collect();
        crate::user_interaction::write_table(f, &header, &body)?;
        write!(f, "Total rows: {}", self.row_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Dataset {
        let headers = vec!["item".to_string(), "qty".to_string(), "price".to_string()];
        let rows = vec![
            vec!["pizza".to_string(), "2".to_string(), "10".to_string()],
            vec!["shake".to_string(), "".to_string(), "4.5".to_string()],
            vec!["fries".to_string(), "n/a".to_string()],
        ];
        Dataset::from_rows(&headers, &rows)
    }

    #[test]
    fn parses_cells_by_content() {
        assert_eq!(Cell::parse(" 12.5 "), Cell::Number(12.5));
        assert_eq!(Cell::parse("   "), Cell::Missing);
        assert_eq!(Cell::parse("East"), Cell::Text("East".to_string()));
        assert_eq!(Cell::parse("NaN"), Cell::Missing);
        assert_eq!(Cell::parse("-inf"), Cell::Missing);
    }

    #[test]
    fn nan_cells_keep_a_column_numeric() {
        let headers = vec!["sale_price".to_string()];
        let rows = vec![vec!["4.5".to_string()], vec!["NaN".to_string()], vec!["inf".to_string()]];
        let ds = Dataset::from_rows(&headers, &rows);
        let column = ds.column("sale_price").unwrap();
        assert!(column.is_numeric());
        assert_eq!(column.to_numeric(), vec![Some(4.5), None, None]);
    }

    #[test]
    fn short_rows_are_padded_with_missing() {
        let ds = sample();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column("price").unwrap().cells[2], Cell::Missing);
    }

    #[test]
    fn numeric_detection_ignores_missing_cells() {
        let ds = sample();
        assert!(ds.column("price").unwrap().is_numeric());
        assert!(!ds.column("qty").unwrap().is_numeric());
        assert!(!ds.column("item").unwrap().is_numeric());
    }

    #[test]
    fn product_treats_unconvertible_as_zero() {
        let ds = sample();
        let total = ds.product_column("qty", "price", "total").unwrap();
        assert_eq!(
            total.cells,
            vec![Cell::Number(20.0), Cell::Number(0.0), Cell::Number(0.0)]
        );
    }

    #[test]
    fn check_columns_lists_every_missing_name() {
        let ds = sample();
        let err = ds.check_columns(&["state", "item", "region"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing required columns: region, state");
    }

    #[test]
    fn head_caps_at_row_count() {
        let ds = sample();
        assert_eq!(ds.head(2).row_count(), 2);
        assert_eq!(ds.head(10).row_count(), 3);
    }
}
