// pivot.rs
use crate::aggregation::AggFunc;
use crate::dataset::{format_number, Cell, Dataset};
use crate::error::{DashboardError, Result};
use crate::user_interaction::write_table;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One component of a grouping key. Numbers sort before text.
#[derive(Debug, Clone)]
pub enum KeyPart {
    Number(f64),
    Text(String),
}

impl KeyPart {
    fn from_cell(cell: &Cell) -> Option<KeyPart> {
        match cell {
            Cell::Number(n) => Some(KeyPart::Number(*n)),
            Cell::Text(s) => Some(KeyPart::Text(s.clone())),
            Cell::Missing => None,
        }
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyPart {}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::Number(a), KeyPart::Number(b)) => a.total_cmp(b),
            (KeyPart::Number(_), KeyPart::Text(_)) => Ordering::Less,
            (KeyPart::Text(_), KeyPart::Number(_)) => Ordering::Greater,
            (KeyPart::Text(a), KeyPart::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Number(n) => f.write_str(&format_number(*n)),
            KeyPart::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered tuple of field values; empty when the axis has no fields.
pub type GroupKey = Vec<KeyPart>;

/// Cross-tabulation of aggregated values over row and column groupings.
///
/// Cells with no contributing rows are absent rather than zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub row_fields: Vec<String>,
    pub col_fields: Vec<String>,
    pub value_field: String,
    pub op: AggFunc,
    pub row_keys: Vec<GroupKey>,
    pub col_keys: Vec<GroupKey>,
    cells: BTreeMap<(GroupKey, GroupKey), f64>,
}

impl PivotTable {
    /// `(rows, columns)` of the rendered table body.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_keys.len(), self.col_keys.len())
    }

    pub fn get(&self, row: &[KeyPart], col: &[KeyPart]) -> Option<f64> {
        self.cells.get(&(row.to_vec(), col.to_vec())).copied()
    }

    /// Looks a cell up by the printed form of its keys.
    pub fn lookup(&self, row: &[&str], col: &[&str]) -> Option<f64> {
        let matches = |key: &GroupKey, labels: &[&str]| {
            key.len() == labels.len() && key.iter().zip(labels).all(|(k, l)| k.to_string() == *l)
        };
        let row_key = self.row_keys.iter().find(|k| matches(*k, row))?;
        let col_key = self.col_keys.iter().find(|k| matches(*k, col))?;
        self.get(row_key, col_key)
    }

    fn axis_label(&self, key: &GroupKey) -> String {
        if key.is_empty() {
            self.value_field.clone()
        } else {
            key.iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(" / ")
        }
    }

    /// Text grid of at most `max_rows` body rows.
    pub fn render(&self, max_rows: usize) -> String {
        let corner = if self.col_fields.is_empty() {
            self.row_fields.join(" / ")
        } else {
            format!(
                "{} \\ {}",
                self.row_fields.join(" / "),
                self.col_fields.join(" / ")
            )
        };

        let mut header = vec![corner.trim().to_string()];
        header.extend(self.col_keys.iter().map(|k| self.axis_label(k)));

        let body: Vec<Vec<String>> = self
            .row_keys
            .iter()
            .take(max_rows)
            .map(|row| {
                let mut line = vec![self.axis_label(row)];
                line.extend(self.col_keys.iter().map(|col| {
                    self.get(row, col)
                        .map(format_number)
                        .unwrap_or_default()
                }));
                line
            })
            .collect();

        let mut out = String::new();
        let _ = write_table(&mut out, &header, &body);
        if self.row_keys.len() > max_rows {
            out.push_str(&format!("... {} more rows\n", self.row_keys.len() - max_rows));
        }
        out.push_str(&format!("Total rows: {}", self.row_keys.len()));
        out
    }
}

impl fmt::Display for PivotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(usize::MAX))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn group_key(data: &Dataset, fields: &[String], row: usize) -> Result<Option<GroupKey>> {
    let mut key = Vec::with_capacity(fields.len());
    for field in fields {
        let column = data.require_column(field)?;
        match KeyPart::from_cell(&column.cells[row]) {
            Some(part) => key.push(part),
            None => return Ok(None),
        }
    }
    Ok(Some(key))
}

fn reduce(values: &[&Cell], op: AggFunc, field: &str) -> Result<Option<f64>> {
    let present: Vec<&Cell> = values.iter().copied().filter(|c| !c.is_missing()).collect();

    if op.needs_numbers() {
        let mut numbers = Vec::with_capacity(present.len());
        for cell in &present {
            match cell {
                Cell::Number(n) => numbers.push(*n),
                other => {
                    return Err(DashboardError::NonNumericValue {
                        field: field.to_string(),
                        value: other.to_string(),
                        op: op.to_string(),
                    })
                }
            }
        }
        let reduced = match op {
            AggFunc::Sum => Some(numbers.iter().sum()),
            AggFunc::Mean if numbers.is_empty() => None,
            AggFunc::Mean => Some(numbers.iter().sum::<f64>() / numbers.len() as f64),
            AggFunc::Max => numbers.iter().copied().reduce(f64::max),
            AggFunc::Min => numbers.iter().copied().reduce(f64::min),
            _ => None,
        };
        return Ok(reduced);
    }

    match op {
        AggFunc::Count => Ok(Some(present.len() as f64)),
        AggFunc::CountUnique => {
            let distinct: BTreeSet<KeyPart> =
                present.iter().filter_map(|c| KeyPart::from_cell(c)).collect();
            Ok(Some(distinct.len() as f64))
        }
        _ => Ok(None),
    }
}

/// Groups `data` by `rows` × `cols` and reduces `value_field` with `op` per cell.
///
/// Either axis may be empty, which collapses it into a single implicit group.
/// Rows whose grouping values are missing are left out. Results are rounded to
/// two decimals.
pub fn build_pivot(
    data: &Dataset,
    rows: &[String],
    cols: &[String],
    value_field: &str,
    op: &str,
) -> Result<PivotTable> {
    let op: AggFunc = op.parse()?;
    let values = data.require_column(value_field)?;
    for field in rows.iter().chain(cols.iter()) {
        data.require_column(field)?;
    }

    let mut buckets: BTreeMap<(GroupKey, GroupKey), Vec<&Cell>> = BTreeMap::new();
    let mut row_keys: BTreeSet<GroupKey> = BTreeSet::new();
    let mut col_keys: BTreeSet<GroupKey> = BTreeSet::new();

    for i in 0..data.row_count() {
        let (row_key, col_key) = match (group_key(data, rows, i)?, group_key(data, cols, i)?) {
            (Some(r), Some(c)) => (r, c),
            _ => continue,
        };
        row_keys.insert(row_key.clone());
        col_keys.insert(col_key.clone());
        buckets
            .entry((row_key, col_key))
            .or_default()
            .push(&values.cells[i]);
    }

    let mut cells = BTreeMap::new();
    for (key, bucket) in buckets {
        if let Some(value) = reduce(&bucket, op, value_field)? {
            cells.insert(key, round2(value));
        }
    }

    tracing::debug!(
        "pivot {}({}) over {} rows -> {}x{}",
        op,
        value_field,
        data.row_count(),
        row_keys.len(),
        col_keys.len()
    );

    Ok(PivotTable {
        row_fields: rows.to_vec(),
        col_fields: cols.to_vec(),
        value_field: value_field.to_string(),
        op,
        row_keys: row_keys.into_iter().collect(),
        col_keys: col_keys.into_iter().collect(),
        cells,
    })
}

/// Column-axis label used when several value fields sit side by side.
pub const VALUES_AXIS: &str = "value";

/// Reduces each of `value_fields` with `op` over the `rows` grouping and lays
/// the results out side by side, one column per value field.
pub fn build_value_pivot(
    data: &Dataset,
    rows: &[String],
    value_fields: &[String],
    op: &str,
) -> Result<PivotTable> {
    let op: AggFunc = op.parse()?;
    let mut row_keys: BTreeSet<GroupKey> = BTreeSet::new();
    let mut col_keys = Vec::with_capacity(value_fields.len());
    let mut cells = BTreeMap::new();

    for field in value_fields {
        let single = build_pivot(data, rows, &[], field, op.as_str())?;
        let col_key = vec![KeyPart::Text(field.clone())];
        row_keys.extend(single.row_keys);
        for ((row_key, _), value) in single.cells {
            cells.insert((row_key, col_key.clone()), value);
        }
        col_keys.push(col_key);
    }

    Ok(PivotTable {
        row_fields: rows.to_vec(),
        col_fields: vec![VALUES_AXIS.to_string()],
        value_field: value_fields.join(", "),
        op,
        row_keys: row_keys.into_iter().collect(),
        col_keys,
        cells,
    })
}
