// store.rs
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::pivot::PivotTable;
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Anything the store can keep: it only needs to report its size.
pub trait Tabular {
    /// `(rows, columns)`
    fn shape(&self) -> (usize, usize);
}

impl Tabular for PivotTable {
    fn shape(&self) -> (usize, usize) {
        PivotTable::shape(self)
    }
}

impl Tabular for Dataset {
    fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }
}

/// What the dashboard keeps: pivots, or plain row previews.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultTable {
    Pivot(PivotTable),
    Rows(Dataset),
}

impl ResultTable {
    /// Text rendering capped at `max_rows` body rows.
    pub fn render(&self, max_rows: usize) -> String {
        match self {
            ResultTable::Pivot(pivot) => pivot.render(max_rows),
            ResultTable::Rows(rows) => rows.head(max_rows).to_string(),
        }
    }
}

impl Tabular for ResultTable {
    fn shape(&self) -> (usize, usize) {
        match self {
            ResultTable::Pivot(pivot) => Tabular::shape(pivot),
            ResultTable::Rows(rows) => Tabular::shape(rows),
        }
    }
}

/// Snapshot taken when a result is stored. Never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMeta {
    pub detail: String,
    pub rows: usize,
    pub cols: usize,
    pub saved_at: NaiveDateTime,
}

impl fmt::Display for StoredMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}x{} | saved {}",
            self.detail,
            self.rows,
            self.cols,
            self.saved_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[derive(Debug, Clone)]
pub struct StoredResult<T> {
    pub table: T,
    pub meta: StoredMeta,
}

/// Session-scoped, in-memory named results, kept in insertion order.
///
/// Names never collide: a taken name gets ` (2)`, ` (3)`, ... appended.
#[derive(Debug, Clone)]
pub struct ResultStore<T> {
    entries: Vec<(String, StoredResult<T>)>,
}

impl<T> Default for ResultStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

fn clean_name(base: &str) -> String {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    SPACES
        .get_or_init(|| Regex::new(r"\s{2,}").unwrap())
        .replace_all(base.trim(), " ")
        .into_owned()
}

impl<T: Tabular> ResultStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&StoredResult<T>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// First free name among `base`, `base (2)`, `base (3)`, ...
    pub fn unique_key(&self, base: &str) -> String {
        let base = clean_name(base);
        if !self.contains(&base) {
            return base;
        }
        let mut i = 2;
        while self.contains(&format!("{} ({})", base, i)) {
            i += 1;
        }
        format!("{} ({})", base, i)
    }

    /// Stores `table` under a unique name derived from `base_name`.
    pub fn insert(&mut self, table: T, base_name: &str, detail: &str) -> String {
        self.insert_at(table, base_name, detail, Local::now().naive_local())
    }

    pub fn insert_at(
        &mut self,
        table: T,
        base_name: &str,
        detail: &str,
        saved_at: NaiveDateTime,
    ) -> String {
        let key = self.unique_key(base_name);
        let (rows, cols) = table.shape();
        let meta = StoredMeta {
            detail: detail.to_string(),
            rows,
            cols,
            saved_at,
        };
        tracing::info!("stored result {:?} ({}x{})", key, rows, cols);
        self.entries.push((key.clone(), StoredResult { table, meta }));
        key
    }

    /// Moves the entry at `old_key` to a unique name derived from `new_name`.
    ///
    /// `old_key` is vacated first, so renaming an entry to its own name keeps
    /// it. The table and metadata move unchanged; the entry goes to the end of
    /// the listing.
    pub fn rename(&mut self, old_key: &str, new_name: &str) -> Result<String> {
        if clean_name(new_name).is_empty() {
            return Err(DashboardError::EmptyName);
        }
        let position = self
            .entries
            .iter()
            .position(|(k, _)| k == old_key)
            .ok_or_else(|| DashboardError::UnknownResult(old_key.to_string()))?;

        let (_, entry) = self.entries.remove(position);
        let new_key = self.unique_key(new_name);
        tracing::info!("renamed stored result {:?} -> {:?}", old_key, new_key);
        self.entries.push((new_key.clone(), entry));
        Ok(new_key)
    }

    /// `(name, metadata)` pairs in insertion order.
    pub fn list(&self) -> Vec<(&str, &StoredMeta)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), &v.meta))
            .collect()
    }
}
