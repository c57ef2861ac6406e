// loader.rs
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use calamine::{open_workbook_auto, Reader};
use std::path::Path;
use std::time::Instant;

/// Reads a `.csv`, `.xlsx` or `.xls` file into a [`Dataset`].
///
/// Headers are trimmed; values are taken as they are. Workbooks load their
/// first sheet.
pub fn load_table(path: &Path) -> Result<Dataset> {
    let started = Instant::now();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" => read_workbook(path)?,
        _ => read_csv(path)?,
    };

    if dataset.is_empty() {
        return Err(DashboardError::EmptyDataset(path.display().to_string()));
    }

    tracing::info!(
        "loaded {} rows x {} columns from {} in {:.3}s",
        dataset.row_count(),
        dataset.column_count(),
        path.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(dataset)
}

fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }

    Ok(Dataset::from_rows(&headers, &rows))
}

fn read_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| DashboardError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::Workbook("workbook has no sheets".to_string()))?
        .map_err(|e| DashboardError::Workbook(e.to_string()))?;

    let mut lines = range.rows();
    let headers: Vec<String> = match lines.next() {
        Some(header) => header.iter().map(|c| c.to_string()).collect(),
        None => return Ok(Dataset::new()),
    };
    let rows: Vec<Vec<String>> = lines
        .map(|line| line.iter().map(|c| c.to_string()).collect())
        .collect();

    Ok(Dataset::from_rows(&headers, &rows))
}
