// aggregation.rs
use crate::dataset::{Cell, Column, Dataset};
use crate::error::DashboardError;
use std::fmt;
use std::str::FromStr;

/// Reductions the pivot builder knows how to apply to a cell's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Sum,
    Mean,
    Count,
    Max,
    Min,
    /// Distinct non-missing values. Used by the preset analytics only.
    CountUnique,
}

impl AggFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Count => "count",
            AggFunc::Max => "max",
            AggFunc::Min => "min",
            AggFunc::CountUnique => "nunique",
        }
    }

    pub fn needs_numbers(&self) -> bool {
        matches!(
            self,
            AggFunc::Sum | AggFunc::Mean | AggFunc::Max | AggFunc::Min
        )
    }
}

impl FromStr for AggFunc {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(AggFunc::Sum),
            "mean" => Ok(AggFunc::Mean),
            "count" => Ok(AggFunc::Count),
            "max" => Ok(AggFunc::Max),
            "min" => Ok(AggFunc::Min),
            "nunique" => Ok(AggFunc::CountUnique),
            other => Err(DashboardError::UnsupportedAggregation(other.to_string())),
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregations that only make sense over numbers (`avg` included, it is
/// usually normalized away before it gets here).
const NUMERIC_AGGS: [&str; 5] = ["sum", "mean", "avg", "max", "min"];

/// Cleans up a typed aggregation keyword: blank means `sum`, `avg` means
/// `mean`, anything else passes through for the pivot builder to judge.
pub fn normalize_agg(raw: &str) -> String {
    let op = raw.trim().to_lowercase();
    match op.as_str() {
        "" => "sum".to_string(),
        "avg" => "mean".to_string(),
        _ => op,
    }
}

/// How the value field and aggregation were reconciled.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing to adjust.
    Unchanged { field: String, op: String },
    /// The text column was coerced into a derived numeric column.
    Coerced {
        source: String,
        field: String,
        op: String,
    },
    /// Nothing in the column looked like a number, so it is counted instead.
    FellBackToCount { field: String },
}

impl Resolution {
    pub fn effective_field(&self) -> &str {
        match self {
            Resolution::Unchanged { field, .. }
            | Resolution::Coerced { field, .. }
            | Resolution::FellBackToCount { field } => field,
        }
    }

    pub fn effective_op(&self) -> &str {
        match self {
            Resolution::Unchanged { op, .. } | Resolution::Coerced { op, .. } => op,
            Resolution::FellBackToCount { .. } => "count",
        }
    }

    /// Message the user has to see whenever the request was altered.
    pub fn notice(&self) -> Option<String> {
        match self {
            Resolution::Unchanged { .. } => None,
            Resolution::Coerced { source, op, .. } => {
                Some(format!("Info: Coerced '{}' to numeric for '{}'.", source, op))
            }
            Resolution::FellBackToCount { field } => Some(format!(
                "Note: '{}' is non-numeric; switching aggregation to 'count'.",
                field
            )),
        }
    }
}

/// Name of the derived column holding the numeric view of `field`.
pub fn coerced_field_name(field: &str) -> String {
    format!("__num__{}", field)
}

/// Makes sure `op` can run over `field`.
///
/// Numeric aggregations over a text column first try to coerce the column:
/// when anything converts, the converted values (non-numbers as 0) go into a
/// derived column of `data`; when nothing converts the aggregation becomes
/// `count` over the original column.
pub fn ensure_value_and_agg_compatible(data: &mut Dataset, field: &str, op: &str) -> Resolution {
    let unchanged = || Resolution::Unchanged {
        field: field.to_string(),
        op: op.to_string(),
    };

    let column = match data.column(field) {
        Some(column) => column,
        None => return unchanged(),
    };

    if !NUMERIC_AGGS.contains(&op) || column.is_numeric() {
        return unchanged();
    }

    let coerced = column.to_numeric();
    if coerced.iter().any(Option::is_some) {
        let name = coerced_field_name(field);
        let cells = coerced
            .into_iter()
            .map(|v| Cell::Number(v.unwrap_or(0.0)))
            .collect();
        data.set_column(Column::new(&name, cells));
        tracing::info!("coerced {} into {} for {}", field, name, op);
        Resolution::Coerced {
            source: field.to_string(),
            field: name,
            op: op.to_string(),
        }
    } else {
        tracing::info!("{} has no numeric values, counting instead of {}", field, op);
        Resolution::FellBackToCount {
            field: field.to_string(),
        }
    }
}
