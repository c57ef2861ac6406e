// analytics.rs
use crate::catalog::TOTAL_SALES;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::pivot::{build_pivot, build_value_pivot, PivotTable};

/// A canned pivot the dashboard menu offers next to the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    TotalSalesByRegionType,
    AvgPriceByRegionStateType,
    SalesByStateCustomerType,
    QtyAndSalesByRegionProduct,
    QtyAndSalesByCustomerType,
    MaxPriceByCategory,
    MinPriceByCategory,
    UniqueEmployeesByRegion,
}

pub const PRESETS: [Preset; 8] = [
    Preset::TotalSalesByRegionType,
    Preset::AvgPriceByRegionStateType,
    Preset::SalesByStateCustomerType,
    Preset::QtyAndSalesByRegionProduct,
    Preset::QtyAndSalesByCustomerType,
    Preset::MaxPriceByCategory,
    Preset::MinPriceByCategory,
    Preset::UniqueEmployeesByRegion,
];

struct PresetSpec {
    title: &'static str,
    detail: &'static str,
    rows: &'static [&'static str],
    cols: &'static [&'static str],
    /// One field gives a plain pivot; several sit side by side as columns.
    values: &'static [&'static str],
    op: &'static str,
}

impl Preset {
    fn spec(&self) -> PresetSpec {
        match self {
            Preset::TotalSalesByRegionType => PresetSpec {
                title: "Total sales by region & order_type",
                detail: "Pivot: sum(total_sales)",
                rows: &["sales_region"],
                cols: &["order_type"],
                values: &[TOTAL_SALES],
                op: "sum",
            },
            Preset::AvgPriceByRegionStateType => PresetSpec {
                title: "Average sale_price by region x state x order_type",
                detail: "Pivot: mean(sale_price)",
                rows: &["sales_region"],
                cols: &["state", "order_type"],
                values: &["sale_price"],
                op: "mean",
            },
            Preset::SalesByStateCustomerType => PresetSpec {
                title: "Sales by customer type & order type by state",
                detail: "Pivot: sum(total_sales)",
                rows: &["state"],
                cols: &["customer_type", "order_type"],
                values: &[TOTAL_SALES],
                op: "sum",
            },
            Preset::QtyAndSalesByRegionProduct => PresetSpec {
                title: "Total quantity & total sales by region/product",
                detail: "Pivot: sum(quantity, total_sales)",
                rows: &["sales_region", "product"],
                cols: &[],
                values: &["quantity", TOTAL_SALES],
                op: "sum",
            },
            Preset::QtyAndSalesByCustomerType => PresetSpec {
                title: "Total quantity & total sales by customer type",
                detail: "Pivot: sum(quantity, total_sales)",
                rows: &["customer_type"],
                cols: &[],
                values: &["quantity", TOTAL_SALES],
                op: "sum",
            },
            Preset::MaxPriceByCategory => PresetSpec {
                title: "Max unit price by category",
                detail: "Pivot: max(sale_price)",
                rows: &["product_category"],
                cols: &[],
                values: &["sale_price"],
                op: "max",
            },
            Preset::MinPriceByCategory => PresetSpec {
                title: "Min unit price by category",
                detail: "Pivot: min(sale_price)",
                rows: &["product_category"],
                cols: &[],
                values: &["sale_price"],
                op: "min",
            },
            Preset::UniqueEmployeesByRegion => PresetSpec {
                title: "Number of unique employees by region",
                detail: "Pivot: nunique(employee_name)",
                rows: &["sales_region"],
                cols: &[],
                values: &["employee_name"],
                op: "nunique",
            },
        }
    }

    pub fn title(&self) -> &'static str {
        self.spec().title
    }

    pub fn detail(&self) -> &'static str {
        self.spec().detail
    }

    /// Runs the preset. Every source column has to be present.
    pub fn run(&self, dataset: &Dataset) -> Result<PivotTable> {
        let spec = self.spec();

        let derives_total = spec.values.contains(&TOTAL_SALES);
        let mut needed: Vec<&str> = spec
            .rows
            .iter()
            .chain(spec.cols.iter())
            .chain(spec.values.iter().filter(|v| **v != TOTAL_SALES))
            .copied()
            .collect();
        if derives_total {
            needed.extend(["quantity", "sale_price"]);
        }
        needed.sort_unstable();
        needed.dedup();
        dataset.check_columns(&needed)?;

        let data = if derives_total {
            with_total_sales(dataset)?
        } else {
            dataset.clone()
        };

        let to_owned = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        match spec.values {
            [value] => build_pivot(
                &data,
                &to_owned(spec.rows),
                &to_owned(spec.cols),
                value,
                spec.op,
            ),
            values => build_value_pivot(&data, &to_owned(spec.rows), &to_owned(values), spec.op),
        }
    }
}

/// Copy of `dataset` with `total_sales = quantity * sale_price`.
fn with_total_sales(dataset: &Dataset) -> Result<Dataset> {
    let mut data = dataset.clone();
    let total = data.product_column("quantity", "sale_price", TOTAL_SALES)?;
    data.set_column(total);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use pretty_assertions::assert_eq;

    fn sales() -> Dataset {
        let headers: Vec<String> = [
            "sales_region",
            "order_type",
            "state",
            "customer_type",
            "product_category",
            "product",
            "employee_name",
            "quantity",
            "sale_price",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let rows: Vec<Vec<String>> = [
            ["East", "Online", "NY", "Retail", "Tools", "Hammer", "Ann", "2", "10"],
            ["East", "Online", "NY", "Business", "Tools", "Hammer", "Bo", "1", "5"],
            ["East", "Store", "MA", "Retail", "Toys", "Kite", "Ann", "3", "4"],
            ["West", "Store", "CA", "Retail", "Toys", "Kite", "Cy", "1", "20"],
        ]
        .iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect();
        Dataset::from_rows(&headers, &rows)
    }

    #[test]
    fn total_sales_by_region_and_type() {
        let table = Preset::TotalSalesByRegionType.run(&sales()).unwrap();
        assert_eq!(table.lookup(&["East"], &["Online"]), Some(25.0));
        assert_eq!(table.lookup(&["East"], &["Store"]), Some(12.0));
        assert_eq!(table.lookup(&["West"], &["Store"]), Some(20.0));
    }

    #[test]
    fn average_price_over_two_column_levels() {
        let table = Preset::AvgPriceByRegionStateType.run(&sales()).unwrap();
        assert_eq!(table.lookup(&["East"], &["NY", "Online"]), Some(7.5));
        assert_eq!(table.shape(), (2, 3));
    }

    #[test]
    fn sales_by_state_customer_and_order_type() {
        let table = Preset::SalesByStateCustomerType.run(&sales()).unwrap();
        assert_eq!(table.lookup(&["NY"], &["Business", "Online"]), Some(5.0));
        assert_eq!(table.lookup(&["NY"], &["Retail", "Online"]), Some(20.0));
    }

    #[test]
    fn quantity_and_sales_by_region_and_product() {
        let table = Preset::QtyAndSalesByRegionProduct.run(&sales()).unwrap();
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.lookup(&["East", "Hammer"], &["quantity"]), Some(3.0));
        assert_eq!(table.lookup(&["East", "Hammer"], &["total_sales"]), Some(25.0));
        assert_eq!(table.lookup(&["West", "Kite"], &["total_sales"]), Some(20.0));
    }

    #[test]
    fn quantity_and_sales_by_customer_type() {
        let table = Preset::QtyAndSalesByCustomerType.run(&sales()).unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.lookup(&["Business"], &["quantity"]), Some(1.0));
        assert_eq!(table.lookup(&["Retail"], &["quantity"]), Some(6.0));
        assert_eq!(table.lookup(&["Retail"], &["total_sales"]), Some(52.0));
    }

    #[test]
    fn quantity_presets_name_missing_columns_once() {
        let headers = vec!["customer_type".to_string(), "sale_price".to_string()];
        let ds = Dataset::from_rows(&headers, &[vec!["Retail".to_string(), "3".to_string()]]);
        let err = Preset::QtyAndSalesByCustomerType.run(&ds).unwrap_err();
        assert_eq!(err.to_string(), "Missing required columns: quantity");
    }

    #[test]
    fn max_min_and_unique_counts() {
        let ds = sales();
        let max = Preset::MaxPriceByCategory.run(&ds).unwrap();
        let min = Preset::MinPriceByCategory.run(&ds).unwrap();
        let unique = Preset::UniqueEmployeesByRegion.run(&ds).unwrap();
        assert_eq!(max.lookup(&["Toys"], &[]), Some(20.0));
        assert_eq!(min.lookup(&["Toys"], &[]), Some(4.0));
        assert_eq!(unique.lookup(&["East"], &[]), Some(2.0));
    }

    #[test]
    fn missing_columns_are_named() {
        let headers = vec!["sales_region".to_string()];
        let ds = Dataset::from_rows(&headers, &[vec!["East".to_string()]]);
        let err = Preset::TotalSalesByRegionType.run(&ds).unwrap_err();
        match err {
            DashboardError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["order_type", "quantity", "sale_price"])
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn every_preset_has_a_title() {
        for preset in PRESETS {
            assert!(!preset.title().is_empty());
            assert!(preset.detail().starts_with("Pivot: "));
        }
    }
}
