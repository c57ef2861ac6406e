// catalog.rs
use crate::dataset::Dataset;
use crate::error::Result;
use std::collections::HashSet;

/// Fields the pivot wizard knows about, in the order its menus list them.
pub const CANDIDATE_FIELDS: [&str; 16] = [
    "order_number",
    "employee_id",
    "employee_name",
    "job_title",
    "sales_region",
    "order_date",
    "order_type",
    "customer_type",
    "customer_name",
    "state",
    "product_category",
    "product_number",
    "product",
    "quantity",
    "sale_price",
    "total_sales",
];

/// Alternate column names some exports use, mapped to the names above.
pub const ALIASES: [(&str, &str); 6] = [
    ("customer_state", "state"),
    ("produce_name", "product"),
    ("product_name", "product"),
    ("unit_price", "sale_price"),
    ("price", "sale_price"),
    ("qty", "quantity"),
];

pub const TOTAL_SALES: &str = "total_sales";
const QUANTITY: &str = "quantity";
const SALE_PRICE: &str = "sale_price";

/// The wizard's private working copy of the data plus the fields it offers.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    pub data: Dataset,
    pub fields: Vec<String>,
}

impl FieldCatalog {
    /// Scopes `dataset` for the wizard. The caller's dataset is never touched:
    /// aliases and the derived `total_sales` column only land in the copy.
    pub fn build(dataset: &Dataset) -> Result<Self> {
        let mut data = dataset.clone();
        map_aliases(&mut data);

        if data.has_column(QUANTITY) && data.has_column(SALE_PRICE) && !data.has_column(TOTAL_SALES)
        {
            let total = data.product_column(QUANTITY, SALE_PRICE, TOTAL_SALES)?;
            data.set_column(total);
            tracing::debug!("derived {} from {} x {}", TOTAL_SALES, QUANTITY, SALE_PRICE);
        }

        let fields = CANDIDATE_FIELDS
            .iter()
            .filter(|f| data.has_column(f))
            .map(|f| f.to_string())
            .collect();

        Ok(Self { data, fields })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Renames aliased columns whose canonical name is not already taken.
fn map_aliases(data: &mut Dataset) {
    let mut taken: HashSet<String> = data.column_names().iter().map(|c| c.to_string()).collect();
    for (alias, target) in ALIASES.iter() {
        if taken.contains(*alias) && !taken.contains(*target) {
            data.rename_column(alias, target);
            taken.remove(*alias);
            taken.insert(target.to_string());
            tracing::debug!("mapped column {} -> {}", alias, target);
        }
    }
}

/// `fields` minus anything in `exclude`, original order kept.
pub fn render_choices(fields: &[String], exclude: &HashSet<String>) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !exclude.contains(f.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;
    use pretty_assertions::assert_eq;

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect();
        Dataset::from_rows(&headers, &rows)
    }

    #[test]
    fn catalog_follows_priority_order_not_column_order() {
        let ds = dataset(
            &["product", "state", "notes", "employee_name", "order_type"],
            &[&["Widget", "OH", "x", "Ann", "Online"]],
        );
        let catalog = FieldCatalog::build(&ds).unwrap();
        assert_eq!(
            catalog.fields,
            vec!["employee_name", "order_type", "state", "product"]
        );
    }

    #[test]
    fn total_sales_is_derived_once() {
        let ds = dataset(
            &["sale_price", "quantity", "state"],
            &[&["10", "2", "OH"], &["5", "oops", "TX"]],
        );
        let catalog = FieldCatalog::build(&ds).unwrap();
        assert_eq!(catalog.fields, vec!["state", "quantity", "sale_price", "total_sales"]);
        assert_eq!(
            catalog.data.column(TOTAL_SALES).unwrap().cells,
            vec![Cell::Number(20.0), Cell::Number(0.0)]
        );
        assert!(!ds.has_column(TOTAL_SALES));
    }

    #[test]
    fn existing_total_sales_is_not_recomputed() {
        let ds = dataset(
            &["quantity", "sale_price", "total_sales"],
            &[&["2", "10", "999"]],
        );
        let catalog = FieldCatalog::build(&ds).unwrap();
        assert_eq!(
            catalog.fields.iter().filter(|f| *f == TOTAL_SALES).count(),
            1
        );
        assert_eq!(
            catalog.data.column(TOTAL_SALES).unwrap().cells,
            vec![Cell::Number(999.0)]
        );
    }

    #[test]
    fn aliases_map_only_when_target_is_free() {
        let ds = dataset(
            &["qty", "unit_price", "price", "customer_state", "state"],
            &[&["3", "4", "9", "OH", "TX"]],
        );
        let catalog = FieldCatalog::build(&ds).unwrap();
        assert_eq!(
            catalog.fields,
            vec!["state", "quantity", "sale_price", "total_sales"]
        );
        assert_eq!(
            catalog.data.column(TOTAL_SALES).unwrap().cells,
            vec![Cell::Number(12.0)]
        );
        assert!(catalog.data.has_column("customer_state"));
        assert!(catalog.data.has_column("price"));
    }

    #[test]
    fn empty_dataset_gives_empty_catalog() {
        let catalog = FieldCatalog::build(&Dataset::new()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn render_choices_keeps_order() {
        let fields: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let exclude: HashSet<String> = ["c", "a", "zz"].iter().map(|s| s.to_string()).collect();
        assert_eq!(render_choices(&fields, &exclude), vec!["b", "d"]);
        assert_eq!(render_choices(&fields, &HashSet::new()), fields);
    }
}
