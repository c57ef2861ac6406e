// wizard.rs
use crate::aggregation::{ensure_value_and_agg_compatible, normalize_agg, Resolution};
use crate::catalog::{render_choices, FieldCatalog};
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::picker::{pick_from_numbered_list, pick_multi_from};
use crate::pivot::{build_pivot, PivotTable};
use crate::store::{ResultStore, ResultTable};
use crate::user_interaction::{prompt_yes_no, Prompter};
use std::collections::HashSet;

const RULE: &str = "------------------------------------------------------------";
const MULTI_PROMPT: &str = "Enter the number(s) of your choice(s), separated by commas: ";

/// Fields picked in the first three wizard steps.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSelection {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub value_field: String,
    /// Set when rows and columns used up every field and the value menu
    /// offered the whole catalog again.
    pub value_fallback: bool,
}

/// Everything a finished wizard run produced.
#[derive(Debug, Clone)]
pub struct WizardOutcome {
    pub selection: WizardSelection,
    pub requested_op: String,
    pub resolution: Resolution,
    pub table: PivotTable,
    pub key: String,
}

fn step_header<P: Prompter + ?Sized>(prompter: &mut P, title: &str) {
    prompter.show(&format!("{}\n{}\n{}", RULE, title, RULE));
}

fn describe(fields: &[String]) -> String {
    if fields.is_empty() {
        "[∅]".to_string()
    } else {
        format!("[{}]", fields.join(", "))
    }
}

/// Steps 1 to 3: rows, then columns without the rows, then one value field
/// without either.
pub fn select_fields<P: Prompter + ?Sized>(
    prompter: &mut P,
    fields: &[String],
) -> Result<WizardSelection> {
    step_header(prompter, "STEP 1: Select Row Dimensions");
    let rows_menu = render_choices(fields, &HashSet::new());
    let rows = pick_multi_from(prompter, &rows_menu, MULTI_PROMPT)?;
    prompter.insight(&format!(
        "Rows set to: {}",
        if rows.is_empty() { "(none)".to_string() } else { rows.join(", ") }
    ));

    step_header(prompter, "STEP 2: Select Column Dimensions");
    let mut exclude: HashSet<String> = rows.iter().cloned().collect();
    let cols_menu = render_choices(fields, &exclude);
    let cols = pick_multi_from(prompter, &cols_menu, MULTI_PROMPT)?;
    prompter.insight(&format!(
        "Columns set to: {}",
        if cols.is_empty() { "(none)".to_string() } else { cols.join(", ") }
    ));

    step_header(prompter, "STEP 3: Select Value (single)");
    exclude.extend(cols.iter().cloned());
    let mut value_menu = render_choices(fields, &exclude);
    let value_fallback = value_menu.is_empty();
    if value_fallback {
        prompter.insight(
            "Note: all fields were used in rows/columns; allowing value selection from all fields.",
        );
        value_menu = fields.to_vec();
    }
    let value_field =
        pick_from_numbered_list(prompter, &value_menu, "Enter ONE number for the Value field: ")?;
    prompter.insight(&format!("Value set to: {}", value_field));

    Ok(WizardSelection {
        rows,
        cols,
        value_field,
        value_fallback,
    })
}

/// Runs the custom pivot wizard over `dataset` and files the result in `store`.
///
/// The dataset is scoped into a private copy first; the caller's data never
/// changes.
pub fn create_custom_pivot<P: Prompter + ?Sized>(
    prompter: &mut P,
    dataset: &Dataset,
    store: &mut ResultStore<ResultTable>,
    preview_rows: usize,
) -> Result<WizardOutcome> {
    let FieldCatalog {
        data: mut scoped,
        fields,
    } = FieldCatalog::build(dataset)?;

    prompter.show("CUSTOM PIVOT TABLE GENERATOR (dynamic menus)");
    if fields.is_empty() {
        prompter.insight("None of the known sales fields are in this dataset.");
        return Err(DashboardError::NoChoices("pivot fields".to_string()));
    }

    let selection = select_fields(prompter, &fields)?;

    step_header(prompter, "STEP 4: Aggregation");
    prompter.show(
        "Choose how the values should be summarized:\n \
         - sum   = total\n \
         - mean  = average\n \
         - count = how many\n \
         - max   = highest value\n \
         - min   = lowest value",
    );
    let requested_op =
        normalize_agg(&prompter.read_line("Type one (sum/mean/count/max/min) or press Enter for sum: ")?);

    let resolution =
        ensure_value_and_agg_compatible(&mut scoped, &selection.value_field, &requested_op);
    if let Some(notice) = resolution.notice() {
        prompter.insight(&notice);
        prompter.insight(&format!(
            "Using aggregation '{}' on field '{}'.",
            resolution.effective_op(),
            resolution.effective_field()
        ));
    }

    prompter.insight("Building pivot...");
    let table = build_pivot(
        &scoped,
        &selection.rows,
        &selection.cols,
        resolution.effective_field(),
        resolution.effective_op(),
    )?;

    prompter.show(&format!(
        "=== Custom Pivot ({} of {}) ===\n{}",
        resolution.effective_op(),
        selection.value_field,
        table.render(preview_rows)
    ));

    let default_entry = format!(
        "Custom: {}({}) rows={} cols={}",
        resolution.effective_op(),
        selection.value_field,
        describe(&selection.rows),
        describe(&selection.cols)
    );
    let mut key = store.insert(
        ResultTable::Pivot(table.clone()),
        &default_entry,
        "Custom pivot (wizard)",
    );

    if prompt_yes_no(prompter, "Rename this stored result entry?", false)? {
        let new_name = prompter.read_line("Enter a new name for this stored result: ")?;
        if !new_name.trim().is_empty() {
            key = store.rename(&key, &new_name)?;
        }
    }
    prompter.insight(&format!("Stored as: {}", key));

    Ok(WizardOutcome {
        selection,
        requested_op,
        resolution,
        table,
        key,
    })
}
