// dashboard.rs
use crate::analytics::{Preset, PRESETS};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::store::{ResultStore, ResultTable};
use crate::user_interaction::{determine_action_as_number, prompt_yes_no, Prompter};
use crate::wizard::create_custom_pivot;

const RULE: &str = "------------------------------------------------------------";

enum Action {
    Head,
    Preset(Preset),
    CustomPivot,
    StoredResults,
    Exit,
}

/// One interactive session over a loaded dataset. Owns the result store, so
/// everything stored lives exactly as long as the session.
pub struct Dashboard {
    dataset: Dataset,
    store: ResultStore<ResultTable>,
    config: Config,
}

impl Dashboard {
    pub fn new(dataset: Dataset, config: Config) -> Self {
        Self {
            dataset,
            store: ResultStore::new(),
            config,
        }
    }

    pub fn store(&self) -> &ResultStore<ResultTable> {
        &self.store
    }

    fn actions() -> Vec<(String, Action)> {
        let mut actions = vec![("SHOW FIRST N ROWS".to_string(), Action::Head)];
        actions.extend(
            PRESETS
                .iter()
                .map(|p| (p.title().to_uppercase(), Action::Preset(*p))),
        );
        actions.push(("CUSTOM PIVOT".to_string(), Action::CustomPivot));
        actions.push(("STORED RESULTS".to_string(), Action::StoredResults));
        actions.push(("EXIT".to_string(), Action::Exit));
        actions
    }

    /// Count of stored results plus the first few names with their shapes.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            RULE.to_string(),
            format!("Stored results (this session): {}", self.store.len()),
        ];
        if self.store.is_empty() {
            lines.push(" - (none yet)".to_string());
        }
        let max_items = self.config.summary_max_items;
        for (i, (name, meta)) in self.store.list().into_iter().enumerate() {
            if i >= max_items {
                lines.push(format!(
                    " - ...and {} more (use STORED RESULTS)",
                    self.store.len() - max_items
                ));
                break;
            }
            lines.push(format!(" - {}  [{}x{}]", name, meta.rows, meta.cols));
        }
        lines.push(RULE.to_string());
        lines.join("\n")
    }

    /// Menu loop. Returns when the user exits or input runs out; failed
    /// actions are reported and the loop carries on.
    pub fn run<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Result<()> {
        let actions = Self::actions();
        let labels: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();

        loop {
            prompter.show(&self.summary());
            prompter.show("SALES DATA DASHBOARD");
            prompter.list(&labels);

            let choice = match prompter.read_line("Your move, bro (number, name, or q): ") {
                Ok(choice) => choice,
                Err(DashboardError::InputClosed) => return Ok(()),
                Err(e) => return Err(e),
            };
            let choice = choice.trim().to_lowercase();
            if choice == "q" || choice == "@q" {
                prompter.insight("Goodbye.");
                return Ok(());
            }

            let action = match determine_action_as_number(&labels, &choice) {
                Some(n) => &actions[n - 1].1,
                None => {
                    prompter.insight("Dude, that action's a no-go. Give it another whirl, alright?");
                    continue;
                }
            };

            let outcome = match action {
                Action::Head => self.show_head(prompter),
                Action::Preset(preset) => self.run_preset(prompter, *preset),
                Action::CustomPivot => create_custom_pivot(
                    prompter,
                    &self.dataset,
                    &mut self.store,
                    self.config.preview_rows,
                )
                .map(|_| ()),
                Action::StoredResults => self.browse_stored_results(prompter),
                Action::Exit => {
                    prompter.insight("Goodbye.");
                    return Ok(());
                }
            };

            match outcome {
                Ok(()) => {}
                Err(DashboardError::InputClosed) => return Ok(()),
                Err(e) => {
                    tracing::warn!("action failed: {}", e);
                    prompter.insight(&format!("ERROR: {}", e));
                }
            }
        }
    }

    fn show_head<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Result<()> {
        let default_rows = self.config.preview_rows;
        let raw = prompter.read_line(&format!(
            "Show how many rows? (default {}): ",
            default_rows
        ))?;
        let n = raw.trim().parse::<usize>().unwrap_or(default_rows);

        let head = self.dataset.head(n);
        prompter.show(&format!("=== First {} rows ===\n{}", n, head));
        let key = self.store.insert(
            ResultTable::Rows(head),
            &format!("Preview: first {} rows", n),
            "First n rows",
        );
        prompter.insight(&format!("Stored as: {}", key));
        Ok(())
    }

    fn run_preset<P: Prompter + ?Sized>(&mut self, prompter: &mut P, preset: Preset) -> Result<()> {
        let table = preset.run(&self.dataset)?;
        prompter.show(&format!(
            "=== {} ===\n{}",
            preset.title(),
            table.render(self.config.preview_rows)
        ));
        let key = self
            .store
            .insert(ResultTable::Pivot(table), preset.title(), preset.detail());
        prompter.insight(&format!("Stored as: {}", key));
        Ok(())
    }

    /// Lists stored results; one can be viewed and then renamed.
    fn browse_stored_results<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Result<()> {
        if self.store.is_empty() {
            prompter.insight("No stored results yet.");
            return Ok(());
        }

        let names: Vec<String> = self
            .store
            .list()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        let listing: Vec<String> = self
            .store
            .list()
            .iter()
            .enumerate()
            .map(|(i, (name, meta))| format!("{}. {}\n   {}", i + 1, name, meta))
            .collect();
        prompter.show(&format!(
            "================ STORED RESULTS ================\n{}\n================================================",
            listing.join("\n")
        ));

        let raw = prompter.read_line("Enter number to view, or press Enter to go back: ")?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }
        let index = match raw.parse::<usize>() {
            Ok(i) if i >= 1 && i <= names.len() => i - 1,
            _ => {
                prompter.insight("Invalid selection.");
                return Ok(());
            }
        };

        let name = &names[index];
        if let Some(stored) = self.store.get(name) {
            prompter.show(&format!(
                "=== {} ===\n{}",
                name,
                stored.table.render(self.config.preview_rows)
            ));
        }

        if prompt_yes_no(prompter, "Rename this stored result?", false)? {
            let new_name = prompter.read_line("Enter a new name for this stored result: ")?;
            if !new_name.trim().is_empty() {
                let key = self.store.rename(name, &new_name)?;
                prompter.insight(&format!("Stored as: {}", key));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_interaction::ScriptedPrompter;
    use pretty_assertions::assert_eq;

    fn sales() -> Dataset {
        let headers: Vec<String> = ["sales_region", "order_type", "quantity", "sale_price"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = [
            ["East", "Online", "2", "10"],
            ["East", "Online", "1", "5"],
            ["West", "Store", "4", "1"],
        ]
        .iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect();
        Dataset::from_rows(&headers, &rows)
    }

    fn names(dashboard: &Dashboard) -> Vec<String> {
        dashboard
            .store()
            .list()
            .iter()
            .map(|(n, _)| n.to_string())
            .collect()
    }

    #[test]
    fn presets_and_previews_are_stored() {
        let mut dashboard = Dashboard::new(sales(), Config::default());
        let mut prompter = ScriptedPrompter::new(&["2", "1", "2", "1", "", "q"]);
        dashboard.run(&mut prompter).unwrap();

        assert_eq!(
            names(&dashboard),
            vec![
                "Total sales by region & order_type",
                "Preview: first 2 rows",
                "Preview: first 30 rows",
            ]
        );
        let (_, meta) = dashboard.store().list()[1];
        assert_eq!((meta.rows, meta.cols), (2, 4));
    }

    #[test]
    fn failing_preset_reports_and_continues() {
        let mut dashboard = Dashboard::new(sales(), Config::default());
        // unique employees needs employee_name
        let mut prompter = ScriptedPrompter::new(&["9", "exit"]);
        dashboard.run(&mut prompter).unwrap();

        assert!(dashboard.store().is_empty());
        assert!(prompter
            .insights
            .contains(&"ERROR: Missing required columns: employee_name".to_string()));
    }

    #[test]
    fn unknown_choice_reprompts() {
        let mut dashboard = Dashboard::new(sales(), Config::default());
        let mut prompter = ScriptedPrompter::new(&["42", "q"]);
        dashboard.run(&mut prompter).unwrap();
        assert!(prompter.insights[0].contains("no-go"));
    }

    #[test]
    fn custom_pivot_then_rename_from_browser() {
        let mut dashboard = Dashboard::new(sales(), Config::default());
        let mut prompter = ScriptedPrompter::new(&[
            "custom pivot", "1", "1", "3", "", "n", // wizard
            "stored results", "1", "y", "Regional totals", // browse + rename
            "q",
        ]);
        dashboard.run(&mut prompter).unwrap();

        assert_eq!(names(&dashboard), vec!["Regional totals"]);
        let stored = dashboard.store().get("Regional totals").unwrap();
        assert_eq!(stored.meta.detail, "Custom pivot (wizard)");
        match &stored.table {
            ResultTable::Pivot(p) => assert_eq!(p.lookup(&["East"], &["Online"]), Some(25.0)),
            other => panic!("unexpected table: {:?}", other),
        }
    }

    #[test]
    fn wizard_errors_do_not_end_the_session() {
        let mut dashboard = Dashboard::new(sales(), Config::default());
        let mut prompter =
            ScriptedPrompter::new(&["custom pivot", "", "", "1", "median", "q"]);
        dashboard.run(&mut prompter).unwrap();
        assert!(prompter
            .insights
            .iter()
            .any(|m| m.starts_with("ERROR: Unsupported aggregation 'median'")));
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn summary_caps_listed_names() {
        let config = Config {
            summary_max_items: 1,
            ..Config::default()
        };
        let mut dashboard = Dashboard::new(sales(), config);
        let mut prompter = ScriptedPrompter::new(&["2", "2", "2"]);
        dashboard.run(&mut prompter).unwrap();

        let summary = dashboard.summary();
        assert!(summary.contains("Stored results (this session): 3"));
        assert!(summary.contains(" - Total sales by region & order_type  [2x2]"));
        assert!(summary.contains(" - ...and 2 more (use STORED RESULTS)"));
        assert!(!summary.contains("(2)  ["));
    }

    #[test]
    fn empty_store_browse_says_so() {
        let mut dashboard = Dashboard::new(sales(), Config::default());
        let mut prompter = ScriptedPrompter::new(&["stored results"]);
        dashboard.run(&mut prompter).unwrap();
        assert!(prompter.insights.contains(&"No stored results yet.".to_string()));
        assert!(dashboard.summary().contains(" - (none yet)"));
    }
}
