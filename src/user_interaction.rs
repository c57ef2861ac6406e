// user_interaction.rs
use crate::error::{DashboardError, Result};
use fuzzywuzzy::fuzz;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fmt;

/// Where the dashboard reads answers from and writes messages to.
///
/// Every wizard step talks to the user through this trait, so a session can
/// be driven by the terminal or by a canned script.
pub trait Prompter {
    /// Reads one line. End of input is reported as [`DashboardError::InputClosed`].
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// A short informational message.
    fn insight(&mut self, message: &str);

    /// A block of plain text: menus, tables, banners.
    fn show(&mut self, text: &str);

    fn list(&mut self, options: &[&str]) {
        let text = format_list(options);
        self.show(&text);
    }
}

/// Rustyline-backed prompter, styled like the rest of the bro family.
pub struct TerminalPrompter {
    editor: DefaultEditor,
}

impl TerminalPrompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| {
            DashboardError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to initialize editor: {}", e),
            ))
        })?;
        Ok(Self { editor })
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        // ANSI escape codes for styling
        let orange = "\x1b[0;38;5;208m";
        let reset = "\x1b[0m";

        let custom_prompt = format!("  {}@LILbro: {}{}", orange, prompt, reset);

        match self.editor.readline(&custom_prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Input interrupted or end of file reached.");
                Err(DashboardError::InputClosed)
            }
            Err(err) => {
                tracing::warn!("readline failed: {:?}", err);
                Err(DashboardError::InputClosed)
            }
        }
    }

    fn insight(&mut self, message: &str) {
        print_insight_level_2(message);
    }

    fn show(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Prompter fed from a fixed list of answers. Records everything it shows.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub prompts: Vec<String>,
    pub insights: Vec<String>,
    pub shown: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
            insights: Vec::new(),
            shown: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(DashboardError::InputClosed)
    }

    fn insight(&mut self, message: &str) {
        self.insights.push(message.to_string());
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }
}

/// Prints a message in bold orange font.
pub fn print_insight(message: &str) {
    let bold_orange = "\x1b[1;38;5;208m";
    let reset = "\x1b[0m";

    println!("{}@BIGBro: {}{}", bold_orange, message, reset);
}

/// Prints a message in orange font, indented one level.
pub fn print_insight_level_2(message: &str) {
    let orange = "\x1b[0;38;5;208m";
    let reset = "\x1b[0m";

    println!("  {}@LILBro: {}{}", orange, message, reset);
}

/// Numbered menu lines, indices padded to the widest one.
pub fn format_list(options: &[&str]) -> String {
    let max_digits = options.len().to_string().len();

    options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let padded_index = format!("{:width$}:", index + 1, width = max_digits);
            format!("  {} {}", padded_index, option)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves a menu choice typed as a number or as (roughly) the option text.
/// Returns the 1-based option number.
pub fn determine_action_as_number(menu_options: &[&str], choice: &str) -> Option<usize> {
    let choice = choice.trim().to_lowercase();
    if choice.is_empty() {
        return None;
    }

    // Check for direct numeric input
    if let Ok(index) = choice.parse::<usize>() {
        return if index > 0 && index <= menu_options.len() {
            Some(index)
        } else {
            None
        };
    }

    // If no direct numeric input, use fuzzy matching
    let (best_match_index, best_score) = menu_options
        .iter()
        .enumerate()
        .map(|(index, option)| (index + 1, fuzz::ratio(&choice, &option.to_lowercase())))
        .max_by_key(|&(_, score)| score)
        .unwrap_or((0, 0));

    if best_match_index > 0 && best_score > 60 {
        Some(best_match_index)
    } else {
        None
    }
}

/// Asks a yes/no question until it gets an answer; Enter picks `default`.
pub fn prompt_yes_no<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: bool,
) -> Result<bool> {
    let yn = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        let answer = prompter
            .read_line(&format!("{} {} ", message, yn))?
            .trim()
            .to_lowercase();
        match answer.as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => prompter.insight("Please answer y or n."),
        }
    }
}

/// Writes a pipe-delimited grid with a dashed rule under the header:
///
/// ```text
/// |id |item      |calorie_count |
/// -------------------------------
/// |1  |pizza     |500           |
/// ```
pub fn write_table<W: fmt::Write>(
    out: &mut W,
    header: &[String],
    rows: &[Vec<String>],
) -> fmt::Result {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(value.chars().count());
            }
        }
    }

    let render = |values: &[String]| -> String {
        let mut line = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let value = values.get(i).map(String::as_str).unwrap_or("");
            line.push_str(&format!("{:<width$}|", value, width = width + 1));
        }
        line
    };

    let header_line = render(header);
    writeln!(out, "{}", header_line)?;
    writeln!(out, "{}", "-".repeat(header_line.chars().count()))?;
    for row in rows {
        writeln!(out, "{}", render(row))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_and_fuzzy_text_resolve_menu_choices() {
        let menu = ["CUSTOM PIVOT", "STORED RESULTS", "EXIT"];
        assert_eq!(determine_action_as_number(&menu, "2"), Some(2));
        assert_eq!(determine_action_as_number(&menu, "stored result"), Some(2));
        assert_eq!(determine_action_as_number(&menu, "custom pivto"), Some(1));
        assert_eq!(determine_action_as_number(&menu, "4"), None);
        assert_eq!(determine_action_as_number(&menu, "zzzz"), None);
        assert_eq!(determine_action_as_number(&menu, ""), None);
    }

    #[test]
    fn list_pads_indices() {
        let options: Vec<String> = (1..=10).map(|i| format!("opt{}", i)).collect();
        let refs: Vec<&str> = options.iter().map(String::as_str).collect();
        let text = format_list(&refs);
        assert!(text.starts_with("   1: opt1\n"));
        assert!(text.ends_with("  10: opt10"));
    }

    #[test]
    fn yes_no_reprompts_on_garbage() {
        let mut prompter = ScriptedPrompter::new(&["maybe", "Y"]);
        assert!(prompt_yes_no(&mut prompter, "Rename?", false).unwrap());
        assert_eq!(prompter.insights, vec!["Please answer y or n.".to_string()]);

        let mut prompter = ScriptedPrompter::new(&[""]);
        assert!(!prompt_yes_no(&mut prompter, "Rename?", false).unwrap());
    }

    #[test]
    fn table_columns_are_padded() {
        let mut out = String::new();
        write_table(
            &mut out,
            &["id".to_string(), "item".to_string()],
            &[vec!["1".to_string(), "pizza".to_string()]],
        )
        .unwrap();
        assert_eq!(out, "|id |item  |\n------------\n|1  |pizza |\n");
    }
}
