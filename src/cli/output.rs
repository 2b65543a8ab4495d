use std::{env, fmt};

use colored::Colorize;

use crate::core::MonthlyReport;
use crate::domain::Displayable;

const PLAIN_ENV: &str = "NO_COLOR";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Style {
    Header,
    Info,
    Success,
    Warning,
}

/// Terminal output for the command-line front end.
///
/// Plain mode (set when `NO_COLOR` is present) swaps icons and colors for
/// text labels so output stays readable in logs and scripts.
pub struct Formatter {
    plain: bool,
    currency: String,
}

impl Formatter {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            plain: env::var_os(PLAIN_ENV).is_some(),
            currency: currency.into(),
        }
    }

    pub fn plain(currency: impl Into<String>) -> Self {
        Self {
            plain: true,
            currency: currency.into(),
        }
    }

    pub fn print_header(&self, title: impl fmt::Display) {
        println!("\n{}", self.header_text(title));
    }

    pub fn header_text(&self, title: impl fmt::Display) -> String {
        self.colorize(format!("=== {} ===", title), Style::Header)
    }

    pub fn print_info(&self, message: impl fmt::Display) {
        println!("{}", self.apply_style(Style::Info, message));
    }

    pub fn print_success(&self, message: impl fmt::Display) {
        println!("{}", self.apply_style(Style::Success, message));
    }

    pub fn print_warning(&self, message: impl fmt::Display) {
        println!("{}", self.apply_style(Style::Warning, message));
    }

    pub fn amount_text(&self, amount: f64) -> String {
        format!("{:.2} {}", amount, self.currency)
    }

    pub fn print_two_column(&self, entries: &[(String, String)]) {
        let width = entries.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in entries {
            println!("  {:<width$}  {}", label, value, width = width);
        }
    }

    /// One line per jar: code, name, percentage, this month's movement, balance.
    pub fn report_lines(&self, report: &MonthlyReport) -> Vec<String> {
        report
            .jars
            .iter()
            .map(|allocated| {
                let balance = self.amount_text(allocated.amount);
                let balance = if allocated.amount < 0.0 && !self.plain {
                    balance.red().to_string()
                } else {
                    balance
                };
                format!(
                    "  {:<28} +{:<10.2} -{:<10.2} {}",
                    allocated.jar.display_label(),
                    allocated.amount_added_this_month,
                    allocated.amount_spent_this_month,
                    balance
                )
            })
            .collect()
    }

    fn apply_style(&self, style: Style, message: impl fmt::Display) -> String {
        match style {
            Style::Success => self.decorate("✔", "OK:", message, style),
            Style::Warning => self.decorate("⚠", "WARNING:", message, style),
            Style::Header => self.colorize(format!("=== {} ===", message), style),
            Style::Info => message.to_string(),
        }
    }

    fn decorate(&self, icon: &str, plain_label: &str, message: impl fmt::Display, style: Style) -> String {
        if self.plain {
            format!("{plain_label} {}", message)
        } else {
            self.colorize(format!("{icon} {}", message), style)
        }
    }

    fn colorize(&self, text: String, style: Style) -> String {
        if self.plain {
            return text;
        }
        match style {
            Style::Success => text.green().to_string(),
            Style::Warning => text.yellow().to_string(),
            Style::Header => text.bold().to_string(),
            Style::Info => text,
        }
    }
}
