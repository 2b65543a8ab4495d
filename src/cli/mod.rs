//! Command-line front end over [`BudgetManager`].
//!
//! Each invocation opens the persisted session, runs one command against the
//! selected (latest) month, and exits. Changes are persisted by the manager.

pub mod output;

use std::{env, fs, path::Path};

use crate::codec::{consume_share_param, decode_compact, qr_code_url};
use crate::config::{Config, ConfigManager};
use crate::core::BudgetManager;
use crate::domain::{Displayable, Identifiable, JarId, MonthKey};
use crate::errors::{CliError, JarsError};
use crate::ledger::IntentOutcome;
use crate::storage::JsonStorage;
use crate::utils::build_info;

use output::Formatter;

const COMMANDS: &[(&str, &str)] = &[
    ("summary [YYYY-MM]", "Show balances for a month (latest by default)"),
    ("months", "List the months in the history"),
    ("add-month", "Start the month after the latest one"),
    ("income add <amount> [description]", "Record income in the latest month"),
    ("income rm <id>", "Delete an income"),
    ("expense add <JAR> <amount> [description]", "Record an expense against a jar"),
    ("expense rm <id>", "Delete an expense"),
    ("percent <JAR> <value>", "Set a jar's percentage for the latest month"),
    ("name <text>", "Set the display name"),
    ("share", "Print a share link and QR code URL"),
    ("open-share <url-or-payload>", "Replace the session with a shared configuration"),
    ("backup [note]", "Write a backup file"),
    ("backups", "List backup files, newest first"),
    ("restore <path-or-backup-name>", "Replace all data with a backup"),
    ("version", "Show build information"),
    ("help", "Show this help"),
];

pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();
    run_with_args(&args)
}

pub fn run_with_args(args: &[String]) -> Result<(), CliError> {
    let Some((command, rest)) = args.split_first() else {
        print_help();
        return Ok(());
    };
    match command.as_str() {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "version" | "--version" => {
            println!("{}", build_info::current().summary());
            Ok(())
        }
        "open-share" => open_share(rest),
        other => Session::open(None)?.execute(other, rest),
    }
}

fn print_help() {
    let formatter = Formatter::new("");
    formatter.print_header("Six Jars");
    formatter.print_info("Usage: six_jars_cli <command> [arguments]");
    let entries: Vec<(String, String)> = COMMANDS
        .iter()
        .map(|(usage, about)| (usage.to_string(), about.to_string()))
        .collect();
    formatter.print_two_column(&entries);
    let jars: Vec<&str> = JarId::ALL.iter().map(JarId::as_str).collect();
    formatter.print_info(format!("Jars: {}", jars.join(", ")));
}

fn open_share(args: &[String]) -> Result<(), CliError> {
    let input = required(args, 0, "share link or payload")?;
    let payload = if input.contains('?') {
        consume_share_param(input)
            .payload
            .ok_or_else(|| CliError::Input("link has no share parameter".into()))?
    } else {
        input.to_string()
    };
    let shared = decode_compact(&payload).map_err(JarsError::from)?;

    let mut session = Session::open(Some(&payload))?;
    session
        .formatter
        .print_success(format!("Loaded shared jars from {}", shared.user_name));
    session.summary(None)
}

struct Session {
    manager: BudgetManager,
    config: Config,
    formatter: Formatter,
}

impl Session {
    fn open(share_payload: Option<&str>) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        let storage = JsonStorage::new(None, Some(config.backup_retention))?;
        let manager = BudgetManager::open(Box::new(storage), share_payload, MonthKey::current());
        Ok(Self {
            formatter: Formatter::new(config.currency.clone()),
            manager,
            config,
        })
    }

    fn execute(&mut self, command: &str, args: &[String]) -> Result<(), CliError> {
        match command {
            "summary" => self.summary(args.first().map(String::as_str)),
            "months" => self.months(),
            "add-month" => self.add_month(),
            "income" => self.income(args),
            "expense" => self.expense(args),
            "percent" => self.percent(args),
            "name" => self.name(args),
            "share" => self.share(),
            "backup" => self.backup(args),
            "backups" => self.backups(),
            "restore" => self.restore(args),
            other => Err(CliError::Input(format!(
                "unknown command `{}`, run `help` for usage",
                other
            ))),
        }
    }

    fn summary(&mut self, month: Option<&str>) -> Result<(), CliError> {
        if let Some(raw) = month {
            let month = raw.parse::<MonthKey>()?;
            if !self.manager.select_month(month) {
                return Err(CliError::Input(format!("no record for {}", month)));
            }
        }
        let month = self.manager.selected_month();
        let report = self
            .manager
            .report(month)
            .ok_or_else(|| CliError::Input(format!("no record for {}", month)))?;

        let title = match self.manager.user_name() {
            "" => format!("Summary {}", month),
            name => format!("Summary {} for {}", month, name),
        };
        self.formatter.print_header(title);
        self.formatter.print_two_column(&[
            ("Income".into(), self.formatter.amount_text(report.total_income)),
            ("Spent".into(), self.formatter.amount_text(report.total_spent)),
            ("Balance".into(), self.formatter.amount_text(report.total_balance)),
        ]);
        for line in self.formatter.report_lines(&report) {
            println!("{}", line);
        }
        if !report.is_fully_allocated() {
            self.formatter.print_warning(format!(
                "Percentages add up to {}%, not 100%",
                report.total_percentage
            ));
        }

        if let Some(record) = self.manager.store().record(month) {
            for income in &record.incomes {
                self.formatter
                    .print_info(format!("  income  {}  {}", income.id(), income.display_label()));
            }
            for expense in &record.expenses {
                self.formatter
                    .print_info(format!("  expense {}  {}", expense.id(), expense.display_label()));
            }
        }
        Ok(())
    }

    fn months(&self) -> Result<(), CliError> {
        let selected = self.manager.selected_month();
        for month in self.manager.store().months() {
            let marker = if month == selected { "*" } else { " " };
            self.formatter.print_info(format!("{} {}", marker, month));
        }
        Ok(())
    }

    fn add_month(&mut self) -> Result<(), CliError> {
        let month = self
            .manager
            .add_month()
            .ok_or_else(|| CliError::Command("could not add the next month".into()))?;
        self.formatter.print_success(format!("Started {}", month));
        Ok(())
    }

    fn income(&mut self, args: &[String]) -> Result<(), CliError> {
        match required(args, 0, "income action")? {
            "add" => {
                let amount = parse_amount(required(args, 1, "amount")?)?;
                let id = self
                    .manager
                    .add_income(amount, description(args, 2))
                    .ok_or_else(|| CliError::Command("income was not recorded".into()))?;
                self.formatter.print_success(format!("Income added: {}", id));
                Ok(())
            }
            "rm" => {
                let id = required(args, 1, "income id")?;
                if !self.manager.delete_income(id) {
                    return Err(self.not_found("income", id));
                }
                self.formatter.print_success(format!("Income removed: {}", id));
                Ok(())
            }
            other => Err(CliError::Input(format!("unknown income action `{}`", other))),
        }
    }

    fn expense(&mut self, args: &[String]) -> Result<(), CliError> {
        match required(args, 0, "expense action")? {
            "add" => {
                let jar = parse_jar(required(args, 1, "jar")?)?;
                let amount = parse_amount(required(args, 2, "amount")?)?;
                let id = self
                    .manager
                    .add_expense(jar, amount, description(args, 3))
                    .ok_or_else(|| CliError::Command("expense was not recorded".into()))?;
                self.formatter
                    .print_success(format!("Expense added to {}: {}", jar, id));
                Ok(())
            }
            "rm" => {
                let id = required(args, 1, "expense id")?;
                if !self.manager.delete_expense(id) {
                    return Err(self.not_found("expense", id));
                }
                self.formatter.print_success(format!("Expense removed: {}", id));
                Ok(())
            }
            other => Err(CliError::Input(format!("unknown expense action `{}`", other))),
        }
    }

    fn percent(&mut self, args: &[String]) -> Result<(), CliError> {
        let jar = parse_jar(required(args, 0, "jar")?)?;
        let raw = required(args, 1, "percentage")?;
        let value = raw
            .parse::<u8>()
            .ok()
            .filter(|value| *value <= 100)
            .ok_or_else(|| CliError::Input(format!("`{}` is not a percentage between 0 and 100", raw)))?;
        if self.manager.set_jar_percentage(jar, value) {
            self.formatter.print_success(format!("{} set to {}%", jar, value));
        } else {
            self.formatter.print_info(format!("{} already at {}%", jar, value));
        }
        let total = self.manager.total_percentage();
        if total != 100 {
            self.formatter
                .print_warning(format!("Percentages add up to {}%, not 100%", total));
        }
        Ok(())
    }

    fn name(&mut self, args: &[String]) -> Result<(), CliError> {
        let name = description(args, 0);
        if self.manager.set_user_name(name.clone()) {
            self.formatter.print_success(format!("Name set to {}", name));
        } else {
            self.formatter.print_info("Name unchanged");
        }
        Ok(())
    }

    fn share(&self) -> Result<(), CliError> {
        let url = self.manager.share_url(&self.config.share_base_url)?;
        self.formatter.print_two_column(&[
            ("Link".into(), url.clone()),
            ("QR code".into(), qr_code_url(&url)),
        ]);
        Ok(())
    }

    fn backup(&self, args: &[String]) -> Result<(), CliError> {
        let note = description(args, 0);
        let note = (!note.is_empty()).then_some(note.as_str());
        let info = self.manager.write_backup(note)?;
        self.formatter
            .print_success(format!("Backup written to {}", info.path.display()));
        Ok(())
    }

    fn backups(&self) -> Result<(), CliError> {
        let backups = self.manager.list_backups()?;
        if backups.is_empty() {
            self.formatter.print_info("No backups yet");
            return Ok(());
        }
        let entries: Vec<(String, String)> = backups
            .into_iter()
            .map(|info| {
                let created = info
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "unknown time".into());
                (info.name, created)
            })
            .collect();
        self.formatter.print_two_column(&entries);
        Ok(())
    }

    fn restore(&mut self, args: &[String]) -> Result<(), CliError> {
        let target = required(args, 0, "backup path or name")?;
        let outcome = if Path::new(target).is_file() {
            let document = fs::read_to_string(target).map_err(JarsError::from)?;
            self.manager.restore_backup(&document)?
        } else {
            self.manager.restore_named_backup(target)?
        };
        match outcome {
            IntentOutcome::Unchanged => self.formatter.print_info("Data already matches the backup"),
            _ => self.formatter.print_success(format!(
                "Restored {} month(s), latest {}",
                self.manager.store().records().len(),
                self.manager.selected_month()
            )),
        }
        Ok(())
    }

    fn not_found(&self, kind: &str, id: &str) -> CliError {
        CliError::Input(format!(
            "no {} `{}` in {}",
            kind,
            id,
            self.manager.selected_month()
        ))
    }
}

fn required<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str, CliError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| CliError::Input(format!("missing {}", what)))
}

fn description(args: &[String], from: usize) -> String {
    args.get(from..).map(|rest| rest.join(" ")).unwrap_or_default()
}

fn parse_amount(raw: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .ok_or_else(|| CliError::Input(format!("`{}` is not a valid amount", raw)))
}

fn parse_jar(raw: &str) -> Result<JarId, CliError> {
    raw.parse::<JarId>().map_err(CliError::Input)
}
