use std::env::current_dir;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use rust_decimal::Decimal;

use crate::aggregator::{month_data, year_data, MonthData, YearData};
use crate::entry::{EntryKind, NewEntry, UserId};
use crate::materializer::{MaterializeReport, Materializer};
use crate::schedule::window::DateWindow;
use crate::schedule::{Frequency, RuleFields, RuleFieldsBuilder, ScheduleType};
use crate::store::{EntryStore, RuleStore};
use crate::vault::Vault;

pub fn run() {
    let result: Result<String, String> = (|| {
        let arguments = CadenceOptions::parse();
        let vault_path = match &arguments.vault {
            Some(path) => path.clone(),
            None => current_dir().map_err(|why| why.to_string())?,
        };
        let today = Local::now().date_naive();
        return execute(arguments, Vault::new(vault_path), &today);
    })();

    match result {
        Ok(screen) => print!("{}", screen),
        Err(error) => println!("Could not complete the operation: {}", error),
    }
}

fn execute(arguments: CadenceOptions, vault: Vault, today: &NaiveDate) -> Result<String, String> {
    let owner: UserId = arguments.user;
    let mut materializer = Materializer::new(vault.clone(), vault.clone());

    return match arguments.command {
        Command::Month { date } => {
            let reference = date.unwrap_or(*today);
            let window = DateWindow::for_view(today, &reference)?;
            let report = materializer
                .generate(&owner, &window)
                .map_err(|why| why.to_string())?;
            let entries = EntryStore::list(&vault, &owner).map_err(|why| why.to_string())?;
            let data = month_data(&entries, &reference)?;
            Ok(format_month_screen(&reference, &data, &report))
        }
        Command::Year { date } => {
            let reference = date.unwrap_or(*today);
            let entries = EntryStore::list(&vault, &owner).map_err(|why| why.to_string())?;
            Ok(format_year_screen(&year_data(&entries, &reference)))
        }
        Command::Day { date } => {
            let entries = EntryStore::list(&vault, &owner).map_err(|why| why.to_string())?;
            let data = month_data(&entries, &date)?;
            let day = data
                .days
                .into_iter()
                .find(|day| day.date == date)
                .ok_or(format!("{} is not part of its own month", date))?;

            let mut table = Table::new();
            table.set_header(vec!["Description", "Kind", "Amount"]);
            for entry in &day.entries {
                table.add_row(vec![
                    entry.description.clone(),
                    kind_label(&entry.kind).to_string(),
                    entry.amount.to_string(),
                ]);
            }
            Ok(format!(
                "{}\n{}\nBalance: {} (running: {})\n",
                title(&format!("Entries on {}", date)),
                table,
                day.daily_balance,
                day.running_balance
            ))
        }
        Command::AddEntry {
            date,
            amount,
            description,
            expense,
        } => {
            let kind = if expense {
                EntryKind::Expense
            } else {
                EntryKind::Income
            };
            let entry = EntryStore::create(
                &mut materializer.entries,
                &owner,
                NewEntry {
                    date,
                    amount,
                    description,
                    kind,
                    rule_id: None,
                },
            )
            .map_err(|why| why.to_string())?;
            Ok(format!("Recorded entry {} on {}\n", entry.id, entry.date))
        }
        Command::AddRule { rule } => {
            let fields = rule.into_fields()?;
            let window = DateWindow::for_view(today, today)?;
            let (rule, report) = materializer
                .create_rule(&owner, fields, &window)
                .map_err(|why| why.to_string())?;
            Ok(format!(
                "Created rule {}\n{}",
                rule.id,
                format_report(&report)
            ))
        }
        Command::UpdateEntry {
            id,
            date,
            amount,
            description,
            expense,
        } => {
            let kind = if expense {
                EntryKind::Expense
            } else {
                EntryKind::Income
            };
            let existing = EntryStore::list(&vault, &owner)
                .map_err(|why| why.to_string())?
                .into_iter()
                .find(|entry| entry.id == id)
                .ok_or(format!("No entry with id {}", id))?;
            let entry = EntryStore::update(
                &mut materializer.entries,
                &id,
                NewEntry {
                    date,
                    amount,
                    description,
                    kind,
                    // An edited occurrence stays linked to its rule so the
                    // next pass does not re-materialize the same date.
                    rule_id: existing.rule_id,
                },
            )
            .map_err(|why| why.to_string())?;
            Ok(format!("Updated entry {} on {}\n", entry.id, entry.date))
        }
        Command::DeleteEntry { id } => {
            EntryStore::delete(&mut materializer.entries, &id).map_err(|why| why.to_string())?;
            Ok(format!("Deleted entry {}\n", id))
        }
        Command::UpdateRule { id, rule } => {
            let fields = rule.into_fields()?;
            let window = DateWindow::for_view(today, today)?;
            let (_rule, report) = materializer
                .update_rule(&owner, &id, fields, &window)
                .map_err(|why| why.to_string())?;
            Ok(format!("Updated rule {}\n{}", id, format_report(&report)))
        }
        Command::ListRules => {
            let rules = RuleStore::list(&vault, &owner).map_err(|why| why.to_string())?;
            let mut table = Table::new();
            table.set_header(vec![
                "Id", "Description", "Kind", "Amount", "Schedule", "Frequency", "Active",
            ]);
            for rule in &rules {
                table.add_row(vec![
                    rule.id.clone(),
                    rule.description.clone(),
                    kind_label(&rule.kind).to_string(),
                    rule.amount.to_string(),
                    schedule_label(&rule.schedule_type).to_string(),
                    frequency_label(&rule.frequency).to_string(),
                    (if rule.active { "yes" } else { "no" }).to_string(),
                ]);
            }
            Ok(format!("{}\n", table))
        }
        Command::DeleteRule { id } => {
            let report = materializer
                .delete_rule(&owner, &id)
                .map_err(|why| why.to_string())?;
            Ok(format!("Deleted rule {}\n{}", id, format_report(&report)))
        }
        Command::Sync { date } => {
            let reference = date.unwrap_or(*today);
            let window = DateWindow::for_view(today, &reference)?;
            let report = materializer
                .generate(&owner, &window)
                .map_err(|why| why.to_string())?;
            Ok(format_report(&report))
        }
    };
}

fn format_month_screen(
    reference: &NaiveDate,
    data: &MonthData,
    report: &MaterializeReport,
) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Entries", "Income", "Expenses", "Balance", "Running"]);
    for day in &data.days {
        table.add_row(vec![
            day.date.to_string(),
            day.entries.len().to_string(),
            format_figure(&day.total_income),
            format_figure(&day.total_expenses),
            format_figure(&day.daily_balance),
            format_figure(&day.running_balance),
        ]);
    }

    let mut components = vec![
        title(&format!("{}", reference.format("%B %Y"))),
        table.to_string(),
        format!(
            "Income: {}   Expenses: {}   Monthly balance: {}",
            format_figure(&data.total_income),
            format_figure(&data.total_expenses),
            format_figure(&data.monthly_balance)
        ),
    ];
    if !report.is_clean() {
        components.push(format_report(report));
    }
    return components.join("\n\n") + "\n";
}

fn format_year_screen(data: &YearData) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Expenses", "Balance"]);
    for month in &data.months {
        table.add_row(vec![
            format!("{}-{:02}", month.year, month.month),
            format_figure(&month.total_income),
            format_figure(&month.total_expenses),
            format_figure(&month.monthly_balance),
        ]);
    }

    return format!(
        "{}\n\n{}\n\nIncome: {}   Expenses: {}   Yearly balance: {}\n",
        title(&format!("Year {}", data.year)),
        table,
        format_figure(&data.total_income),
        format_figure(&data.total_expenses),
        format_figure(&data.yearly_balance)
    );
}

fn format_report(report: &MaterializeReport) -> String {
    if report.attempted() == 0 {
        return "Nothing to materialize\n".to_string();
    }
    let mut lines = vec![];
    if report.attempted_deletes > 0 {
        lines.push(format!(
            "Removed {} of {} generated entries",
            report.deleted, report.attempted_deletes
        ));
    }
    if report.attempted_creates > 0 {
        lines.push(format!(
            "Materialized {} of {} occurrences",
            report.created.len(),
            report.attempted_creates
        ));
    }
    for failure in &report.failures {
        lines.push(format!("  failed: {}", failure));
    }
    return lines.join("\n") + "\n";
}

fn format_figure(figure: &Decimal) -> String {
    return figure.round_dp(2).to_string();
}

fn kind_label(kind: &EntryKind) -> &'static str {
    return match kind {
        EntryKind::Income => "income",
        EntryKind::Expense => "expense",
    };
}

fn schedule_label(schedule_type: &ScheduleType) -> &'static str {
    return match schedule_type {
        ScheduleType::SpecificDate => "specific-date",
        ScheduleType::WeekdaysOnly => "weekdays-only",
        ScheduleType::WeekendsOnly => "weekends-only",
        ScheduleType::CustomRange => "custom-range",
    };
}

fn frequency_label(frequency: &Frequency) -> &'static str {
    return match frequency {
        Frequency::Daily => "daily",
        Frequency::Weekly => "weekly",
        Frequency::Monthly => "monthly",
        Frequency::Yearly => "yearly",
    };
}

fn title(string: &str) -> String {
    return string.to_string() + "\n" + &"=".repeat(string.len());
}


fn parse_schedule_type(s: &str) -> Result<ScheduleType, String> {
    return match s {
        "specific-date" => Ok(ScheduleType::SpecificDate),
        "weekdays-only" => Ok(ScheduleType::WeekdaysOnly),
        "weekends-only" => Ok(ScheduleType::WeekendsOnly),
        "custom-range" => Ok(ScheduleType::CustomRange),
        other => Err(format!(
            "Unknown schedule type {}: expected specific-date, weekdays-only, weekends-only or custom-range",
            other
        )),
    };
}

fn parse_frequency(s: &str) -> Result<Frequency, String> {
    return match s {
        "daily" => Ok(Frequency::Daily),
        "weekly" => Ok(Frequency::Weekly),
        "monthly" => Ok(Frequency::Monthly),
        "yearly" => Ok(Frequency::Yearly),
        other => Err(format!(
            "Unknown frequency {}: expected daily, weekly, monthly or yearly",
            other
        )),
    };
}

#[derive(Parser)]
#[command()]
struct CadenceOptions {
    #[arg(short = 'V', long)]
    vault: Option<PathBuf>,

    #[arg(short = 'u', long, default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct RuleArguments {
    #[arg(short = 'm', long)]
    description: String,
    #[arg(short = 'a', long)]
    amount: Decimal,
    #[arg(short = 'e', long)]
    expense: bool,
    #[arg(short = 's', long, value_parser = parse_schedule_type)]
    schedule_type: ScheduleType,
    #[arg(short = 'f', long, value_parser = parse_frequency, default_value = "monthly")]
    frequency: Frequency,
    #[arg(long)]
    day_of_month: Option<u32>,
    #[arg(long)]
    start_date: NaiveDate,
    #[arg(long)]
    end_date: Option<NaiveDate>,
    /// Defaults to the start date.
    #[arg(long)]
    valid_from: Option<NaiveDate>,
    #[arg(long)]
    valid_until: Option<NaiveDate>,
    #[arg(long)]
    inactive: bool,
}

impl RuleArguments {
    fn into_fields(self) -> Result<RuleFields, String> {
        let kind = if self.expense {
            EntryKind::Expense
        } else {
            EntryKind::Income
        };
        return RuleFieldsBuilder::default()
            .description(self.description)
            .amount(self.amount)
            .kind(kind)
            .schedule_type(self.schedule_type)
            .frequency(self.frequency)
            .day_of_month(self.day_of_month)
            .start_date(self.start_date)
            .end_date(self.end_date)
            .valid_from(self.valid_from.unwrap_or(self.start_date))
            .valid_until(self.valid_until)
            .active(!self.inactive)
            .build()
            .map_err(|why| why.to_string());
    }
}

#[derive(Subcommand)]
enum Command {
    /// Materialize recurring rules and show the month view.
    Month {
        #[arg(short = 'd', long)]
        date: Option<NaiveDate>,
    },
    /// Show the twelve-month summary of a year.
    Year {
        #[arg(short = 'd', long)]
        date: Option<NaiveDate>,
    },
    /// Show the entries of a single day.
    Day {
        #[arg(short = 'd', long)]
        date: NaiveDate,
    },
    /// Record a one-off entry.
    AddEntry {
        #[arg(short = 'd', long)]
        date: NaiveDate,
        #[arg(short = 'a', long)]
        amount: Decimal,
        #[arg(short = 'm', long)]
        description: String,
        /// Record an expense instead of an income.
        #[arg(short = 'e', long)]
        expense: bool,
    },
    /// Create a recurring rule and materialize it right away.
    AddRule {
        #[command(flatten)]
        rule: RuleArguments,
    },
    /// Replace every field of an entry.
    UpdateEntry {
        #[arg(long)]
        id: String,
        #[arg(short = 'd', long)]
        date: NaiveDate,
        #[arg(short = 'a', long)]
        amount: Decimal,
        #[arg(short = 'm', long)]
        description: String,
        /// Record an expense instead of an income.
        #[arg(short = 'e', long)]
        expense: bool,
    },
    /// Delete a single entry.
    DeleteEntry {
        #[arg(long)]
        id: String,
    },
    /// Replace every field of a rule and regenerate its entries.
    UpdateRule {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        rule: RuleArguments,
    },
    ListRules,
    /// Delete a rule together with the entries it generated.
    DeleteRule {
        #[arg(long)]
        id: String,
    },
    /// Materialize recurring rules without rendering a view.
    Sync {
        #[arg(short = 'd', long)]
        date: Option<NaiveDate>,
    },
}
