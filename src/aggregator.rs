use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::calendar::{days_between, month_end, month_start};
use crate::entry::{Entry, EntryKind, Figure};

/// Every occurrence of one day of the reference month, with the day's
/// totals and the balance carried from the first day of the month.
#[derive(Debug, Clone, PartialEq)]
pub struct DayData {
    pub date: NaiveDate,
    pub entries: Vec<Entry>,
    pub total_income: Figure,
    pub total_expenses: Figure,
    pub daily_balance: Figure,
    pub running_balance: Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthData {
    /// One element per day of the month, in date order.
    pub days: Vec<DayData>,
    pub total_income: Figure,
    pub total_expenses: Figure,
    pub monthly_balance: Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: u32,
    pub year: i32,
    pub total_income: Figure,
    pub total_expenses: Figure,
    pub monthly_balance: Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearData {
    pub year: i32,
    pub months: Vec<MonthSummary>,
    pub total_income: Figure,
    pub total_expenses: Figure,
    pub yearly_balance: Figure,
}

fn totals(entries: &[&Entry]) -> (Figure, Figure) {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for entry in entries {
        match entry.kind {
            EntryKind::Income => income += entry.amount,
            EntryKind::Expense => expenses += entry.amount,
        }
    }
    return (income, expenses);
}

/// Folds the occurrences of the reference month into per-day data with
/// a running balance. Pure; safe to re-derive at any time.
pub fn month_data(entries: &[Entry], reference: &NaiveDate) -> Result<MonthData, String> {
    let start = month_start(reference)?;
    let end = month_end(reference)?;

    let mut days = Vec::new();
    let mut running_balance = Decimal::ZERO;
    for day in days_between(&start, &end) {
        let day_entries: Vec<&Entry> = entries.iter().filter(|entry| entry.date == day).collect();
        let (total_income, total_expenses) = totals(&day_entries);
        let daily_balance = total_income - total_expenses;
        running_balance += daily_balance;
        days.push(DayData {
            date: day,
            entries: day_entries.into_iter().cloned().collect(),
            total_income,
            total_expenses,
            daily_balance,
            running_balance,
        });
    }

    let total_income: Figure = days.iter().map(|day| day.total_income).sum();
    let total_expenses: Figure = days.iter().map(|day| day.total_expenses).sum();

    return Ok(MonthData {
        days,
        total_income,
        total_expenses,
        monthly_balance: total_income - total_expenses,
    });
}

/// Folds all occurrences of the reference year into twelve month
/// summaries plus year totals.
pub fn year_data(entries: &[Entry], reference: &NaiveDate) -> YearData {
    let year = reference.year();

    let months: Vec<MonthSummary> = (1..=12)
        .map(|month| {
            let month_entries: Vec<&Entry> = entries
                .iter()
                .filter(|entry| entry.date.year() == year && entry.date.month() == month)
                .collect();
            let (total_income, total_expenses) = totals(&month_entries);
            return MonthSummary {
                month,
                year,
                total_income,
                total_expenses,
                monthly_balance: total_income - total_expenses,
            };
        })
        .collect();

    let total_income: Figure = months.iter().map(|month| month.total_income).sum();
    let total_expenses: Figure = months.iter().map(|month| month.total_expenses).sum();

    return YearData {
        year,
        months,
        total_income,
        total_expenses,
        yearly_balance: total_income - total_expenses,
    };
}


#[allow(non_snake_case)]
#[cfg(test)]
mod tests_year_data {
    use super::year_data;
    use crate::entry::{Entry, EntryKind, Figure};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(year: i32, month: u32, amount: Figure, kind: EntryKind) -> Entry {
        return Entry {
            id: format!("entry-{}-{}", year, month),
            date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
            amount,
            description: "Test".to_string(),
            kind,
            rule_id: None,
        };
    }

    fn reference() -> NaiveDate {
        return NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    }

    #[test]
    fn always_yields_twelve_months() {
        let data = year_data(&[], &reference());
        assert_eq!(data.months.len(), 12);
        assert_eq!(
            data.months.iter().map(|month| month.month).collect::<Vec<u32>>(),
            (1..=12).collect::<Vec<u32>>()
        );
    }

    #[test]
    fn entries_land_in_their_month() {
        let entries = [
            entry(2024, 3, dec!(1000), EntryKind::Income),
            entry(2024, 3, dec!(250), EntryKind::Expense),
            entry(2024, 11, dec!(40), EntryKind::Expense),
        ];
        let data = year_data(&entries, &reference());

        assert_eq!(data.months[2].total_income, dec!(1000));
        assert_eq!(data.months[2].total_expenses, dec!(250));
        assert_eq!(data.months[2].monthly_balance, dec!(750));
        assert_eq!(data.months[10].monthly_balance, dec!(-40));
        assert_eq!(data.months[0].monthly_balance, dec!(0));
    }

    #[test]
    fn year_totals_cover_the_whole_year() {
        let entries = [
            entry(2024, 1, dec!(100), EntryKind::Income),
            entry(2024, 12, dec!(60), EntryKind::Expense),
        ];
        let data = year_data(&entries, &reference());

        assert_eq!(data.total_income, dec!(100));
        assert_eq!(data.total_expenses, dec!(60));
        assert_eq!(data.yearly_balance, dec!(40));
    }

    #[test]
    fn entries_of_other_years_are_ignored() {
        let entries = [
            entry(2023, 6, dec!(500), EntryKind::Income),
            entry(2024, 6, dec!(100), EntryKind::Income),
        ];
        let data = year_data(&entries, &reference());
        assert_eq!(data.total_income, dec!(100));
    }
}
