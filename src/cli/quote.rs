use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::models::{DurationMonths, SizeGb, SubscriptionSelection};
use crate::pricing::OrderSummary;
use crate::settings::Settings;

pub fn run(size_gb: u32, months: u32, upfront: bool, settings: &Settings) -> Result<()> {
    let selection = SubscriptionSelection {
        duration_months: DurationMonths::try_from(months)?,
        size_gb: SizeGb::try_from(size_gb)?,
        upfront_payment: upfront,
    };
    let summary = OrderSummary::compute(&selection, &settings.pricing());
    println!("Quote\n{}", quote_table(&selection, &summary));
    Ok(())
}

fn quote_table(selection: &SubscriptionSelection, summary: &OrderSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Item", "Value"]);
    table.add_row(vec![Cell::new("Size"), Cell::new(selection.size_gb.label())]);
    table.add_row(vec![
        Cell::new("Duration"),
        Cell::new(selection.duration_months.label()),
    ]);
    table.add_row(vec![
        Cell::new("Upfront payment"),
        Cell::new(if selection.upfront_payment { "Yes" } else { "No" }),
    ]);
    if summary.upfront_payment {
        table.add_row(vec![
            Cell::new("Original price"),
            Cell::new(money(summary.total_price)),
        ]);
        table.add_row(vec![
            Cell::new("You save".green().bold()),
            Cell::new(money(summary.savings)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Price".bold()),
        Cell::new(money(summary.discounted_price)),
    ]);
    table
}
