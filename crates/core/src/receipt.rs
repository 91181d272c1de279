//! Receipt rendering.
//!
//! Turns an [`AllocatedOrder`] into a terminal table: one block per line
//! item, one row per discount application, and a subtotal/total/savings
//! footer. Purely cosmetic; all numbers come straight from the allocation.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{allocation::AllocatedOrder, catalog::ProductUuid};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

impl AllocatedOrder<'_> {
    /// Writes the order as a table followed by subtotal, total, and savings
    /// lines.
    ///
    /// `labels` maps products to display names; unlabeled products fall
    /// back to their uuid.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a money calculation fails or the
    /// output cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        labels: &FxHashMap<ProductUuid, String>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "Qty",
            "Base Price",
            "Discounted Price",
            "Savings",
            "Discount",
        ]);

        let mut boundary_rows: Vec<usize> = Vec::new();
        let mut current_row = 1; // header is row 0

        for (index, line) in self.lines().iter().enumerate() {
            boundary_rows.push(current_row);

            let label = labels
                .get(&line.item().product())
                .cloned()
                .unwrap_or_else(|| line.item().product().to_string());
            let quantity = line.item().quantity().to_string();

            match line.applications() {
                [] => {
                    builder.push_record([
                        format!("#{:<3}", index + 1),
                        label,
                        quantity,
                        format!("{}", line.original_total()),
                        String::new(),
                        String::new(),
                        String::new(),
                    ]);
                    current_row += 1;
                }
                [application] => {
                    builder.push_record([
                        format!("#{:<3}", index + 1),
                        label,
                        quantity,
                        format!("{}", line.original_total()),
                        format!("{}", line.final_total()),
                        format!("-{}", application.amount()),
                        application.code().to_string(),
                    ]);
                    current_row += 1;
                }
                applications => {
                    builder.push_record([
                        format!("#{:<3}", index + 1),
                        label,
                        quantity,
                        format!("{}", line.original_total()),
                        String::new(),
                        String::new(),
                        String::new(),
                    ]);
                    current_row += 1;

                    // Each application row shows the price after that layer.
                    let currency = line.original_total().currency();
                    let mut running = line.original_total().to_minor_units();

                    for application in applications {
                        running -= application.amount().to_minor_units();

                        builder.push_record([
                            String::new(),
                            String::new(),
                            String::new(),
                            String::new(),
                            format!("{}", Money::from_minor(running, currency)),
                            format!("-{}", application.amount()),
                            application.code().to_string(),
                        ]);
                        current_row += 1;
                    }
                }
            }
        }

        write_table(&mut out, builder, &boundary_rows)?;
        write_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    boundary_rows: &[usize],
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in boundary_rows {
        if row > 1 {
            theme.insert_horizontal_line(row, separator);
        }
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, order: &AllocatedOrder<'_>) -> Result<(), ReceiptError> {
    let savings = order.savings()?;
    let percent_points = percent_points(order.savings_percent()?);

    writeln!(out, " Subtotal: {}", order.subtotal()).map_err(|_err| ReceiptError::IO)?;
    writeln!(out, "    Total: {}", order.total()).map_err(|_err| ReceiptError::IO)?;
    writeln!(out, "  Savings: ({percent_points:.2}%) {savings}").map_err(|_err| ReceiptError::IO)?;
    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::from_i64(100).unwrap_or(Decimal::ZERO)).round_dp(2)
}
