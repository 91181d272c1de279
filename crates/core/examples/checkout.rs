//! Checkout Receipt Example
//!
//! This example applies discount codes to an order fixture and prints the
//! resulting receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-o` to pick an order from the set
//! Use `-c` to apply a discount code (repeatable)

use std::{io, io::Write, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;

use redeem::{allocation, fixtures::Fixture, utils::ExampleCheckoutArgs, validity};

/// Checkout Receipt Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let args = ExampleCheckoutArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let order = fixture.order(&args.order)?;
    let ctx = fixture.order_context(&args.order, Timestamp::now())?;

    let mut selected = Vec::new();

    for code in &args.codes {
        let normalized = code.trim().to_uppercase();

        let Some(discount) = fixture
            .discounts()
            .iter()
            .find(|discount| discount.code.as_str() == normalized)
        else {
            println!("No such code in fixture set: {normalized}");
            continue;
        };

        match validity::validate(discount, &ctx) {
            Ok(()) => selected.push(discount.clone()),
            Err(reason) => println!("{}: {reason}", discount.code),
        }
    }

    let start = Instant::now();
    let allocated = allocation::apply(&order, &selected)?;
    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    allocated.write_to(&mut handle, fixture.labels())?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
