//! Utils

use clap::Parser;

/// Arguments for the checkout examples
#[derive(Debug, Parser)]
pub struct ExampleCheckoutArgs {
    /// Fixture set to use for the catalog, discounts & orders
    #[clap(short, long, default_value = "demo")]
    pub fixture: String,

    /// Order key within the fixture set
    #[clap(short, long, default_value = "mixed")]
    pub order: String,

    /// Discount codes to apply, in stacking order
    #[clap(short, long, default_value = "SUMMER10")]
    pub codes: Vec<String>,
}
