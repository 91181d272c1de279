//! Order fixtures.

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for orders in YAML
#[derive(Debug, Deserialize)]
pub struct OrdersFixture {
    /// Map of order key -> order fixture
    pub orders: FxHashMap<String, OrderFixture>,
}

/// Order Fixture
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Region key the order is placed in
    #[serde(default)]
    pub region: Option<String>,

    /// Customer group keys the buyer belongs to
    #[serde(default)]
    pub customer_groups: Vec<String>,

    /// The line items
    pub lines: Vec<OrderLineFixture>,
}

/// Order line fixture
#[derive(Debug, Deserialize)]
pub struct OrderLineFixture {
    /// Product key from the catalog fixture
    pub product: String,

    /// Unit price (e.g., "35.00 USD")
    pub unit_price: String,

    /// Number of units
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
