//! Catalog fixtures.

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Display name, used for receipt labels
    pub name: String,

    /// Product type key (e.g., "apparel")
    #[serde(default, rename = "type")]
    pub product_type: Option<String>,

    /// Product tag keys
    #[serde(default)]
    pub tags: Vec<String>,

    /// Collection key
    #[serde(default)]
    pub collection: Option<String>,
}
