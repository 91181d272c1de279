//! Redeem
//!
//! Redeem is a promotional discount engine: codes, rules and conditions,
//! validity checking, and allocation of discount amounts across the lines of
//! an order.

pub mod allocation;
pub mod catalog;
pub mod conditions;
pub mod discounts;
pub mod dynamic;
pub mod fixtures;
pub mod ids;
pub mod orders;
pub mod prelude;
pub mod receipt;
pub mod rules;
pub mod utils;
pub mod validation;
pub mod validity;
