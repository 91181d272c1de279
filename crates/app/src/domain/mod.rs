//! Redeem Domain Concerns

pub mod discounts;
