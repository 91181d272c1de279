//! Discounts

pub mod catalog;
pub mod data;
pub mod errors;
pub mod records;
pub mod regions;
pub mod repository;
pub mod service;

pub use errors::DiscountsServiceError;
pub use service::*;
