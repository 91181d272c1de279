//! Discounts service errors.

use redeem::{
    allocation::AllocationError, dynamic::DynamicCodeError, orders::OrderError,
    validation::ValidationError, validity::DiscountStateError,
};
use thiserror::Error;

use crate::domain::discounts::{
    catalog::CatalogError, regions::RegionError, repository::RepositoryError,
};

/// Discount service error variants.
#[derive(Debug, Error)]
pub enum DiscountsServiceError {
    /// A discount with the same code already exists.
    #[error("Discount with code {code} already exists.")]
    AlreadyExists { code: String },

    /// Discount was not found.
    #[error("discount not found")]
    NotFound,

    /// Provided discount data failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The discount exists but cannot be applied in the given context.
    #[error("discount {code} is not applicable: {reason}")]
    NotApplicable {
        code: String,
        reason: DiscountStateError,
    },

    /// Order currency code was not recognized.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Order construction failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Discount arithmetic failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Child code could not be minted.
    #[error(transparent)]
    Dynamic(#[from] DynamicCodeError),

    /// Product facts could not be resolved.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Region could not be verified.
    #[error(transparent)]
    Region(#[from] RegionError),

    /// Underlying storage error.
    #[error("storage error")]
    Repository(#[source] RepositoryError),
}

impl From<RepositoryError> for DiscountsServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
