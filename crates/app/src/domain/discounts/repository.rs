//! Discount storage contract.

use async_trait::async_trait;
use mockall::automock;
use redeem::discounts::DiscountUuid;
use thiserror::Error;

use crate::domain::discounts::records::{DiscountFilter, DiscountRecord};

/// Discount Repository Errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No live discount matched the lookup.
    #[error("discount not found")]
    NotFound,

    /// Another live discount already holds this code.
    #[error("a discount with this code already exists")]
    DuplicateCode,

    /// The usage limit would be exceeded by another redemption.
    #[error("usage limit exhausted")]
    UsageExhausted,

    /// The store could not be reached.
    #[error("discount storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations for discounts. Soft-deleted discounts are invisible to
/// every lookup; only their codes become reusable.
#[automock]
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Fetches a discount by id.
    async fn find_by_id(&self, uuid: DiscountUuid) -> Result<DiscountRecord, RepositoryError>;

    /// Fetches a discount by its normalized code.
    async fn find_by_code(&self, code: &str) -> Result<DiscountRecord, RepositoryError>;

    /// Stores a new discount, refusing a code another live discount holds.
    async fn insert(&self, record: DiscountRecord) -> Result<DiscountRecord, RepositoryError>;

    /// Replaces a stored discount, keyed by its uuid.
    async fn update(&self, record: DiscountRecord) -> Result<DiscountRecord, RepositoryError>;

    /// Marks a discount deleted. Deleting an already-deleted discount succeeds.
    async fn soft_delete(&self, uuid: DiscountUuid) -> Result<(), RepositoryError>;

    /// Counts one redemption atomically, refusing to pass the usage limit.
    /// Returns the new usage count.
    async fn increment_usage(&self, uuid: DiscountUuid) -> Result<u64, RepositoryError>;

    /// Gives one redemption back, saturating at zero. Returns the new count.
    async fn release_usage(&self, uuid: DiscountUuid) -> Result<u64, RepositoryError>;

    /// All live discounts matching the filter, oldest first.
    async fn search(&self, filter: DiscountFilter) -> Result<Vec<DiscountRecord>, RepositoryError>;
}
