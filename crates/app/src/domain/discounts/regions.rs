//! Region collaborator.

use async_trait::async_trait;
use mockall::automock;
use redeem::catalog::RegionUuid;
use thiserror::Error;

/// Region Errors
#[derive(Debug, Error)]
pub enum RegionError {
    /// A discount referenced a region that does not exist.
    #[error("unknown region: {0}")]
    UnknownRegion(RegionUuid),
}

/// Verifies that region references point at real regions.
#[automock]
#[async_trait]
pub trait RegionService: Send + Sync {
    /// Checks every region id, failing on the first unknown one.
    async fn verify_regions(&self, regions: Vec<RegionUuid>) -> Result<(), RegionError>;
}
