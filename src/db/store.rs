use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;

use crate::types::models::{
    AutoClaimSettings, ClaimStatus, DistributionStatus, DividendDistribution, HolderEligibility,
    HolderInitialBag, HolderSnapshot, NewDividendClaim,
};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the stored settings, creating the default row when none exists.
    async fn get(&self) -> Result<AutoClaimSettings>;

    /// Reads the stored settings without creating a row.
    async fn find(&self) -> Result<Option<AutoClaimSettings>>;

    async fn save(&self, settings: &AutoClaimSettings) -> Result<()>;

    /// Re-arms the schedule after a successful cycle.
    async fn set_next_schedule(
        &self,
        next_claim_scheduled: OffsetDateTime,
        last_successful_claim: OffsetDateTime,
    ) -> Result<()>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persists a claim in `processing` state and returns its id.
    async fn create_claim(&self, claim: &NewDividendClaim) -> Result<u64>;

    async fn record_claim_holders(&self, claim_id: u64, total_supply: u64, holder_count: u32) -> Result<()>;

    async fn update_claim_status(
        &self,
        claim_id: u64,
        status: ClaimStatus,
        error_message: Option<&str>,
    ) -> Result<()>;

    async fn create_snapshots(&self, snapshots: &[HolderSnapshot]) -> Result<()>;

    async fn create_distributions(&self, distributions: &[DividendDistribution]) -> Result<()>;

    async fn update_distribution(
        &self,
        claim_id: u64,
        holder_address: &str,
        status: DistributionStatus,
        signature: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<()>;
}

/// Per-holder loyalty rows, scoped by asset.
#[async_trait]
pub trait LoyaltyStore: Send + Sync {
    async fn initial_bags(&self, asset_id: &str) -> Result<Vec<HolderInitialBag>>;

    async fn eligibility(&self, asset_id: &str) -> Result<Vec<HolderEligibility>>;

    async fn insert_initial_bags(&self, bags: &[HolderInitialBag]) -> Result<()>;

    async fn upsert_eligibility(&self, asset_id: &str, rows: &[HolderEligibility]) -> Result<()>;

    /// Replaces the baseline bag, or forgets the address entirely when `bag` is `None`.
    async fn reset_baseline(
        &self,
        asset_id: &str,
        address: &str,
        bag: Option<(&HolderInitialBag, &HolderEligibility)>,
    ) -> Result<()>;
}
