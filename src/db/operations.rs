use anyhow::Result;
use async_trait::async_trait;
use clickhouse::Client;
use time::OffsetDateTime;

use crate::db::models::{
    AutoClaimSettingsRecord, DividendClaimRecord, DividendDistributionRecord,
    HolderEligibilityRecord, HolderInitialBagRecord, HolderSnapshotRecord,
};
use crate::db::queries::{fetch_eligibility, fetch_initial_bags, fetch_settings};
use crate::db::store::{AuditStore, LoyaltyStore, SettingsStore};
use crate::types::models::{
    AutoClaimSettings, ClaimStatus, DistributionStatus, DividendDistribution, HolderEligibility,
    HolderInitialBag, HolderSnapshot, NewDividendClaim,
};

/// ClickHouse-backed implementation of every store the engine writes to.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: Client,
}

impl ClickHouseStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn insert_settings(&self, settings: &AutoClaimSettings) -> Result<()> {
        let mut insert = self.client.insert("auto_claim_settings")?;
        insert.write(&AutoClaimSettingsRecord::from(settings)).await?;
        insert.end().await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for ClickHouseStore {
    async fn get(&self) -> Result<AutoClaimSettings> {
        match fetch_settings(&self.client).await? {
            Some(settings) => Ok(settings),
            None => {
                tracing::info!("No auto-claim settings stored, inserting defaults");
                let settings = AutoClaimSettings::default();
                self.insert_settings(&settings).await?;
                Ok(settings)
            }
        }
    }

    async fn find(&self) -> Result<Option<AutoClaimSettings>> {
        fetch_settings(&self.client).await
    }

    async fn save(&self, settings: &AutoClaimSettings) -> Result<()> {
        self.insert_settings(settings).await
    }

    async fn set_next_schedule(
        &self,
        next_claim_scheduled: OffsetDateTime,
        last_successful_claim: OffsetDateTime,
    ) -> Result<()> {
        let mut settings = self.get().await?;
        settings.next_claim_scheduled = Some(next_claim_scheduled);
        settings.last_successful_claim = Some(last_successful_claim);
        self.insert_settings(&settings).await
    }
}

#[async_trait]
impl AuditStore for ClickHouseStore {
    async fn create_claim(&self, claim: &NewDividendClaim) -> Result<u64> {
        let id = OffsetDateTime::now_utc().unix_timestamp_nanos() as u64;

        let mut insert = self.client.insert("dividend_claims")?;
        insert
            .write(&DividendClaimRecord {
                id,
                claimed_amount: claim.claimed_amount,
                distribution_amount: claim.distribution_amount,
                total_supply: 0,
                holder_count: 0,
                status: ClaimStatus::Processing.as_str().to_string(),
                transaction_id: claim.transaction_id.clone(),
                error_message: None,
            })
            .await?;
        insert.end().await?;

        Ok(id)
    }

    async fn record_claim_holders(&self, claim_id: u64, total_supply: u64, holder_count: u32) -> Result<()> {
        self.client
            .query(
                "ALTER TABLE dividend_claims
                 UPDATE total_supply = ?, holder_count = ?
                 WHERE id = ?
                 SETTINGS mutations_sync = 1"
            )
            .bind(total_supply)
            .bind(holder_count)
            .bind(claim_id)
            .execute()
            .await?;
        Ok(())
    }

    async fn update_claim_status(
        &self,
        claim_id: u64,
        status: ClaimStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        self.client
            .query(
                "ALTER TABLE dividend_claims
                 UPDATE status = ?, error_message = ?
                 WHERE id = ?
                 SETTINGS mutations_sync = 1"
            )
            .bind(status.as_str())
            .bind(error_message)
            .bind(claim_id)
            .execute()
            .await?;
        Ok(())
    }

    async fn create_snapshots(&self, snapshots: &[HolderSnapshot]) -> Result<()> {
        if snapshots.is_empty() {
            return Ok(());
        }
        let mut insert = self.client.insert("holder_snapshots")?;
        for snapshot in snapshots {
            insert.write(&HolderSnapshotRecord::from(snapshot)).await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn create_distributions(&self, distributions: &[DividendDistribution]) -> Result<()> {
        if distributions.is_empty() {
            return Ok(());
        }
        let mut insert = self.client.insert("dividend_distributions")?;
        for distribution in distributions {
            insert.write(&DividendDistributionRecord::from(distribution)).await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn update_distribution(
        &self,
        claim_id: u64,
        holder_address: &str,
        status: DistributionStatus,
        signature: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<()> {
        let paid_at = match status {
            DistributionStatus::Completed => OffsetDateTime::now_utc(),
            _ => OffsetDateTime::UNIX_EPOCH,
        };

        self.client
            .query(
                "ALTER TABLE dividend_distributions
                 UPDATE status = ?, transaction_signature = ?, error_message = ?, paid_at = toDateTime(?, 'UTC')
                 WHERE claim_id = ? AND holder_address = ?
                 SETTINGS mutations_sync = 1"
            )
            .bind(status.as_str())
            .bind(signature)
            .bind(error_message)
            .bind(paid_at.unix_timestamp())
            .bind(claim_id)
            .bind(holder_address)
            .execute()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LoyaltyStore for ClickHouseStore {
    async fn initial_bags(&self, asset_id: &str) -> Result<Vec<HolderInitialBag>> {
        fetch_initial_bags(&self.client, asset_id).await
    }

    async fn eligibility(&self, asset_id: &str) -> Result<Vec<HolderEligibility>> {
        fetch_eligibility(&self.client, asset_id).await
    }

    async fn insert_initial_bags(&self, bags: &[HolderInitialBag]) -> Result<()> {
        if bags.is_empty() {
            return Ok(());
        }
        let mut insert = self.client.insert("holder_initial_bags")?;
        for bag in bags {
            insert.write(&HolderInitialBagRecord::from(bag)).await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn upsert_eligibility(&self, asset_id: &str, rows: &[HolderEligibility]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut insert = self.client.insert("holder_eligibility")?;
        for row in rows {
            insert.write(&HolderEligibilityRecord::new(asset_id, row)).await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn reset_baseline(
        &self,
        asset_id: &str,
        address: &str,
        baseline: Option<(&HolderInitialBag, &HolderEligibility)>,
    ) -> Result<()> {
        match baseline {
            Some((bag, eligibility)) => {
                self.insert_initial_bags(std::slice::from_ref(bag)).await?;
                self.upsert_eligibility(asset_id, std::slice::from_ref(eligibility)).await?;
            }
            None => {
                for table in ["holder_initial_bags", "holder_eligibility"] {
                    self.client
                        .query(&format!(
                            "ALTER TABLE {} DELETE WHERE asset_id = ? AND address = ? SETTINGS mutations_sync = 1",
                            table
                        ))
                        .bind(asset_id)
                        .bind(address)
                        .execute()
                        .await?;
                }
            }
        }
        Ok(())
    }
}
