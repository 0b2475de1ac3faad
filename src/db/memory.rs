//! In-memory stores used by unit tests.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::db::store::{AuditStore, LoyaltyStore, SettingsStore};
use crate::types::models::{
    AutoClaimSettings, ClaimStatus, DistributionStatus, DividendClaim, DividendDistribution,
    HolderEligibility, HolderInitialBag, HolderSnapshot, NewDividendClaim,
};

#[derive(Default)]
struct MemoryState {
    settings: Option<AutoClaimSettings>,
    claims: Vec<DividendClaim>,
    snapshots: Vec<HolderSnapshot>,
    distributions: Vec<DividendDistribution>,
    bags: HashMap<(String, String), HolderInitialBag>,
    eligibility: HashMap<(String, String), HolderEligibility>,
    fail_distribution_updates: bool,
    fail_snapshot_writes: bool,
    fail_schedule_updates: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn with_settings(settings: AutoClaimSettings) -> Self {
        let store = Self::default();
        store.state.try_lock().expect("fresh store").settings = Some(settings);
        store
    }

    pub async fn claims(&self) -> Vec<DividendClaim> {
        self.state.lock().await.claims.clone()
    }

    pub async fn snapshots(&self) -> Vec<HolderSnapshot> {
        self.state.lock().await.snapshots.clone()
    }

    pub async fn distributions(&self) -> Vec<DividendDistribution> {
        self.state.lock().await.distributions.clone()
    }

    pub async fn eligibility_of(&self, asset_id: &str, address: &str) -> Option<HolderEligibility> {
        self.state
            .lock()
            .await
            .eligibility
            .get(&(asset_id.to_string(), address.to_string()))
            .cloned()
    }

    pub async fn bag_of(&self, asset_id: &str, address: &str) -> Option<HolderInitialBag> {
        self.state
            .lock()
            .await
            .bags
            .get(&(asset_id.to_string(), address.to_string()))
            .cloned()
    }

    pub async fn stored_settings(&self) -> Option<AutoClaimSettings> {
        self.state.lock().await.settings.clone()
    }

    pub async fn fail_distribution_updates(&self) {
        self.state.lock().await.fail_distribution_updates = true;
    }

    pub async fn fail_snapshot_writes(&self) {
        self.state.lock().await.fail_snapshot_writes = true;
    }

    pub async fn fail_schedule_updates(&self) {
        self.state.lock().await.fail_schedule_updates = true;
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self) -> Result<AutoClaimSettings> {
        let mut state = self.state.lock().await;
        Ok(state.settings.get_or_insert_with(AutoClaimSettings::default).clone())
    }

    async fn find(&self) -> Result<Option<AutoClaimSettings>> {
        Ok(self.state.lock().await.settings.clone())
    }

    async fn save(&self, settings: &AutoClaimSettings) -> Result<()> {
        self.state.lock().await.settings = Some(settings.clone());
        Ok(())
    }

    async fn set_next_schedule(
        &self,
        next_claim_scheduled: OffsetDateTime,
        last_successful_claim: OffsetDateTime,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_schedule_updates {
            return Err(anyhow!("settings table unavailable"));
        }
        let settings = state.settings.get_or_insert_with(AutoClaimSettings::default);
        settings.next_claim_scheduled = Some(next_claim_scheduled);
        settings.last_successful_claim = Some(last_successful_claim);
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn create_claim(&self, claim: &NewDividendClaim) -> Result<u64> {
        let mut state = self.state.lock().await;
        let id = state.claims.len() as u64 + 1;
        state.claims.push(DividendClaim {
            id,
            claimed_amount: claim.claimed_amount,
            distribution_amount: claim.distribution_amount,
            total_supply: 0,
            holder_count: 0,
            status: ClaimStatus::Processing,
            transaction_id: claim.transaction_id.clone(),
            error_message: None,
        });
        Ok(id)
    }

    async fn record_claim_holders(&self, claim_id: u64, total_supply: u64, holder_count: u32) -> Result<()> {
        let mut state = self.state.lock().await;
        let claim = state
            .claims
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or_else(|| anyhow!("unknown claim {}", claim_id))?;
        claim.total_supply = total_supply;
        claim.holder_count = holder_count;
        Ok(())
    }

    async fn update_claim_status(
        &self,
        claim_id: u64,
        status: ClaimStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let claim = state
            .claims
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or_else(|| anyhow!("unknown claim {}", claim_id))?;
        claim.status = status;
        claim.error_message = error_message.map(str::to_string);
        Ok(())
    }

    async fn create_snapshots(&self, snapshots: &[HolderSnapshot]) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_snapshot_writes {
            return Err(anyhow!("holder_snapshots insert failed"));
        }
        state.snapshots.extend_from_slice(snapshots);
        Ok(())
    }

    async fn create_distributions(&self, distributions: &[DividendDistribution]) -> Result<()> {
        self.state.lock().await.distributions.extend_from_slice(distributions);
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
        let mut state = self.state.lock().await;
        if state.fail_distribution_updates {
            return Err(anyhow!("audit store unavailable"));
        }
        let row = state
            .distributions
            .iter_mut()
            .find(|d| d.claim_id == claim_id && d.holder_address == holder_address)
            .ok_or_else(|| anyhow!("unknown distribution {}/{}", claim_id, holder_address))?;
        row.status = status;
        row.transaction_signature = signature.map(str::to_string);
        row.error_message = error_message.map(str::to_string);
        if status == DistributionStatus::Completed {
            row.paid_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }
}

#[async_trait]
impl LoyaltyStore for MemoryStore {
    async fn initial_bags(&self, asset_id: &str) -> Result<Vec<HolderInitialBag>> {
        let state = self.state.lock().await;
        Ok(state
            .bags
            .iter()
            .filter(|((asset, _), _)| asset == asset_id)
            .map(|(_, bag)| bag.clone())
            .collect())
    }

    async fn eligibility(&self, asset_id: &str) -> Result<Vec<HolderEligibility>> {
        let state = self.state.lock().await;
        Ok(state
            .eligibility
            .iter()
            .filter(|((asset, _), _)| asset == asset_id)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn insert_initial_bags(&self, bags: &[HolderInitialBag]) -> Result<()> {
        let mut state = self.state.lock().await;
        for bag in bags {
            state
                .bags
                .insert((bag.asset_id.clone(), bag.address.clone()), bag.clone());
        }
        Ok(())
    }

    async fn upsert_eligibility(&self, asset_id: &str, rows: &[HolderEligibility]) -> Result<()> {
        let mut state = self.state.lock().await;
        for row in rows {
            state
                .eligibility
                .insert((asset_id.to_string(), row.address.clone()), row.clone());
        }
        Ok(())
    }

    async fn reset_baseline(
        &self,
        asset_id: &str,
        address: &str,
        baseline: Option<(&HolderInitialBag, &HolderEligibility)>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let key = (asset_id.to_string(), address.to_string());
        match baseline {
            Some((bag, eligibility)) => {
                state.bags.insert(key.clone(), bag.clone());
                state.eligibility.insert(key, eligibility.clone());
            }
            None => {
                state.bags.remove(&key);
                state.eligibility.remove(&key);
            }
        }
        Ok(())
    }
}
