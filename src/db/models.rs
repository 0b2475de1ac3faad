use clickhouse::Row;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::models::{
    AutoClaimSettings, DividendDistribution, HolderEligibility, HolderInitialBag, HolderSnapshot,
};

// Unset timestamps are stored as the epoch.
fn to_column(value: Option<OffsetDateTime>) -> OffsetDateTime {
    value.unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn from_column(value: OffsetDateTime) -> Option<OffsetDateTime> {
    if value == OffsetDateTime::UNIX_EPOCH {
        None
    } else {
        Some(value)
    }
}

pub const SETTINGS_ROW_ID: u8 = 1;

#[derive(Debug, Row, Serialize, Deserialize)]
pub struct AutoClaimSettingsRecord {
    pub id: u8,
    pub enabled: bool,
    pub claim_interval_minutes: u32,
    pub distribution_percentage: f64,
    pub min_claim_amount: f64,
    pub wallet_address: String,
    pub token_mint: String,
    #[serde(with = "clickhouse::serde::time::datetime")]
    pub next_claim_scheduled: OffsetDateTime,
    #[serde(with = "clickhouse::serde::time::datetime")]
    pub last_successful_claim: OffsetDateTime,
}

impl From<&AutoClaimSettings> for AutoClaimSettingsRecord {
    fn from(settings: &AutoClaimSettings) -> Self {
        Self {
            id: SETTINGS_ROW_ID,
            enabled: settings.enabled,
            claim_interval_minutes: settings.claim_interval_minutes,
            distribution_percentage: settings.distribution_percentage,
            min_claim_amount: settings.min_claim_amount,
            wallet_address: settings.wallet_address.clone(),
            token_mint: settings.token_mint.clone(),
            next_claim_scheduled: to_column(settings.next_claim_scheduled),
            last_successful_claim: to_column(settings.last_successful_claim),
        }
    }
}

impl From<AutoClaimSettingsRecord> for AutoClaimSettings {
    fn from(record: AutoClaimSettingsRecord) -> Self {
        Self {
            enabled: record.enabled,
            claim_interval_minutes: record.claim_interval_minutes,
            distribution_percentage: record.distribution_percentage,
            min_claim_amount: record.min_claim_amount,
            wallet_address: record.wallet_address,
            token_mint: record.token_mint,
            next_claim_scheduled: from_column(record.next_claim_scheduled),
            last_successful_claim: from_column(record.last_successful_claim),
        }
    }
}

#[derive(Debug, Row, Serialize, Deserialize)]
pub struct HolderInitialBagRecord {
    pub asset_id: String,
    pub address: String,
    pub initial_balance: u64,
    pub initial_percentage: f64,
    #[serde(with = "clickhouse::serde::time::datetime")]
    pub first_recorded_at: OffsetDateTime,
}

impl From<&HolderInitialBag> for HolderInitialBagRecord {
    fn from(bag: &HolderInitialBag) -> Self {
        Self {
            asset_id: bag.asset_id.clone(),
            address: bag.address.clone(),
            initial_balance: bag.initial_balance,
            initial_percentage: bag.initial_percentage,
            first_recorded_at: bag.first_recorded_at,
        }
    }
}

impl From<HolderInitialBagRecord> for HolderInitialBag {
    fn from(record: HolderInitialBagRecord) -> Self {
        Self {
            address: record.address,
            initial_balance: record.initial_balance,
            initial_percentage: record.initial_percentage,
            asset_id: record.asset_id,
            first_recorded_at: record.first_recorded_at,
        }
    }
}

#[derive(Debug, Row, Serialize, Deserialize)]
pub struct HolderEligibilityRecord {
    pub asset_id: String,
    pub address: String,
    pub current_balance: u64,
    pub initial_balance: u64,
    pub retention_percentage: f64,
    pub is_eligible: bool,
    pub permanently_blacklisted: bool,
    #[serde(with = "clickhouse::serde::time::datetime")]
    pub blacklisted_at: OffsetDateTime,
    pub blacklist_reason: Option<String>,
}

impl HolderEligibilityRecord {
    pub fn new(asset_id: &str, row: &HolderEligibility) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            address: row.address.clone(),
            current_balance: row.current_balance,
            initial_balance: row.initial_balance,
            retention_percentage: row.retention_percentage,
            is_eligible: row.is_eligible,
            permanently_blacklisted: row.permanently_blacklisted,
            blacklisted_at: to_column(row.blacklisted_at),
            blacklist_reason: row.blacklist_reason.clone(),
        }
    }
}

impl From<HolderEligibilityRecord> for HolderEligibility {
    fn from(record: HolderEligibilityRecord) -> Self {
        Self {
            address: record.address,
            current_balance: record.current_balance,
            initial_balance: record.initial_balance,
            retention_percentage: record.retention_percentage,
            is_eligible: record.is_eligible,
            permanently_blacklisted: record.permanently_blacklisted,
            blacklisted_at: from_column(record.blacklisted_at),
            blacklist_reason: record.blacklist_reason,
        }
    }
}

#[derive(Debug, Row, Serialize)]
pub struct DividendClaimRecord {
    pub id: u64,
    pub claimed_amount: f64,
    pub distribution_amount: f64,
    pub total_supply: u64,
    pub holder_count: u32,
    pub status: String,
    pub transaction_id: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Row, Serialize)]
pub struct HolderSnapshotRecord {
    pub claim_id: u64,
    pub holder_address: String,
    pub token_balance: u64,
    pub percentage: f64,
    pub initial_balance: u64,
    pub retention_percentage: f64,
    pub is_eligible: bool,
}

impl From<&HolderSnapshot> for HolderSnapshotRecord {
    fn from(snapshot: &HolderSnapshot) -> Self {
        Self {
            claim_id: snapshot.claim_id,
            holder_address: snapshot.holder_address.clone(),
            token_balance: snapshot.token_balance,
            percentage: snapshot.percentage,
            initial_balance: snapshot.initial_balance,
            retention_percentage: snapshot.retention_percentage,
            is_eligible: snapshot.is_eligible,
        }
    }
}

#[derive(Debug, Row, Serialize)]
pub struct DividendDistributionRecord {
    pub claim_id: u64,
    pub holder_address: String,
    pub token_balance: u64,
    pub share_percentage: f64,
    pub dividend_amount: f64,
    pub status: String,
    pub transaction_signature: Option<String>,
    pub error_message: Option<String>,
    #[serde(with = "clickhouse::serde::time::datetime")]
    pub paid_at: OffsetDateTime,
}

impl From<&DividendDistribution> for DividendDistributionRecord {
    fn from(distribution: &DividendDistribution) -> Self {
        Self {
            claim_id: distribution.claim_id,
            holder_address: distribution.holder_address.clone(),
            token_balance: distribution.token_balance,
            share_percentage: distribution.share_percentage,
            dividend_amount: distribution.dividend_amount,
            status: distribution.status.as_str().to_string(),
            transaction_signature: distribution.transaction_signature.clone(),
            error_message: distribution.error_message.clone(),
            paid_at: to_column(distribution.paid_at),
        }
    }
}
