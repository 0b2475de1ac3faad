use clickhouse::Client;
use anyhow::Result;

use crate::db::models::{
    AutoClaimSettingsRecord, HolderEligibilityRecord, HolderInitialBagRecord, SETTINGS_ROW_ID,
};
use crate::types::models::{AutoClaimSettings, HolderEligibility, HolderInitialBag};

pub async fn fetch_settings(client: &Client) -> Result<Option<AutoClaimSettings>> {
    let record = client
        .query("
            SELECT
                id,
                enabled,
                claim_interval_minutes,
                distribution_percentage,
                min_claim_amount,
                wallet_address,
                token_mint,
                next_claim_scheduled,
                last_successful_claim
            FROM auto_claim_settings FINAL
            WHERE id = ?
            LIMIT 1
        ")
        .bind(SETTINGS_ROW_ID)
        .fetch_one::<AutoClaimSettingsRecord>()
        .await;

    match record {
        Ok(record) => Ok(Some(record.into())),
        Err(clickhouse::error::Error::RowNotFound) => Ok(None),
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}

pub async fn fetch_initial_bags(client: &Client, asset_id: &str) -> Result<Vec<HolderInitialBag>> {
    let rows = client
        .query("
            SELECT
                asset_id,
                address,
                initial_balance,
                initial_percentage,
                first_recorded_at
            FROM holder_initial_bags FINAL
            WHERE asset_id = ?
        ")
        .bind(asset_id)
        .fetch_all::<HolderInitialBagRecord>()
        .await?;

    Ok(rows.into_iter().map(HolderInitialBag::from).collect())
}

pub async fn fetch_eligibility(client: &Client, asset_id: &str) -> Result<Vec<HolderEligibility>> {
    let rows = client
        .query("
            SELECT
                asset_id,
                address,
                current_balance,
                initial_balance,
                retention_percentage,
                is_eligible,
                permanently_blacklisted,
                blacklisted_at,
                blacklist_reason
            FROM holder_eligibility FINAL
            WHERE asset_id = ?
        ")
        .bind(asset_id)
        .fetch_all::<HolderEligibilityRecord>()
        .await?;

    Ok(rows.into_iter().map(HolderEligibility::from).collect())
}
