use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Minimum retention (current / initial balance, in percent) a holder needs to be paid.
pub const RETENTION_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HolderBalance {
    pub address: String,
    pub balance: u64,
}

/// Every address holding the asset, plus the circulating balance among them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HolderSet {
    pub holders: Vec<HolderBalance>,
    pub total_balance: u64,
}

impl HolderSet {
    pub fn new(holders: Vec<HolderBalance>) -> Self {
        let total_balance = holders.iter().map(|h| h.balance).sum();
        Self { holders, total_balance }
    }

    pub fn percentage_of(&self, balance: u64) -> f64 {
        if self.total_balance == 0 {
            return 0.0;
        }
        balance as f64 / self.total_balance as f64 * 100.0
    }

    pub fn balance_of(&self, address: &str) -> u64 {
        self.holders
            .iter()
            .find(|h| h.address == address)
            .map(|h| h.balance)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HolderInitialBag {
    pub address: String,
    pub initial_balance: u64,
    pub initial_percentage: f64,
    pub asset_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub first_recorded_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HolderEligibility {
    pub address: String,
    pub current_balance: u64,
    pub initial_balance: u64,
    pub retention_percentage: f64,
    pub is_eligible: bool,
    pub permanently_blacklisted: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub blacklisted_at: Option<OffsetDateTime>,
    pub blacklist_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Processing,
    Completed,
    Failed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Processing => "processing",
            ClaimStatus::Completed => "completed",
            ClaimStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionStatus {
    Pending,
    Completed,
    Failed,
}

impl DistributionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionStatus::Pending => "pending",
            DistributionStatus::Completed => "completed",
            DistributionStatus::Failed => "failed",
        }
    }
}

/// Values known when a fee claim succeeds; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDividendClaim {
    pub claimed_amount: f64,
    pub distribution_amount: f64,
    pub transaction_id: String,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendClaim {
    pub id: u64,
    pub claimed_amount: f64,
    pub distribution_amount: f64,
    pub total_supply: u64,
    pub holder_count: u32,
    pub status: ClaimStatus,
    pub transaction_id: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HolderSnapshot {
    pub claim_id: u64,
    pub holder_address: String,
    pub token_balance: u64,
    pub percentage: f64,
    pub initial_balance: u64,
    pub retention_percentage: f64,
    pub is_eligible: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendDistribution {
    pub claim_id: u64,
    pub holder_address: String,
    pub token_balance: u64,
    pub share_percentage: f64,
    pub dividend_amount: f64,
    pub status: DistributionStatus,
    pub transaction_signature: Option<String>,
    pub error_message: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AutoClaimSettings {
    pub enabled: bool,
    pub claim_interval_minutes: u32,
    pub distribution_percentage: f64,
    pub min_claim_amount: f64,
    pub wallet_address: String,
    pub token_mint: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub next_claim_scheduled: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_successful_claim: Option<OffsetDateTime>,
}

impl Default for AutoClaimSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            claim_interval_minutes: 60,
            distribution_percentage: 50.0,
            min_claim_amount: 0.01,
            wallet_address: "YOUR_WALLET_ADDRESS".to_string(),
            token_mint: "YOUR_TOKEN_MINT".to_string(),
            next_claim_scheduled: None,
            last_successful_claim: None,
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.starts_with("YOUR_")
        || value.to_ascii_lowercase().contains("placeholder")
}

impl AutoClaimSettings {
    pub fn has_placeholder_identifiers(&self) -> bool {
        is_placeholder(&self.wallet_address) || is_placeholder(&self.token_mint)
    }

    /// The stored flag, forced off while wallet or mint are unset.
    pub fn effectively_enabled(&self) -> bool {
        self.enabled && !self.has_placeholder_identifiers()
    }

    /// An unset schedule counts as due.
    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        match self.next_claim_scheduled {
            Some(next) => now >= next,
            None => true,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.claim_interval_minutes))
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.distribution_percentage > 0.0 && self.distribution_percentage <= 100.0) {
            return Err(format!(
                "distribution_percentage must be in (0, 100], got {}",
                self.distribution_percentage
            ));
        }
        if self.claim_interval_minutes < 1 {
            return Err("claim_interval_minutes must be at least 1".to_string());
        }
        if !(self.min_claim_amount >= 0.0) {
            return Err(format!(
                "min_claim_amount must not be negative, got {}",
                self.min_claim_amount
            ));
        }
        Ok(())
    }
}

/// Operator-editable settings. The schedule timestamps are owned by the
/// scheduler and are never taken from an admin request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SettingsUpdate {
    pub enabled: bool,
    pub claim_interval_minutes: u32,
    pub distribution_percentage: f64,
    pub min_claim_amount: f64,
    pub wallet_address: String,
    pub token_mint: String,
}

impl SettingsUpdate {
    pub fn apply_to(&self, settings: &mut AutoClaimSettings) {
        settings.enabled = self.enabled;
        settings.claim_interval_minutes = self.claim_interval_minutes;
        settings.distribution_percentage = self.distribution_percentage;
        settings.min_claim_amount = self.min_claim_amount;
        settings.wallet_address = self.wallet_address.clone();
        settings.token_mint = self.token_mint.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CycleReport {
    pub claim_id: u64,
    pub claimed_amount: f64,
    pub distribution_amount: f64,
    pub holder_count: u32,
    pub paid: u32,
    pub failed: u32,
    pub total_sent: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CycleOutcome {
    Disabled,
    NotDue {
        #[serde(with = "time::serde::rfc3339::option")]
        next_claim_scheduled: Option<OffsetDateTime>,
    },
    ClaimInProgress,
    ClaimFailed { reason: String },
    Completed(CycleReport),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CronStatus {
    pub running: bool,
    pub claim_in_progress: bool,
    pub interval_spec: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AutoClaimSettings {
        AutoClaimSettings {
            enabled: true,
            wallet_address: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string(),
            token_mint: "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_placeholder_identifiers_force_disabled() {
        assert!(configured().effectively_enabled());
        assert!(!AutoClaimSettings { enabled: true, ..Default::default() }.effectively_enabled());

        let mut settings = configured();
        settings.token_mint = "  ".to_string();
        assert!(!settings.effectively_enabled());

        let mut settings = configured();
        settings.wallet_address = "wallet_placeholder".to_string();
        assert!(!settings.effectively_enabled());
    }

    #[test]
    fn test_is_due() {
        let now = OffsetDateTime::now_utc();
        let mut settings = configured();
        assert!(settings.is_due(now));

        settings.next_claim_scheduled = Some(now + Duration::minutes(5));
        assert!(!settings.is_due(now));

        settings.next_claim_scheduled = Some(now);
        assert!(settings.is_due(now));
    }

    #[test]
    fn test_validate_rejects_bad_percentage() {
        let mut settings = configured();
        assert!(settings.validate().is_ok());

        settings.distribution_percentage = 0.0;
        assert!(settings.validate().is_err());

        settings.distribution_percentage = 100.5;
        assert!(settings.validate().is_err());

        settings.distribution_percentage = 100.0;
        settings.claim_interval_minutes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_update_keeps_schedule() {
        let next = OffsetDateTime::now_utc() + Duration::minutes(30);
        let mut settings = configured();
        settings.next_claim_scheduled = Some(next);
        settings.last_successful_claim = Some(next - Duration::minutes(30));

        // Extra schedule fields in the body are ignored.
        let update: SettingsUpdate = serde_json::from_str(
            r#"{"enabled":false,"claim_interval_minutes":15,"distribution_percentage":60.0,
                "min_claim_amount":0.5,"wallet_address":"w","token_mint":"m",
                "next_claim_scheduled":null}"#,
        )
        .unwrap();
        update.apply_to(&mut settings);

        assert!(!settings.enabled);
        assert_eq!(settings.claim_interval_minutes, 15);
        assert_eq!(settings.distribution_percentage, 60.0);
        assert_eq!(settings.token_mint, "m");
        assert_eq!(settings.next_claim_scheduled, Some(next));
        assert!(settings.last_successful_claim.is_some());
    }

    #[test]
    fn test_holder_set_percentages() {
        let set = HolderSet::new(vec![
            HolderBalance { address: "A".to_string(), balance: 100 },
            HolderBalance { address: "B".to_string(), balance: 300 },
        ]);
        assert_eq!(set.total_balance, 400);
        assert_eq!(set.percentage_of(100), 25.0);
        assert_eq!(set.balance_of("B"), 300);
        assert_eq!(set.balance_of("C"), 0);
        assert_eq!(HolderSet::default().percentage_of(10), 0.0);
    }
}
