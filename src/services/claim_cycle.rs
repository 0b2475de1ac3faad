use std::sync::Arc;

use time::OffsetDateTime;

use crate::db::store::{AuditStore, LoyaltyStore, SettingsStore};
use crate::error::{EngineError, EngineResult};
use crate::services::distribution::{calculate_distribution, HolderShare};
use crate::services::fee_claim::{claim_fees, FeeClaimService};
use crate::services::holders::HolderRegistry;
use crate::services::loyalty::LoyaltyLedger;
use crate::services::payment::{sol_to_lamports, PaymentExecutor};
use crate::types::models::{
    AutoClaimSettings, ClaimStatus, CycleOutcome, CycleReport, DistributionStatus,
    DividendDistribution, HolderBalance, HolderEligibility, HolderSnapshot, NewDividendClaim,
    SettingsUpdate,
};

/// Result of one transfer attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentResult {
    Sent { address: String, amount: f64, signature: String },
    Failed { address: String, amount: f64, reason: String },
}

impl PaymentResult {
    pub fn address(&self) -> &str {
        match self {
            PaymentResult::Sent { address, .. } | PaymentResult::Failed { address, .. } => address,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub results: Vec<PaymentResult>,
}

impl BatchResult {
    pub fn paid(&self) -> u32 {
        self.results.iter().filter(|r| matches!(r, PaymentResult::Sent { .. })).count() as u32
    }

    pub fn failed(&self) -> u32 {
        self.results.iter().filter(|r| matches!(r, PaymentResult::Failed { .. })).count() as u32
    }

    pub fn failed_addresses(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| matches!(r, PaymentResult::Failed { .. }))
            .map(PaymentResult::address)
            .collect()
    }

    pub fn total_sent(&self) -> f64 {
        self.results
            .iter()
            .map(|r| match r {
                PaymentResult::Sent { amount, .. } => *amount,
                PaymentResult::Failed { .. } => 0.0,
            })
            .sum()
    }
}

/// One end-to-end claim cycle: claim, evaluate, snapshot, plan, pay, complete.
///
/// Not reentrant; [`crate::services::scheduler::ClaimScheduler`] guarantees a
/// single caller at a time.
pub struct DividendEngine {
    settings: Arc<dyn SettingsStore>,
    audit: Arc<dyn AuditStore>,
    ledger: LoyaltyLedger,
    fee_claim: Arc<dyn FeeClaimService>,
    registry: Arc<dyn HolderRegistry>,
    payments: Arc<dyn PaymentExecutor>,
}

impl DividendEngine {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        audit: Arc<dyn AuditStore>,
        loyalty: Arc<dyn LoyaltyStore>,
        fee_claim: Arc<dyn FeeClaimService>,
        registry: Arc<dyn HolderRegistry>,
        payments: Arc<dyn PaymentExecutor>,
    ) -> Self {
        Self {
            settings,
            audit,
            ledger: LoyaltyLedger::new(loyalty),
            fee_claim,
            registry,
            payments,
        }
    }

    pub async fn load_settings(&self) -> EngineResult<AutoClaimSettings> {
        self.settings.get().await.map_err(EngineError::persistence)
    }

    /// Stored settings for read-only callers; defaults when nothing is stored yet.
    pub async fn peek_settings(&self) -> EngineResult<AutoClaimSettings> {
        let stored = self.settings.find().await.map_err(EngineError::persistence)?;
        Ok(stored.unwrap_or_default())
    }

    /// Applies an admin update on top of the stored row, keeping the schedule.
    pub async fn save_settings(&self, update: &SettingsUpdate) -> EngineResult<AutoClaimSettings> {
        let mut settings = self.load_settings().await?;
        update.apply_to(&mut settings);
        settings.validate().map_err(EngineError::Configuration)?;
        self.settings
            .save(&settings)
            .await
            .map_err(EngineError::persistence)?;
        Ok(settings)
    }

    pub async fn rearm(&self, settings: &AutoClaimSettings, now: OffsetDateTime) -> EngineResult<OffsetDateTime> {
        let next = now + settings.interval();
        self.settings
            .set_next_schedule(next, now)
            .await
            .map_err(EngineError::persistence)?;
        Ok(next)
    }

    pub async fn run_cycle(&self, settings: &AutoClaimSettings) -> EngineResult<CycleOutcome> {
        if settings.has_placeholder_identifiers() {
            return Err(EngineError::Configuration(
                "wallet address or token mint is not configured".to_string(),
            ));
        }

        let fees = match claim_fees(self.fee_claim.as_ref(), settings).await {
            Ok(fees) => fees,
            Err(EngineError::Claim(reason)) => {
                tracing::warn!("Fee claim failed, retrying at next scheduled run: {}", reason);
                return Ok(CycleOutcome::ClaimFailed { reason });
            }
            Err(e) => return Err(e),
        };

        // Recorded before any read that could fail, so claimed funds always have a row.
        let claim_id = self
            .audit
            .create_claim(&NewDividendClaim {
                claimed_amount: fees.claimed_amount,
                distribution_amount: fees.distribution_amount,
                transaction_id: fees.transaction_id.clone(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    "CRITICAL: fees claimed in {} ({} SOL) but claim record could not be written: {:#}",
                    fees.transaction_id,
                    fees.claimed_amount,
                    e
                );
                EngineError::persistence(e)
            })?;

        let (shares, holder_count) = match self.plan(claim_id, settings, fees.distribution_amount).await {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail_claim(claim_id, e).await),
        };

        let batch = self.pay(claim_id, &shares).await;

        if let Err(e) = self
            .audit
            .update_claim_status(claim_id, ClaimStatus::Completed, None)
            .await
        {
            tracing::error!("CRITICAL: claim {} paid out but could not be marked completed: {:#}", claim_id, e);
        }

        let report = CycleReport {
            claim_id,
            claimed_amount: fees.claimed_amount,
            distribution_amount: fees.distribution_amount,
            holder_count,
            paid: batch.paid(),
            failed: batch.failed(),
            total_sent: batch.total_sent(),
        };
        if report.failed > 0 {
            tracing::warn!(
                "Claim {} left unpaid: {}",
                claim_id,
                batch.failed_addresses().join(", ")
            );
        }
        tracing::info!(
            "Claim {} completed: {} eligible holders, {} paid, {} failed, {} SOL sent",
            claim_id,
            report.holder_count,
            report.paid,
            report.failed,
            report.total_sent
        );
        Ok(CycleOutcome::Completed(report))
    }

    /// Evaluates loyalty, records snapshots and pending distributions.
    /// Nothing is paid until this returns.
    async fn plan(
        &self,
        claim_id: u64,
        settings: &AutoClaimSettings,
        distribution_amount: f64,
    ) -> EngineResult<(Vec<HolderShare>, u32)> {
        let holders = self
            .registry
            .get_holders(&settings.token_mint)
            .await
            .map_err(|e| EngineError::HolderFetch(format!("{:#}", e)))?;

        let now = OffsetDateTime::now_utc();
        let evaluations = self
            .ledger
            .evaluate(&settings.token_mint, &holders, now)
            .await
            .map_err(EngineError::persistence)?;

        let snapshots: Vec<HolderSnapshot> = evaluations
            .iter()
            .map(|e| HolderSnapshot {
                claim_id,
                holder_address: e.address.clone(),
                token_balance: e.balance,
                percentage: e.percentage,
                initial_balance: e.initial_balance,
                retention_percentage: e.retention_percentage,
                is_eligible: e.is_eligible(),
            })
            .collect();
        self.audit
            .create_snapshots(&snapshots)
            .await
            .map_err(EngineError::persistence)?;

        let eligible: Vec<HolderBalance> = evaluations
            .iter()
            .filter(|e| e.is_eligible())
            .map(|e| HolderBalance {
                address: e.address.clone(),
                balance: e.balance,
            })
            .collect();
        let holder_count = eligible.len() as u32;

        self.audit
            .record_claim_holders(claim_id, holders.total_balance, holder_count)
            .await
            .map_err(EngineError::persistence)?;

        if eligible.is_empty() {
            tracing::warn!(
                "No eligible holders for claim {}; {} SOL left unallocated",
                claim_id,
                distribution_amount
            );
            return Ok((Vec::new(), 0));
        }

        let shares = calculate_distribution(&eligible, distribution_amount);
        let distributions: Vec<DividendDistribution> = shares
            .iter()
            .map(|share| DividendDistribution {
                claim_id,
                holder_address: share.address.clone(),
                token_balance: share.balance,
                share_percentage: share.share_percentage,
                dividend_amount: share.amount,
                status: DistributionStatus::Pending,
                transaction_signature: None,
                error_message: None,
                paid_at: None,
            })
            .collect();
        self.audit
            .create_distributions(&distributions)
            .await
            .map_err(EngineError::persistence)?;

        tracing::info!(
            "Claim {}: {} of {} holders eligible, {} SOL planned",
            claim_id,
            holder_count,
            evaluations.len(),
            distribution_amount
        );
        Ok((shares, holder_count))
    }

    /// Pays each share in order, one transfer at a time.
    async fn pay(&self, claim_id: u64, shares: &[HolderShare]) -> BatchResult {
        let mut batch = BatchResult::default();

        for share in shares {
            let lamports = sol_to_lamports(share.amount);
            let result = match self.payments.send_transfer(&share.address, lamports).await {
                Ok(signature) => PaymentResult::Sent {
                    address: share.address.clone(),
                    amount: share.amount,
                    signature,
                },
                Err(e) => {
                    let reason = format!("{:#}", e);
                    tracing::warn!(
                        "{}",
                        EngineError::Payment {
                            address: share.address.clone(),
                            reason: reason.clone(),
                        }
                    );
                    PaymentResult::Failed {
                        address: share.address.clone(),
                        amount: share.amount,
                        reason,
                    }
                }
            };

            let update = match &result {
                PaymentResult::Sent { signature, .. } => {
                    self.audit
                        .update_distribution(
                            claim_id,
                            &share.address,
                            DistributionStatus::Completed,
                            Some(signature.as_str()),
                            None,
                        )
                        .await
                }
                PaymentResult::Failed { reason, .. } => {
                    self.audit
                        .update_distribution(
                            claim_id,
                            &share.address,
                            DistributionStatus::Failed,
                            None,
                            Some(reason.as_str()),
                        )
                        .await
                }
            };
            if let Err(e) = update {
                tracing::error!(
                    "CRITICAL: distribution record for {} in claim {} is out of sync ({:?}): {:#}",
                    share.address,
                    claim_id,
                    result,
                    e
                );
            }

            batch.results.push(result);
        }

        batch
    }

    async fn fail_claim(&self, claim_id: u64, error: EngineError) -> EngineError {
        tracing::error!("Claim {} failed before payout: {}", claim_id, error);
        if let Err(e) = self
            .audit
            .update_claim_status(claim_id, ClaimStatus::Failed, Some(&error.to_string()))
            .await
        {
            tracing::error!("CRITICAL: claim {} could not be marked failed: {:#}", claim_id, e);
        }
        error
    }

    /// Restarts loyalty tracking for `address` from its current balance.
    pub async fn reset_baseline(&self, address: &str) -> EngineResult<Option<HolderEligibility>> {
        let settings = self.load_settings().await?;
        if settings.has_placeholder_identifiers() {
            return Err(EngineError::Configuration("token mint is not configured".to_string()));
        }
        let holders = self
            .registry
            .get_holders(&settings.token_mint)
            .await
            .map_err(|e| EngineError::HolderFetch(format!("{:#}", e)))?;
        self.ledger
            .reset_baseline(&settings.token_mint, address, &holders, OffsetDateTime::now_utc())
            .await
            .map_err(EngineError::persistence)
    }
}
