use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use time::OffsetDateTime;

use crate::db::store::LoyaltyStore;
use crate::types::models::{HolderEligibility, HolderInitialBag, HolderSet, RETENTION_THRESHOLD};

/// Loyalty standing of one address against its initial bag.
///
/// `PermanentlyBlacklisted` is terminal: [`LoyaltyState::transition`] never
/// leaves it. Only a baseline reset, which discards the state, brings the
/// address back.
#[derive(Debug, Clone, PartialEq)]
pub enum LoyaltyState {
    New,
    Eligible,
    TempBlacklisted { reason: String, since: OffsetDateTime },
    PermanentlyBlacklisted { reason: String, since: OffsetDateTime },
}

pub fn retention_percentage(current_balance: u64, initial_balance: u64) -> f64 {
    if initial_balance == 0 {
        return 0.0;
    }
    current_balance as f64 / initial_balance as f64 * 100.0
}

impl LoyaltyState {
    pub fn from_row(row: Option<&HolderEligibility>) -> Self {
        let Some(row) = row else {
            return LoyaltyState::New;
        };
        let since = row.blacklisted_at.unwrap_or(OffsetDateTime::UNIX_EPOCH);
        let reason = row.blacklist_reason.clone().unwrap_or_default();
        if row.permanently_blacklisted {
            LoyaltyState::PermanentlyBlacklisted { reason, since }
        } else if row.is_eligible {
            LoyaltyState::Eligible
        } else {
            LoyaltyState::TempBlacklisted { reason, since }
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, LoyaltyState::New | LoyaltyState::Eligible)
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, LoyaltyState::PermanentlyBlacklisted { .. })
    }

    /// Next state given the latest balance. Zero balance is checked before retention.
    pub fn transition(&self, initial_balance: u64, current_balance: u64, now: OffsetDateTime) -> Self {
        if self.is_permanent() {
            return self.clone();
        }
        if current_balance == 0 {
            return LoyaltyState::PermanentlyBlacklisted {
                reason: "Balance reached zero; permanently excluded from dividends".to_string(),
                since: now,
            };
        }
        if let LoyaltyState::New = self {
            return LoyaltyState::Eligible;
        }

        let retention = retention_percentage(current_balance, initial_balance);
        if retention >= RETENTION_THRESHOLD {
            return LoyaltyState::Eligible;
        }

        let reason = format!(
            "Retention {:.2}% below {:.0}% threshold (recoverable)",
            retention, RETENTION_THRESHOLD
        );
        let since = match self {
            LoyaltyState::TempBlacklisted { since, .. } => *since,
            _ => now,
        };
        LoyaltyState::TempBlacklisted { reason, since }
    }

    pub fn to_row(&self, address: &str, initial_balance: u64, current_balance: u64) -> HolderEligibility {
        let (blacklisted_at, blacklist_reason) = match self {
            LoyaltyState::New | LoyaltyState::Eligible => (None, None),
            LoyaltyState::TempBlacklisted { reason, since }
            | LoyaltyState::PermanentlyBlacklisted { reason, since } => {
                (Some(*since), Some(reason.clone()))
            }
        };
        HolderEligibility {
            address: address.to_string(),
            current_balance,
            initial_balance,
            retention_percentage: retention_percentage(current_balance, initial_balance),
            is_eligible: self.is_eligible(),
            permanently_blacklisted: self.is_permanent(),
            blacklisted_at,
            blacklist_reason,
        }
    }
}

/// Outcome of one holder's evaluation in a claim cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct HolderEvaluation {
    pub address: String,
    pub balance: u64,
    pub percentage: f64,
    pub initial_balance: u64,
    pub retention_percentage: f64,
    pub state: LoyaltyState,
}

impl HolderEvaluation {
    pub fn is_eligible(&self) -> bool {
        self.state.is_eligible()
    }
}

pub struct LoyaltyLedger {
    store: Arc<dyn LoyaltyStore>,
}

impl LoyaltyLedger {
    pub fn new(store: Arc<dyn LoyaltyStore>) -> Self {
        Self { store }
    }

    /// Applies this cycle's balances to every known and newly seen holder and
    /// persists the result.
    ///
    /// Tracked addresses missing from `holders` hold nothing and are evaluated
    /// at zero balance. Those already permanently blacklisted are left out.
    pub async fn evaluate(
        &self,
        asset_id: &str,
        holders: &HolderSet,
        now: OffsetDateTime,
    ) -> Result<Vec<HolderEvaluation>> {
        let bags: HashMap<String, HolderInitialBag> = self
            .store
            .initial_bags(asset_id)
            .await?
            .into_iter()
            .map(|bag| (bag.address.clone(), bag))
            .collect();
        let previous: HashMap<String, HolderEligibility> = self
            .store
            .eligibility(asset_id)
            .await?
            .into_iter()
            .map(|row| (row.address.clone(), row))
            .collect();

        let mut new_bags = Vec::new();
        let mut evaluations = Vec::with_capacity(holders.holders.len());

        for holder in &holders.holders {
            let percentage = holders.percentage_of(holder.balance);
            let (initial_balance, prev_state) = match bags.get(&holder.address) {
                Some(bag) => {
                    // A bag without an eligibility row was recorded but never evaluated.
                    let state = match previous.get(&holder.address) {
                        Some(row) => LoyaltyState::from_row(Some(row)),
                        None => LoyaltyState::Eligible,
                    };
                    (bag.initial_balance, state)
                }
                None => {
                    tracing::info!(
                        "New holder {} recorded with initial balance {} ({:.4}%)",
                        holder.address,
                        holder.balance,
                        percentage
                    );
                    new_bags.push(HolderInitialBag {
                        address: holder.address.clone(),
                        initial_balance: holder.balance,
                        initial_percentage: percentage,
                        asset_id: asset_id.to_string(),
                        first_recorded_at: now,
                    });
                    (holder.balance, LoyaltyState::New)
                }
            };

            let state = prev_state.transition(initial_balance, holder.balance, now);
            log_transition(&holder.address, &prev_state, &state);
            evaluations.push(HolderEvaluation {
                address: holder.address.clone(),
                balance: holder.balance,
                percentage,
                initial_balance,
                retention_percentage: retention_percentage(holder.balance, initial_balance),
                state,
            });
        }

        let observed: HashSet<&str> = holders.holders.iter().map(|h| h.address.as_str()).collect();
        let mut exited: Vec<&HolderInitialBag> = bags
            .values()
            .filter(|bag| !observed.contains(bag.address.as_str()))
            .collect();
        exited.sort_by(|a, b| a.address.cmp(&b.address));

        for bag in exited {
            let prev_state = LoyaltyState::from_row(previous.get(&bag.address));
            if prev_state.is_permanent() {
                continue;
            }
            let state = prev_state.transition(bag.initial_balance, 0, now);
            log_transition(&bag.address, &prev_state, &state);
            evaluations.push(HolderEvaluation {
                address: bag.address.clone(),
                balance: 0,
                percentage: 0.0,
                initial_balance: bag.initial_balance,
                retention_percentage: 0.0,
                state,
            });
        }

        let rows: Vec<HolderEligibility> = evaluations
            .iter()
            .map(|e| e.state.to_row(&e.address, e.initial_balance, e.balance))
            .collect();

        self.store.insert_initial_bags(&new_bags).await?;
        self.store.upsert_eligibility(asset_id, &rows).await?;

        let eligible = evaluations.iter().filter(|e| e.is_eligible()).count();
        tracing::info!(
            "Loyalty evaluation: {} holders evaluated, {} eligible, {} new",
            evaluations.len(),
            eligible,
            new_bags.len()
        );

        Ok(evaluations)
    }

    /// Restarts loyalty tracking for `address` from its current balance.
    pub async fn reset_baseline(
        &self,
        asset_id: &str,
        address: &str,
        holders: &HolderSet,
        now: OffsetDateTime,
    ) -> Result<Option<HolderEligibility>> {
        let balance = holders.balance_of(address);
        if balance == 0 {
            tracing::info!("Baseline reset for {}: no balance, loyalty history removed", address);
            self.store.reset_baseline(asset_id, address, None).await?;
            return Ok(None);
        }

        let bag = HolderInitialBag {
            address: address.to_string(),
            initial_balance: balance,
            initial_percentage: holders.percentage_of(balance),
            asset_id: asset_id.to_string(),
            first_recorded_at: now,
        };
        let eligibility = LoyaltyState::Eligible.to_row(address, balance, balance);
        self.store
            .reset_baseline(asset_id, address, Some((&bag, &eligibility)))
            .await?;
        tracing::info!("Baseline reset for {}: new initial balance {}", address, balance);
        Ok(Some(eligibility))
    }
}

fn log_transition(address: &str, from: &LoyaltyState, to: &LoyaltyState) {
    match (from, to) {
        (LoyaltyState::PermanentlyBlacklisted { .. }, _) => {}
        (_, LoyaltyState::PermanentlyBlacklisted { .. }) => {
            tracing::warn!("Holder {} permanently blacklisted: balance reached zero", address);
        }
        (LoyaltyState::TempBlacklisted { .. }, LoyaltyState::Eligible) => {
            tracing::info!("Holder {} recovered eligibility", address);
        }
        (LoyaltyState::New | LoyaltyState::Eligible, LoyaltyState::TempBlacklisted { reason, .. }) => {
            tracing::info!("Holder {} temporarily blacklisted: {}", address, reason);
        }
        _ => {}
    }
}
