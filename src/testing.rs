//! Mock collaborators for engine and scheduler tests.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::db::memory::MemoryStore;
use crate::services::claim_cycle::DividendEngine;
use crate::services::fee_claim::{FeeClaimOutcome, FeeClaimRequest, FeeClaimService};
use crate::services::holders::HolderRegistry;
use crate::services::payment::PaymentExecutor;
use crate::types::models::{AutoClaimSettings, HolderBalance, HolderSet};

pub fn configured_settings() -> AutoClaimSettings {
    AutoClaimSettings {
        enabled: true,
        claim_interval_minutes: 30,
        distribution_percentage: 50.0,
        min_claim_amount: 0.01,
        wallet_address: "wallet".to_string(),
        token_mint: "mint".to_string(),
        next_claim_scheduled: None,
        last_successful_claim: None,
    }
}

pub fn engine_with(
    store: Arc<MemoryStore>,
    fee_claim: impl FeeClaimService + 'static,
    registry: StaticRegistry,
    payments: Arc<RecordingPayments>,
) -> DividendEngine {
    DividendEngine::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(fee_claim),
        Arc::new(registry),
        payments,
    )
}

enum Script {
    Claimed(f64, String),
    Rejected(String),
    Unreachable,
}

/// Answers every claim the same way and remembers the last request.
pub struct ScriptedFeeClaim {
    script: Script,
    last_request: Mutex<Option<FeeClaimRequest>>,
    calls: Mutex<u32>,
}

impl ScriptedFeeClaim {
    fn with(script: Script) -> Self {
        Self {
            script,
            last_request: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub fn claimed(amount: f64, transaction_id: &str) -> Self {
        Self::with(Script::Claimed(amount, transaction_id.to_string()))
    }

    pub fn rejected(reason: &str) -> Self {
        Self::with(Script::Rejected(reason.to_string()))
    }

    pub fn unreachable() -> Self {
        Self::with(Script::Unreachable)
    }

    pub async fn last_request(&self) -> Option<FeeClaimRequest> {
        self.last_request.lock().await.clone()
    }

    pub async fn calls(&self) -> u32 {
        *self.calls.lock().await
    }
}

#[async_trait]
impl FeeClaimService for ScriptedFeeClaim {
    async fn claim(&self, request: &FeeClaimRequest) -> Result<FeeClaimOutcome> {
        *self.last_request.lock().await = Some(request.clone());
        *self.calls.lock().await += 1;
        match &self.script {
            Script::Claimed(amount, tx) => Ok(FeeClaimOutcome::Claimed {
                claimed_amount: *amount,
                transaction_id: tx.clone(),
            }),
            Script::Rejected(reason) => Ok(FeeClaimOutcome::Rejected { reason: reason.clone() }),
            Script::Unreachable => Err(anyhow!("connection refused")),
        }
    }
}

#[async_trait]
impl FeeClaimService for Arc<ScriptedFeeClaim> {
    async fn claim(&self, request: &FeeClaimRequest) -> Result<FeeClaimOutcome> {
        self.as_ref().claim(request).await
    }
}

/// Blocks inside `claim` until released, to hold a cycle open.
#[derive(Clone, Default)]
pub struct GatedFeeClaim {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl FeeClaimService for GatedFeeClaim {
    async fn claim(&self, _request: &FeeClaimRequest) -> Result<FeeClaimOutcome> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(FeeClaimOutcome::Rejected {
            reason: "released".to_string(),
        })
    }
}

/// Registry returning a replaceable fixed holder set.
#[derive(Clone)]
pub struct StaticRegistry {
    holders: Arc<Mutex<Option<Vec<HolderBalance>>>>,
}

impl StaticRegistry {
    pub fn new(holders: &[(&str, u64)]) -> Self {
        Self {
            holders: Arc::new(Mutex::new(Some(to_balances(holders)))),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            holders: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn set(&self, holders: &[(&str, u64)]) {
        *self.holders.lock().await = Some(to_balances(holders));
    }
}

fn to_balances(holders: &[(&str, u64)]) -> Vec<HolderBalance> {
    holders
        .iter()
        .map(|(address, balance)| HolderBalance {
            address: address.to_string(),
            balance: *balance,
        })
        .collect()
}

#[async_trait]
impl HolderRegistry for StaticRegistry {
    async fn get_holders(&self, _asset_id: &str) -> Result<HolderSet> {
        match self.holders.lock().await.clone() {
            Some(holders) => Ok(HolderSet::new(holders)),
            None => Err(anyhow!("RPC node timed out")),
        }
    }
}

/// Records every transfer attempt, failing for configured addresses.
#[derive(Default)]
pub struct RecordingPayments {
    failing: HashSet<String>,
    attempts: Mutex<Vec<(String, u64)>>,
    sent: Mutex<Vec<(String, u64)>>,
}

impl RecordingPayments {
    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            failing: addresses.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    pub async fn attempts(&self) -> Vec<String> {
        self.attempts.lock().await.iter().map(|(a, _)| a.clone()).collect()
    }

    pub async fn transfers(&self) -> Vec<(String, u64)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PaymentExecutor for RecordingPayments {
    async fn send_transfer(&self, address: &str, amount_lamports: u64) -> Result<String> {
        self.attempts.lock().await.push((address.to_string(), amount_lamports));
        if self.failing.contains(address) {
            return Err(anyhow!("blockhash not found"));
        }
        let mut sent = self.sent.lock().await;
        sent.push((address.to_string(), amount_lamports));
        Ok(format!("sig-{}-{}", address, sent.len()))
    }
}
