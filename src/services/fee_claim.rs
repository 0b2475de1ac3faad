use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::models::AutoClaimSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeClaimRequest {
    pub wallet_address: String,
    pub token_mint: String,
    pub min_claim_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeeClaimOutcome {
    Claimed { claimed_amount: f64, transaction_id: String },
    Rejected { reason: String },
}

/// Settles accumulated trading fees into the claiming wallet.
///
/// `Err` is reserved for transport failures; a service that answered with a
/// refusal returns `Ok(FeeClaimOutcome::Rejected)`.
#[async_trait]
pub trait FeeClaimService: Send + Sync {
    async fn claim(&self, request: &FeeClaimRequest) -> Result<FeeClaimOutcome>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeClaimResponse {
    success: bool,
    claimed_amount: Option<f64>,
    transaction_id: Option<String>,
    reason: Option<String>,
}

/// Fee claim service reached over HTTP with a JSON body.
pub struct HttpFeeClaimService {
    client: ReqwestClient,
    endpoint: String,
}

impl HttpFeeClaimService {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl FeeClaimService for HttpFeeClaimService {
    async fn claim(&self, request: &FeeClaimRequest) -> Result<FeeClaimOutcome> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body: FeeClaimResponse = response.json().await?;

        tracing::debug!("Fee claim response ({}): {:?}", status, body);

        if !body.success {
            return Ok(FeeClaimOutcome::Rejected {
                reason: body.reason.unwrap_or_else(|| format!("claim rejected with status {}", status)),
            });
        }

        match (body.claimed_amount, body.transaction_id) {
            (Some(claimed_amount), Some(transaction_id)) => Ok(FeeClaimOutcome::Claimed {
                claimed_amount,
                transaction_id,
            }),
            _ => Err(anyhow::anyhow!("Fee claim response missing claimedAmount or transactionId")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimedFees {
    pub claimed_amount: f64,
    pub distribution_amount: f64,
    pub transaction_id: String,
}

pub fn distribution_amount(claimed_amount: f64, distribution_percentage: f64) -> f64 {
    claimed_amount * distribution_percentage / 100.0
}

/// Requests a fee claim for the configured wallet and splits the proceeds.
///
/// Every failure maps to [`EngineError::Claim`] and happens before any state
/// is written.
pub async fn claim_fees(
    service: &dyn FeeClaimService,
    settings: &AutoClaimSettings,
) -> EngineResult<ClaimedFees> {
    let request = FeeClaimRequest {
        wallet_address: settings.wallet_address.clone(),
        token_mint: settings.token_mint.clone(),
        min_claim_amount: settings.min_claim_amount,
    };

    tracing::info!("Claiming fees for {} (mint {})", request.wallet_address, request.token_mint);

    let (claimed_amount, transaction_id) = match service.claim(&request).await {
        Ok(FeeClaimOutcome::Claimed { claimed_amount, transaction_id }) => (claimed_amount, transaction_id),
        Ok(FeeClaimOutcome::Rejected { reason }) => return Err(EngineError::Claim(reason)),
        Err(e) => return Err(EngineError::Claim(format!("fee claim service unreachable: {:#}", e))),
    };

    if !(claimed_amount > 0.0) {
        return Err(EngineError::Claim(format!("nothing claimed ({} SOL)", claimed_amount)));
    }
    if claimed_amount < settings.min_claim_amount {
        return Err(EngineError::Claim(format!(
            "claimed {} SOL is below the minimum of {} SOL",
            claimed_amount, settings.min_claim_amount
        )));
    }

    let distribution_amount = distribution_amount(claimed_amount, settings.distribution_percentage);
    tracing::info!(
        "Claimed {} SOL (tx {}), distributing {} SOL ({}%)",
        claimed_amount,
        transaction_id,
        distribution_amount,
        settings.distribution_percentage
    );

    Ok(ClaimedFees {
        claimed_amount,
        distribution_amount,
        transaction_id,
    })
}
