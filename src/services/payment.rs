use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};

use crate::services::holders::RpcRateLimiter;

/// Sends one transfer from the funding wallet and returns its signature.
#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    async fn send_transfer(&self, address: &str, amount_lamports: u64) -> Result<String>;
}

pub fn sol_to_lamports(amount: f64) -> u64 {
    if !(amount > 0.0) {
        return 0;
    }
    (amount * LAMPORTS_PER_SOL as f64).floor() as u64
}

/// Native SOL transfers signed by the payer keypair.
///
/// Refuses any transfer that would leave the payer with less than
/// `reserve_lamports`, which covers rent and fees for the rest of the batch.
pub struct SolanaPaymentExecutor {
    client: Arc<RpcClient>,
    rate_limiter: Arc<RpcRateLimiter>,
    payer: Keypair,
    reserve_lamports: u64,
}

impl SolanaPaymentExecutor {
    pub fn new(
        client: Arc<RpcClient>,
        rate_limiter: Arc<RpcRateLimiter>,
        payer: Keypair,
        reserve_lamports: u64,
    ) -> Self {
        Self {
            client,
            rate_limiter,
            payer,
            reserve_lamports,
        }
    }

    pub fn payer_address(&self) -> String {
        self.payer.pubkey().to_string()
    }
}

#[async_trait]
impl PaymentExecutor for SolanaPaymentExecutor {
    async fn send_transfer(&self, address: &str, amount_lamports: u64) -> Result<String> {
        if amount_lamports == 0 {
            return Err(anyhow!("Transfer amount rounds to zero lamports"));
        }
        let recipient = Pubkey::from_str(address)?;

        self.rate_limiter.until_ready().await;
        let balance = self.client.get_balance(&self.payer.pubkey()).await?;
        if balance.saturating_sub(amount_lamports) < self.reserve_lamports {
            return Err(anyhow!(
                "Payer balance {} lamports cannot cover {} lamports while keeping {} in reserve",
                balance,
                amount_lamports,
                self.reserve_lamports
            ));
        }

        let instruction = system_instruction::transfer(&self.payer.pubkey(), &recipient, amount_lamports);
        self.rate_limiter.until_ready().await;
        let blockhash = self.client.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );

        self.rate_limiter.until_ready().await;
        let signature = self.client.send_and_confirm_transaction(&transaction).await?;
        Ok(signature.to_string())
    }
}
