use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use governor::{RateLimiter, state::{NotKeyed, InMemoryState}, clock::DefaultClock};
use rayon::prelude::*;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
};
use solana_sdk::{program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{Account as TokenAccount, AccountState};

use crate::types::models::{HolderBalance, HolderSet};

pub type RpcRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[async_trait]
pub trait HolderRegistry: Send + Sync {
    /// Every owner with a positive balance of `asset_id`.
    async fn get_holders(&self, asset_id: &str) -> Result<HolderSet>;
}

/// Reads SPL token accounts for a mint and aggregates them per owner.
pub struct SolanaHolderRegistry {
    client: Arc<RpcClient>,
    rate_limiter: Arc<RpcRateLimiter>,
    excluded_owners: HashSet<String>,
}

impl SolanaHolderRegistry {
    pub fn new(
        client: Arc<RpcClient>,
        rate_limiter: Arc<RpcRateLimiter>,
        excluded_owners: HashSet<String>,
    ) -> Self {
        Self {
            client,
            rate_limiter,
            excluded_owners,
        }
    }
}

/// Sums token account balances per owner, dropping excluded owners and empty
/// results. Sorted by balance, largest first, then by address.
pub fn aggregate_by_owner(
    accounts: impl IntoIterator<Item = (String, u64)>,
    excluded_owners: &HashSet<String>,
) -> Vec<HolderBalance> {
    let mut per_owner: HashMap<String, u64> = HashMap::new();
    for (owner, amount) in accounts {
        if amount == 0 || excluded_owners.contains(&owner) {
            continue;
        }
        *per_owner.entry(owner).or_default() += amount;
    }

    let mut holders: Vec<HolderBalance> = per_owner
        .into_iter()
        .map(|(address, balance)| HolderBalance { address, balance })
        .collect();
    holders.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.address.cmp(&b.address)));
    holders
}

#[async_trait]
impl HolderRegistry for SolanaHolderRegistry {
    async fn get_holders(&self, asset_id: &str) -> Result<HolderSet> {
        let mint_pubkey = Pubkey::from_str(asset_id)?;

        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::Memcmp(Memcmp::new(
                    0,
                    MemcmpEncodedBytes::Base58(mint_pubkey.to_string()),
                )),
                RpcFilterType::DataSize(TokenAccount::LEN as u64),
            ]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..Default::default()
            },
            with_context: None,
        };

        self.rate_limiter.until_ready().await;
        let accounts = self.client.get_program_accounts_with_config(&spl_token::ID, config).await?;
        tracing::info!("Found {} token accounts for {}", accounts.len(), asset_id);

        let balances: Vec<(String, u64)> = accounts
            .into_par_iter()
            .filter_map(|(_, account)| {
                TokenAccount::unpack(&account.data).ok()
                    .filter(|token_account| {
                        token_account.amount > 0 &&
                        token_account.state == AccountState::Initialized
                    })
                    .map(|token_account| (token_account.owner.to_string(), token_account.amount))
            })
            .collect();

        let holders = aggregate_by_owner(balances, &self.excluded_owners);
        let set = HolderSet::new(holders);
        tracing::info!(
            "Found {} holders with total balance {} (excluding {} owners)",
            set.holders.len(),
            set.total_balance,
            self.excluded_owners.len()
        );
        Ok(set)
    }
}
