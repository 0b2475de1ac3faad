use std::collections::HashSet;
use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Process configuration read from the environment. Operator-editable
/// settings live in the database instead; see `AutoClaimSettings`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rpc_url: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub fee_claim_url: String,
    pub fee_claim_timeout_secs: u64,
    pub payer_keypair_path: String,
    pub payer_reserve_lamports: u64,
    pub claim_tick_secs: u64,
    pub rpc_requests_per_second: u32,
    pub excluded_holders: HashSet<String>,
    pub api_port: u16,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

pub fn parse_address_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let rpc_url = match env::var("SOLANA_RPC_URL") {
            Ok(url) => url,
            Err(_) => {
                let api_key = env::var("HELIUS_API_KEY")
                    .map_err(|_| anyhow!("SOLANA_RPC_URL or HELIUS_API_KEY must be set"))?;
                format!("https://rpc.helius.xyz/?api-key={}", api_key)
            }
        };

        let rpc_requests_per_second = parsed_or("RPC_REQUESTS_PER_SECOND", 5u32)?;
        if rpc_requests_per_second == 0 {
            return Err(anyhow!("RPC_REQUESTS_PER_SECOND must be positive"));
        }
        let claim_tick_secs = parsed_or("CLAIM_TICK_SECS", 120u64)?;
        if claim_tick_secs == 0 {
            return Err(anyhow!("CLAIM_TICK_SECS must be positive"));
        }

        Ok(Self {
            rpc_url,
            clickhouse_url: var_or("CLICKHOUSE_URL", "http://localhost:8123"),
            clickhouse_database: var_or("CLICKHOUSE_DATABASE", "default"),
            fee_claim_url: env::var("FEE_CLAIM_URL").map_err(|_| anyhow!("FEE_CLAIM_URL must be set"))?,
            fee_claim_timeout_secs: parsed_or("FEE_CLAIM_TIMEOUT_SECS", 60u64)?,
            payer_keypair_path: env::var("PAYER_KEYPAIR_PATH")
                .map_err(|_| anyhow!("PAYER_KEYPAIR_PATH must be set"))?,
            payer_reserve_lamports: parsed_or("PAYER_RESERVE_LAMPORTS", 10_000_000u64)?,
            claim_tick_secs,
            rpc_requests_per_second,
            excluded_holders: parse_address_list(&var_or("EXCLUDED_HOLDERS", "")),
            api_port: parsed_or("API_PORT", 8000u16)?,
        })
    }
}
