use std::net::SocketAddr;
use anyhow::Result;
use dotenv::dotenv;
use std::num::NonZeroU32;
use std::sync::Arc;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::signature::read_keypair_file;
use tokio::net::TcpListener;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use solana_sdk::commitment_config::CommitmentConfig;
use clickhouse::Client;
use crate::db::init::init_database;
use tokio::time::{sleep, Duration};

mod api;
mod config;
mod db;
mod error;
mod services;
mod types;

#[cfg(test)]
mod testing;

use crate::api::routes::create_router;
use crate::config::EngineConfig;
use crate::db::operations::ClickHouseStore;
use crate::services::claim_cycle::DividendEngine;
use crate::services::fee_claim::HttpFeeClaimService;
use crate::services::holders::SolanaHolderRegistry;
use crate::services::payment::SolanaPaymentExecutor;
use crate::services::scheduler::ClaimScheduler;

async fn connect_to_clickhouse(config: &EngineConfig, max_retries: u32) -> Result<Client> {
    let client = Client::default()
        .with_url(&config.clickhouse_url)
        .with_database(&config.clickhouse_database);

    for attempt in 1..=max_retries {
        match client.query("SELECT 1").execute().await {
            Ok(_) => {
                tracing::info!("Connected to ClickHouse at {}", config.clickhouse_url);
                return Ok(client);
            }
            Err(e) => {
                if attempt == max_retries {
                    return Err(anyhow::anyhow!("Failed to connect to ClickHouse after {} attempts: {}", max_retries, e));
                }
                tracing::warn!("Failed to connect to ClickHouse (attempt {}/{}): {}", attempt, max_retries, e);
                sleep(Duration::from_secs(2)).await;
            }
        }
    }
    Err(anyhow::anyhow!("ClickHouse connection was not attempted"))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    dotenv().ok();
    let config = EngineConfig::from_env()?;

    let per_second = NonZeroU32::new(config.rpc_requests_per_second).unwrap_or(nonzero!(5u32));
    let rpc_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));
    let rpc_client = Arc::new(RpcClient::new_with_timeout_and_commitment(
        config.rpc_url.clone(),
        std::time::Duration::from_secs(60),
        CommitmentConfig::confirmed(),
    ));

    // Test RPC connection at startup
    match rpc_client.get_version().await {
        Ok(version) => tracing::info!("Connected to Solana RPC (version: {})", version.solana_core),
        Err(e) => tracing::error!("Failed to connect to RPC: {:?}", e),
    };

    // Connect to ClickHouse with retries
    let client = connect_to_clickhouse(&config, 5).await?;

    // Initialize database tables
    init_database(&client).await?;
    let store = Arc::new(ClickHouseStore::new(client));

    let payer = read_keypair_file(&config.payer_keypair_path)
        .map_err(|e| anyhow::anyhow!("Failed to read payer keypair {}: {}", config.payer_keypair_path, e))?;
    let payments = SolanaPaymentExecutor::new(
        rpc_client.clone(),
        rpc_limiter.clone(),
        payer,
        config.payer_reserve_lamports,
    );
    tracing::info!("Paying dividends from {}", payments.payer_address());

    // The funding wallet never receives its own dividends.
    let mut excluded = config.excluded_holders.clone();
    excluded.insert(payments.payer_address());

    let registry = SolanaHolderRegistry::new(rpc_client.clone(), rpc_limiter.clone(), excluded);
    let fee_claim = HttpFeeClaimService::new(
        config.fee_claim_url.clone(),
        Duration::from_secs(config.fee_claim_timeout_secs),
    )?;

    let engine = Arc::new(DividendEngine::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(fee_claim),
        Arc::new(registry),
        Arc::new(payments),
    ));
    let scheduler = Arc::new(ClaimScheduler::new(engine, Duration::from_secs(config.claim_tick_secs)));

    let app = create_router(scheduler.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    // Start the claim scheduler in a separate task
    let scheduler_handle = tokio::spawn(scheduler.run());

    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            if let Err(e) = result {
                tracing::error!("Failed to serve API: {:?}", e);
            }
        }
        _ = scheduler_handle => {
            tracing::info!("Claim scheduler finished");
        }
    }

    Ok(())
}
