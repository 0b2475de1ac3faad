use anyhow::Result;
use clickhouse::Client;
use crate::db::schema::{
    AUTO_CLAIM_SETTINGS_SQL,
    HOLDER_INITIAL_BAGS_SQL,
    HOLDER_ELIGIBILITY_SQL,
    DIVIDEND_CLAIMS_SQL,
    HOLDER_SNAPSHOTS_SQL,
    DIVIDEND_DISTRIBUTIONS_SQL,
};

pub async fn init_database(client: &Client) -> Result<()> {
    tracing::info!("Initializing database tables...");

    // Create tables if they don't exist (won't drop existing data)
    client.query(AUTO_CLAIM_SETTINGS_SQL).execute().await?;
    client.query(HOLDER_INITIAL_BAGS_SQL).execute().await?;
    client.query(HOLDER_ELIGIBILITY_SQL).execute().await?;
    client.query(DIVIDEND_CLAIMS_SQL).execute().await?;
    client.query(HOLDER_SNAPSHOTS_SQL).execute().await?;
    client.query(DIVIDEND_DISTRIBUTIONS_SQL).execute().await?;

    Ok(())
}
