pub const AUTO_CLAIM_SETTINGS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS auto_claim_settings (
    id UInt8,
    enabled Bool,
    claim_interval_minutes UInt32,
    distribution_percentage Float64,
    min_claim_amount Float64,
    wallet_address String,
    token_mint String,
    next_claim_scheduled DateTime('UTC'),
    last_successful_claim DateTime('UTC'),
    updated_at DateTime64(6, 'UTC') DEFAULT now64(6, 'UTC'),
    PRIMARY KEY (id)
) ENGINE = ReplacingMergeTree(updated_at)
"#;

pub const HOLDER_INITIAL_BAGS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS holder_initial_bags (
    asset_id String,
    address String,
    initial_balance UInt64,
    initial_percentage Float64,
    first_recorded_at DateTime('UTC'),
    updated_at DateTime64(6, 'UTC') DEFAULT now64(6, 'UTC'),
    PRIMARY KEY (asset_id, address)
) ENGINE = ReplacingMergeTree(updated_at)
"#;

pub const HOLDER_ELIGIBILITY_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS holder_eligibility (
    asset_id String,
    address String,
    current_balance UInt64,
    initial_balance UInt64,
    retention_percentage Float64,
    is_eligible Bool,
    permanently_blacklisted Bool,
    blacklisted_at DateTime('UTC'),
    blacklist_reason Nullable(String),
    updated_at DateTime64(6, 'UTC') DEFAULT now64(6, 'UTC'),
    PRIMARY KEY (asset_id, address)
) ENGINE = ReplacingMergeTree(updated_at)
"#;

pub const DIVIDEND_CLAIMS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS dividend_claims (
    id UInt64,
    claimed_amount Float64,
    distribution_amount Float64,
    total_supply UInt64,
    holder_count UInt32,
    status LowCardinality(String),
    transaction_id String,
    error_message Nullable(String),
    created_at DateTime('UTC') DEFAULT now('UTC'),
    PRIMARY KEY (id)
) ENGINE = MergeTree()
"#;

pub const HOLDER_SNAPSHOTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS holder_snapshots (
    claim_id UInt64,
    holder_address String,
    token_balance UInt64,
    percentage Float64,
    initial_balance UInt64,
    retention_percentage Float64,
    is_eligible Bool,
    created_at DateTime('UTC') DEFAULT now('UTC'),
    PRIMARY KEY (claim_id, holder_address)
) ENGINE = MergeTree()
"#;

pub const DIVIDEND_DISTRIBUTIONS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS dividend_distributions (
    claim_id UInt64,
    holder_address String,
    token_balance UInt64,
    share_percentage Float64,
    dividend_amount Float64,
    status LowCardinality(String),
    transaction_signature Nullable(String),
    error_message Nullable(String),
    paid_at DateTime('UTC'),
    created_at DateTime('UTC') DEFAULT now('UTC'),
    PRIMARY KEY (claim_id, holder_address)
) ENGINE = MergeTree()
"#;
