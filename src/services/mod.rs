pub mod claim_cycle;
pub mod distribution;
pub mod fee_claim;
pub mod holders;
pub mod loyalty;
pub mod payment;
pub mod scheduler;
