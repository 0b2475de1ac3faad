use std::sync::Arc;
use crate::services::scheduler::ClaimScheduler;

pub type AppState = Arc<ClaimScheduler>;
