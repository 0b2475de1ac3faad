use axum::{
    routing::{get, post},
    Router,
};
use super::handlers::{
    get_cron_status, get_settings, get_should_run, reset_holder_baseline, trigger_claim,
    update_settings,
};
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/cron/status", get(get_cron_status))
        .route("/claims/should-run", get(get_should_run))
        .route("/claims/trigger", post(trigger_claim))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/holders/:address/reset", post(reset_holder_baseline))
        .with_state(state)
}
