use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use super::error::ApiError;
use super::state::AppState;
use crate::types::models::{
    AutoClaimSettings, CronStatus, CycleOutcome, HolderEligibility, SettingsUpdate,
};

#[derive(Debug, Default, Deserialize)]
pub struct TriggerParams {
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize)]
pub struct ShouldRunResponse {
    pub should_run: bool,
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub address: String,
    pub eligibility: Option<HolderEligibility>,
}

pub async fn get_cron_status(State(scheduler): State<AppState>) -> Json<CronStatus> {
    Json(scheduler.cron_status())
}

pub async fn get_should_run(
    State(scheduler): State<AppState>,
) -> Result<Json<ShouldRunResponse>, ApiError> {
    let should_run = scheduler.should_run_claim().await?;
    Ok(Json(ShouldRunResponse { should_run }))
}

pub async fn trigger_claim(
    State(scheduler): State<AppState>,
    params: Option<Json<TriggerParams>>,
) -> Result<Json<CycleOutcome>, ApiError> {
    let Json(params) = params.unwrap_or_default();
    let outcome = scheduler.trigger_manual_claim(params.force).await?;
    Ok(Json(outcome))
}

pub async fn get_settings(
    State(scheduler): State<AppState>,
) -> Result<Json<AutoClaimSettings>, ApiError> {
    Ok(Json(scheduler.engine().peek_settings().await?))
}

pub async fn update_settings(
    State(scheduler): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<AutoClaimSettings>, ApiError> {
    let settings = scheduler.update_settings(&update).await?;
    tracing::info!(
        "Auto-claim settings updated (enabled = {}, interval = {}m, distribution = {}%)",
        settings.enabled,
        settings.claim_interval_minutes,
        settings.distribution_percentage
    );
    Ok(Json(settings))
}

pub async fn reset_holder_baseline(
    State(scheduler): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ResetResponse>, ApiError> {
    let eligibility = scheduler.reset_baseline(&address).await?;
    Ok(Json(ResetResponse { address, eligibility }))
}
