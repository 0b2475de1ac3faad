use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::MissedTickBehavior;

use crate::error::{EngineError, EngineResult};
use crate::services::claim_cycle::DividendEngine;
use crate::types::models::{
    AutoClaimSettings, CronStatus, CycleOutcome, HolderEligibility, SettingsUpdate,
};

/// Single-slot lock: at most one claim cycle per process.
///
/// Acquisition never waits. A caller that finds it held is turned away.
#[derive(Debug, Default)]
pub struct CycleLock {
    busy: AtomicBool,
}

pub struct CycleGuard<'a> {
    lock: &'a CycleLock,
}

impl CycleLock {
    pub fn try_acquire(&self) -> Option<CycleGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard { lock: self })
    }

    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::Release);
    }
}

pub struct ClaimScheduler {
    engine: Arc<DividendEngine>,
    lock: CycleLock,
    tick_interval: Duration,
    running: AtomicBool,
}

impl ClaimScheduler {
    pub fn new(engine: Arc<DividendEngine>, tick_interval: Duration) -> Self {
        Self {
            engine,
            lock: CycleLock::default(),
            tick_interval,
            running: AtomicBool::new(false),
        }
    }

    pub fn engine(&self) -> &DividendEngine {
        &self.engine
    }

    /// Ticks forever. A tick that finds a cycle in flight is dropped, not queued.
    pub async fn run(self: Arc<Self>) {
        self.running.store(true, Ordering::Release);
        tracing::info!("Starting claim scheduler ({})", self.interval_spec());

        let mut timer = tokio::time::interval(self.tick_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;
            match self.tick().await {
                Ok(CycleOutcome::Completed(report)) => {
                    tracing::info!("Scheduled claim {} finished", report.claim_id);
                }
                Ok(CycleOutcome::ClaimInProgress) => {
                    tracing::info!("Claim already in progress, skipping tick");
                }
                Ok(outcome) => tracing::debug!("Scheduled tick: {:?}", outcome),
                Err(e) => tracing::error!("Scheduled claim cycle failed: {}", e),
            }
        }
    }

    pub async fn tick(&self) -> EngineResult<CycleOutcome> {
        self.attempt(false).await
    }

    /// Runs a cycle now. `force` ignores the enabled flag and the schedule
    /// but not the cycle lock.
    pub async fn trigger_manual_claim(&self, force: bool) -> EngineResult<CycleOutcome> {
        tracing::info!("Manual claim triggered (force = {})", force);
        self.attempt(force).await
    }

    pub async fn should_run_claim(&self) -> EngineResult<bool> {
        let settings = self.engine.peek_settings().await?;
        Ok(settings.effectively_enabled() && settings.is_due(OffsetDateTime::now_utc()))
    }

    pub fn cron_status(&self) -> CronStatus {
        CronStatus {
            running: self.running.load(Ordering::Acquire),
            claim_in_progress: self.lock.is_held(),
            interval_spec: self.interval_spec(),
        }
    }

    /// Rejected while a cycle runs, so the cycle's schedule update is never lost.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> EngineResult<AutoClaimSettings> {
        let Some(_guard) = self.lock.try_acquire() else {
            return Err(EngineError::ClaimInProgress);
        };
        self.engine.save_settings(update).await
    }

    pub async fn reset_baseline(&self, address: &str) -> EngineResult<Option<HolderEligibility>> {
        let Some(_guard) = self.lock.try_acquire() else {
            return Err(EngineError::ClaimInProgress);
        };
        self.engine.reset_baseline(address).await
    }

    fn interval_spec(&self) -> String {
        format!("every {}s", self.tick_interval.as_secs())
    }

    async fn attempt(&self, force: bool) -> EngineResult<CycleOutcome> {
        let Some(_guard) = self.lock.try_acquire() else {
            return Ok(CycleOutcome::ClaimInProgress);
        };

        let settings = self.engine.load_settings().await?;
        if !force {
            if !settings.effectively_enabled() {
                if settings.enabled {
                    tracing::warn!("Auto-claim enabled but wallet or token mint is a placeholder; skipping");
                }
                return Ok(CycleOutcome::Disabled);
            }
            if !settings.is_due(OffsetDateTime::now_utc()) {
                return Ok(CycleOutcome::NotDue {
                    next_claim_scheduled: settings.next_claim_scheduled,
                });
            }
        }

        let outcome = self.engine.run_cycle(&settings).await?;
        if let CycleOutcome::Completed(report) = &outcome {
            match self.engine.rearm(&settings, OffsetDateTime::now_utc()).await {
                Ok(next) => tracing::info!("Next claim scheduled for {}", next),
                Err(e) => tracing::error!(
                    "CRITICAL: claim {} completed but the schedule was not advanced: {}",
                    report.claim_id,
                    e
                ),
            }
        }
        Ok(outcome)
    }
}
