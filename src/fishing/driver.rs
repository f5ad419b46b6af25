//! Real-time driver: runs a [`FishingEngine`] on a tokio interval so phase
//! timers elapse on the wall clock.
//!
//! Player calls lock the engine, apply immediately (fight input still waits
//! for the next tick boundary) and release. The ticker is the only caller of
//! `advance`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::engine::FishingEngine;
use super::error::{ActionError, CastError};
use super::types::{CancelReason, EncounterId, EncounterOutcome, FightAction, Phase, PollStatus};

pub struct EngineDriver {
    engine: Arc<Mutex<FishingEngine>>,
    tick: Duration,
    ticker: JoinHandle<()>,
}

impl EngineDriver {
    /// Take ownership of the engine and start ticking it at the configured
    /// fight tick. Must be called inside a tokio runtime.
    pub fn spawn(engine: FishingEngine) -> Self {
        let tick = Duration::from_millis(engine.config().timing.fight_tick_ms.max(1));
        let engine = Arc::new(Mutex::new(engine));
        let ticker = tokio::spawn(run_ticker(Arc::clone(&engine), tick));
        tracing::debug!(
            target: "angler::driver",
            tick_ms = tick.as_millis() as u64,
            "driver.started"
        );
        Self {
            engine,
            tick,
            ticker,
        }
    }

    /// Shared handle for callers that need direct engine access.
    pub fn engine(&self) -> Arc<Mutex<FishingEngine>> {
        Arc::clone(&self.engine)
    }

    pub async fn start_cast(&self, angler: &str, location: &str) -> Result<EncounterId, CastError> {
        self.engine.lock().await.start_cast(angler, location)
    }

    pub async fn hook_attempt(&self, id: EncounterId) -> Result<Phase, ActionError> {
        self.engine.lock().await.hook_attempt(id)
    }

    pub async fn fight_action(&self, id: EncounterId, action: FightAction) -> Result<(), ActionError> {
        self.engine.lock().await.fight_action(id, action)
    }

    pub async fn cancel(&self, id: EncounterId, reason: CancelReason) -> Result<(), ActionError> {
        self.engine.lock().await.cancel(id, reason)
    }

    pub async fn poll_outcome(&self, id: EncounterId) -> Result<PollStatus, ActionError> {
        self.engine.lock().await.poll_outcome(id)
    }

    /// Remove a resolved outcome from the engine's archive.
    pub async fn take_outcome(&self, id: EncounterId) -> Result<EncounterOutcome, ActionError> {
        self.engine.lock().await.take_outcome(id)
    }

    /// Suspend until the encounter resolves, then take its outcome out of the
    /// archive. Checks once per tick.
    pub async fn wait_for_outcome(&self, id: EncounterId) -> Result<EncounterOutcome, ActionError> {
        loop {
            {
                let mut engine = self.engine.lock().await;
                match engine.poll_outcome(id) {
                    Ok(PollStatus::Pending(_)) => {}
                    Ok(PollStatus::Resolved(_)) | Err(ActionError::Reward(_)) => {
                        return engine.take_outcome(id);
                    }
                    Err(err) => return Err(err),
                }
            }
            time::sleep(self.tick).await;
        }
    }

    /// Stop ticking. Live encounters freeze where they are.
    pub fn shutdown(self) -> Arc<Mutex<FishingEngine>> {
        self.ticker.abort();
        tracing::debug!(target: "angler::driver", "driver.stopped");
        Arc::clone(&self.engine)
    }
}

impl Drop for EngineDriver {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn run_ticker(engine: Arc<Mutex<FishingEngine>>, tick: Duration) {
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    interval.tick().await;
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_millis() as u64;
        // Keep the sub-millisecond remainder for the next tick
        last += Duration::from_millis(elapsed_ms);
        engine.lock().await.advance(elapsed_ms);
    }
}
