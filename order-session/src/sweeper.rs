//! Optional periodic purge of expired sessions. Only bounds memory: expiry is already enforced on access.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::engine::SessionEngine;

/// Handle to a running sweep task. Dropping it without [`stop`](Self::stop) aborts the task.
pub struct SessionSweeper {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionSweeper {
    /// Spawns the sweep loop on the current tokio runtime.
    pub fn start(engine: Arc<SessionEngine>, every: Duration) -> Self {
        let (tx, mut rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = every.as_secs(), "Session sweeper started");
            loop {
                tokio::select! {
                    _ = &mut rx => break,
                    _ = ticker.tick() => {
                        debug!("Sweeping expired sessions");
                        if let Err(e) = engine.purge_expired().await {
                            error!(error = %e, "Session sweep failed");
                        }
                    }
                }
            }
            info!("Session sweeper stopped");
        });
        Self {
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    /// Signals the loop to exit and waits for it.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Session sweeper task failed");
            }
        }
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SessionConfig;
    use crate::store::InMemorySessionStore;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_sweeper_purges_and_stops() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap()));
        let store = Arc::new(InMemorySessionStore::new());
        let engine = Arc::new(
            SessionEngine::new(SessionConfig::default())
                .with_clock(clock.clone())
                .with_store(store.clone()),
        );
        engine.start("c", "Ana").await.unwrap();
        clock.advance(chrono::Duration::minutes(31));

        let sweeper = SessionSweeper::start(engine.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.stop().await;

        assert!(store.is_empty().await);
    }
}
