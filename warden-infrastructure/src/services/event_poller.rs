// Background event poller.
//
// One periodic task per process. A tick runs a full drain cycle to completion
// before the loop re-arms, so cycles never overlap and stop() never cancels a
// cycle mid-write: the shutdown branch is only taken between cycles.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use warden_application::commands::evaluate_commands;
use warden_application::AppState;

pub struct EventPoller {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl EventPoller {
    pub fn start(state: AppState) -> Self {
        let interval = Duration::from_secs(state.config.poll_interval_seconds);
        let batch = state.config.poll_batch_size;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval resolves immediately; the
            // poller waits a full interval before its first drain instead.
            ticker.tick().await;
            info!(
                "event poller started (interval {}s, batch {})",
                interval.as_secs(),
                batch
            );
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        match evaluate_commands::drain_pending(&state, batch).await {
                            Ok(0) => {}
                            Ok(count) => debug!("poller drained {} events", count),
                            Err(err) => error!("poller cycle failed: {}", err),
                        }
                    }
                }
            }
            info!("event poller stopped");
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Signal shutdown and wait for any in-flight cycle to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow_tests::{count_rule, test_state};

    use warden_domain::{EventOwner, PlayerId, TelemetryEvent};

    #[tokio::test(start_paused = true)]
    async fn poller_drains_on_its_interval_and_stops_cleanly() {
        let mut state = test_state();
        state.config.poll_interval_seconds = 1;
        let player = PlayerId("p1".to_string());
        let rule = count_rule("spam", 1, 60);
        state.rule_repo.insert_rule(&rule).await.unwrap();

        let event = TelemetryEvent::new(EventOwner::Player(player.clone()), "spam", None, None);
        state.event_repo.insert_event(&event).await.unwrap();

        let poller = EventPoller::start(state.clone());
        // Two virtual intervals are more than enough for one drain.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        poller.stop().await;

        let stored = state
            .event_repo
            .fetch_event(&event.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.evaluated);
        let violations = state
            .violation_repo
            .fetch_for_player(&player)
            .await
            .unwrap();
        assert_eq!(violations.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_poller_fires_no_further_cycles() {
        let mut state = test_state();
        state.config.poll_interval_seconds = 1;
        let rule = count_rule("spam", 1, 60);
        state.rule_repo.insert_rule(&rule).await.unwrap();

        let poller = EventPoller::start(state.clone());
        tokio::time::sleep(Duration::from_millis(1500)).await;
        poller.stop().await;

        // Work arriving after stop stays pending.
        let event = TelemetryEvent::new(
            EventOwner::Player(PlayerId("p1".to_string())),
            "spam",
            None,
            None,
        );
        state.event_repo.insert_event(&event).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3000)).await;

        let pending = state.event_repo.fetch_unevaluated(10).await.unwrap();
        assert_eq!(pending.len(), 1);
    }
}
