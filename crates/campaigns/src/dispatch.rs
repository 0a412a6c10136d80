//! Simulated campaign dispatch. A single interval ticker replays each
//! dispatching campaign's cadence on a compressed virtual clock: every
//! tick sends a batch sized by the cadence's average spacing and delivers
//! a jittered fraction of it. No real messages leave this process.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info};

use zapline_core::config::DispatchConfig;

use crate::store::CampaignStore;

/// Counters exposed for diagnostics; snapshot under a small mutex.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchStats {
    pub ticks: u64,
    pub messages_sent: u64,
    pub messages_delivered: u64,
}

/// Drives the simulated dispatch of every campaign in the store.
pub struct CampaignDispatcher {
    store: Arc<CampaignStore>,
    config: DispatchConfig,
    stats: Mutex<DispatchStats>,
}

impl CampaignDispatcher {
    pub fn new(store: Arc<CampaignStore>, config: DispatchConfig) -> Self {
        Self {
            store,
            config,
            stats: Mutex::new(DispatchStats::default()),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        *self.stats.lock()
    }

    /// One simulation step: start due campaigns, then advance every
    /// dispatching campaign by this tick's batch.
    pub fn tick(&self) {
        let started = self.store.start_due_campaigns(chrono::Utc::now());
        if !started.is_empty() {
            debug!(count = started.len(), "Campaigns entered dispatch");
        }

        // Virtual seconds covered by one tick of the simulation clock.
        let virtual_secs = self.config.tick_ms as f64 / 1000.0 * self.config.time_scale;
        let mut rng = rand::thread_rng();
        let mut tick_sent = 0u64;
        let mut tick_delivered = 0u64;

        for id in self.store.dispatching_ids() {
            let Some(campaign) = self.store.get(id) else {
                continue;
            };
            let spacing = campaign.avg_send_spacing_secs().max(1.0);
            let jitter: f64 = rng.gen_range(0.8..1.2);
            let sent_batch = ((virtual_secs / spacing) * jitter).ceil() as u64;
            let delivered_batch = (sent_batch as f64
                * self.config.delivery_rate
                * rng.gen_range(0.9..1.0)) as u64;

            self.store.advance(id, sent_batch, delivered_batch);
            tick_sent += sent_batch;
            tick_delivered += delivered_batch;
        }

        let mut stats = self.stats.lock();
        stats.ticks += 1;
        stats.messages_sent += tick_sent;
        stats.messages_delivered += tick_delivered;
    }

    /// Spawns the ticker loop. Runs until the process exits.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        info!(
            tick_ms = self.config.tick_ms,
            time_scale = self.config.time_scale,
            "Dispatch simulator started"
        );
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_millis(self.config.tick_ms));
            loop {
                interval.tick().await;
                self.tick();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use zapline_core::event_bus::noop_sink;
    use zapline_workflow::{CampaignObjective, CampaignSubmission, StepKind, WorkflowStep};

    fn small_campaign() -> CampaignSubmission {
        let mut step = WorkflowStep::new(StepKind::Text);
        step.content = "hi".to_string();
        CampaignSubmission {
            name: "Tick test".to_string(),
            scheduled_at: None,
            objective: CampaignObjective::Communication,
            audience: vec![Uuid::new_v4(), Uuid::new_v4()],
            steps: vec![step],
            min_delay_secs: 5,
            max_delay_secs: 10,
        }
    }

    #[tokio::test]
    async fn test_ticks_drive_campaign_to_completion() {
        let store = Arc::new(CampaignStore::new(noop_sink()));
        let campaign = store.submit(small_campaign()).await.unwrap();

        let dispatcher = CampaignDispatcher::new(
            store.clone(),
            DispatchConfig {
                tick_ms: 500,
                time_scale: 60.0,
                delivery_rate: 0.97,
            },
        );

        // 2 messages at ~7.5s spacing; one 30-virtual-second tick covers it.
        for _ in 0..4 {
            dispatcher.tick();
        }

        let done = store.get(campaign.id).unwrap();
        assert_eq!(done.status, crate::types::CampaignStatus::Completed);
        assert_eq!(done.progress.sent, done.progress.total);
        assert!(done.progress.delivered <= done.progress.sent);

        let stats = dispatcher.stats();
        assert_eq!(stats.ticks, 4);
        assert!(stats.messages_sent >= done.progress.total);
    }

    #[tokio::test]
    async fn test_cancelled_campaign_stops_advancing() {
        let store = Arc::new(CampaignStore::new(noop_sink()));
        let campaign = store.submit(small_campaign()).await.unwrap();
        let dispatcher = CampaignDispatcher::new(store.clone(), DispatchConfig::default());

        store.cancel(campaign.id).unwrap();
        dispatcher.tick();

        let after = store.get(campaign.id).unwrap();
        assert_eq!(after.status, crate::types::CampaignStatus::Cancelled);
        assert_eq!(after.progress.sent, 0);
    }
}
