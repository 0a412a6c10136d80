//! Campaign store — the `submitCampaign` collaborator. Validates payloads
//! server-side, keeps submitted campaigns in memory, and exposes the
//! mutations the dispatch simulator drives.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use zapline_core::event_bus::{make_event, EventSink, EventType};
use zapline_core::{ZaplineError, ZaplineResult};
use zapline_workflow::CampaignSubmission;

use crate::types::{Campaign, CampaignStatus, DispatchProgress};

/// Thread-safe in-memory store for submitted campaigns.
pub struct CampaignStore {
    campaigns: DashMap<Uuid, Campaign>,
    event_sink: Arc<dyn EventSink>,
}

impl CampaignStore {
    pub fn new(event_sink: Arc<dyn EventSink>) -> Self {
        info!("Campaign store initialized (in-memory, development mode)");
        Self {
            campaigns: DashMap::new(),
            event_sink,
        }
    }

    /// Accepts a submission: re-validates the payload (fail fast, before
    /// anything is stored), persists the immutable record, and emits
    /// `CampaignSubmitted`.
    pub async fn submit(&self, submission: CampaignSubmission) -> ZaplineResult<Campaign> {
        submission
            .validate()
            .map_err(|e| ZaplineError::Submission(e.to_string()))?;

        let campaign = Campaign::from_submission(submission);
        info!(
            campaign_id = %campaign.id,
            name = %campaign.name,
            messages = campaign.progress.total,
            "Campaign submitted"
        );
        self.campaigns.insert(campaign.id, campaign.clone());
        self.event_sink.emit(make_event(
            EventType::CampaignSubmitted,
            Some(campaign.id),
            None,
            serde_json::json!({"name": &campaign.name, "messages": campaign.progress.total}),
        ));
        metrics::counter!("zapline.campaigns.submitted").increment(1);
        Ok(campaign)
    }

    /// Lists campaigns, newest first.
    pub fn list(&self) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> =
            self.campaigns.iter().map(|r| r.value().clone()).collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        campaigns
    }

    pub fn get(&self, id: Uuid) -> Option<Campaign> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    pub fn progress(&self, id: Uuid) -> Option<DispatchProgress> {
        self.campaigns.get(&id).map(|r| r.value().progress.clone())
    }

    /// Cancels a scheduled or dispatching campaign. The simulator stops
    /// advancing it at its next tick.
    pub fn cancel(&self, id: Uuid) -> ZaplineResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or(ZaplineError::CampaignNotFound(id))?;
        let campaign = entry.value_mut();
        match campaign.status {
            CampaignStatus::Scheduled | CampaignStatus::Dispatching => {
                campaign.status = CampaignStatus::Cancelled;
                campaign.progress.finished_at = Some(Utc::now());
                info!(campaign_id = %id, "Campaign cancelled");
                self.event_sink.emit(make_event(
                    EventType::CampaignCancelled,
                    Some(id),
                    None,
                    serde_json::json!({}),
                ));
                Ok(campaign.clone())
            }
            status => Err(ZaplineError::Store(format!(
                "Campaign {id} cannot be cancelled from {status:?}"
            ))),
        }
    }

    // ─── Simulator hooks ───────────────────────────────────────────────────

    /// Moves scheduled campaigns whose start time has arrived into
    /// `Dispatching` and returns their ids.
    pub fn start_due_campaigns(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        let mut started = Vec::new();
        for mut entry in self.campaigns.iter_mut() {
            let campaign = entry.value_mut();
            let due = campaign.scheduled_at.map_or(true, |at| at <= now);
            if campaign.status == CampaignStatus::Scheduled && due {
                campaign.status = CampaignStatus::Dispatching;
                campaign.progress.started_at = Some(now);
                started.push(campaign.id);
            }
        }
        for id in &started {
            info!(campaign_id = %id, "Dispatch started");
            self.event_sink.emit(make_event(
                EventType::DispatchStarted,
                Some(*id),
                None,
                serde_json::json!({}),
            ));
        }
        started
    }

    pub fn dispatching_ids(&self) -> Vec<Uuid> {
        self.campaigns
            .iter()
            .filter(|r| r.value().status == CampaignStatus::Dispatching)
            .map(|r| *r.key())
            .collect()
    }

    /// Advances a dispatching campaign by a batch of sends and deliveries.
    /// Completion is detected here: when every message is sent the status
    /// flips to `Completed` and `DispatchCompleted` is emitted.
    pub fn advance(&self, id: Uuid, sent_batch: u64, delivered_batch: u64) {
        let mut completed = false;
        if let Some(mut entry) = self.campaigns.get_mut(&id) {
            let campaign = entry.value_mut();
            if campaign.status != CampaignStatus::Dispatching {
                return;
            }
            let progress = &mut campaign.progress;
            progress.sent = (progress.sent + sent_batch).min(progress.total);
            progress.delivered = (progress.delivered + delivered_batch).min(progress.sent);
            if progress.sent >= progress.total {
                campaign.status = CampaignStatus::Completed;
                progress.finished_at = Some(Utc::now());
                completed = true;
            }
        }
        if completed {
            info!(campaign_id = %id, "Dispatch completed");
            self.event_sink.emit(make_event(
                EventType::DispatchCompleted,
                Some(id),
                None,
                serde_json::json!({}),
            ));
            metrics::counter!("zapline.campaigns.completed").increment(1);
        }
    }
}
