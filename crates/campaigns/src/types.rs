use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use zapline_workflow::{CampaignObjective, CampaignSubmission, WorkflowStep};

/// Lifecycle of a submitted campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Scheduled,
    Dispatching,
    Completed,
    Failed,
    Cancelled,
}

/// Running totals for a campaign's simulated dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchProgress {
    /// Messages the campaign will produce in total.
    pub total: u64,
    pub sent: u64,
    pub delivered: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// An immutable submitted campaign. Only `status` and `progress` change
/// after submission, and only through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub objective: CampaignObjective,
    pub audience: Vec<Uuid>,
    pub steps: Vec<WorkflowStep>,
    pub min_delay_secs: u32,
    pub max_delay_secs: u32,
    pub status: CampaignStatus,
    pub progress: DispatchProgress,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Builds the stored record from an accepted submission.
    pub fn from_submission(submission: CampaignSubmission) -> Self {
        let total = submission.message_count();
        Self {
            id: Uuid::new_v4(),
            name: submission.name,
            scheduled_at: submission.scheduled_at,
            objective: submission.objective,
            audience: submission.audience,
            steps: submission.steps,
            min_delay_secs: submission.min_delay_secs,
            max_delay_secs: submission.max_delay_secs,
            status: CampaignStatus::Scheduled,
            progress: DispatchProgress {
                total,
                ..Default::default()
            },
            created_at: Utc::now(),
        }
    }

    /// Average seconds between sends under this campaign's cadence.
    pub fn avg_send_spacing_secs(&self) -> f64 {
        f64::from(self.min_delay_secs + self.max_delay_secs) / 2.0
    }
}
