//! Campaign draft and final assembly. `assemble` is a pure function of
//! draft + graph; it performs every local check before any collaborator
//! call is made, so a failed validation never costs a round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::graph::WorkflowGraph;
use crate::step::WorkflowStep;

/// Lowest allowed minimum cadence delay, in seconds.
pub const MIN_CADENCE_FLOOR_SECS: u32 = 5;

/// Why the campaign is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignObjective {
    Prospecting,
    Communication,
    Promotion,
    Sales,
    Maintenance,
}

/// Randomized per-recipient pacing: each send waits a uniform delay in
/// `[min, max]` seconds. Distinct from per-step delays, which pace the
/// steps within one recipient's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub min_delay_secs: u32,
    pub max_delay_secs: u32,
}

impl Cadence {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.min_delay_secs < MIN_CADENCE_FLOOR_SECS
            || self.max_delay_secs < self.min_delay_secs
        {
            return Err(WorkflowError::InvalidCadence {
                min_floor: MIN_CADENCE_FLOOR_SECS,
            });
        }
        Ok(())
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            min_delay_secs: 5,
            max_delay_secs: 10,
        }
    }
}

/// In-progress authoring state. Owned exclusively by the editing session,
/// never persisted mid-edit; destroyed on successful submit or on cancel.
#[derive(Debug, Clone)]
pub struct CampaignDraft {
    pub name: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub objective: CampaignObjective,
    /// Selected contact ids, deduplicated on insert.
    pub audience: Vec<Uuid>,
    pub cadence: Cadence,
}

impl CampaignDraft {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            scheduled_at: None,
            objective: CampaignObjective::Communication,
            audience: Vec::new(),
            cadence: Cadence::default(),
        }
    }

    /// Adds a contact to the audience; a second add of the same id is a
    /// no-op.
    pub fn add_recipient(&mut self, contact_id: Uuid) {
        if !self.audience.contains(&contact_id) {
            self.audience.push(contact_id);
        }
    }

    pub fn remove_recipient(&mut self, contact_id: Uuid) {
        self.audience.retain(|id| *id != contact_id);
    }

    /// Replaces the audience wholesale, deduplicating while preserving
    /// first-seen order.
    pub fn set_audience(&mut self, contact_ids: Vec<Uuid>) {
        self.audience.clear();
        for id in contact_ids {
            self.add_recipient(id);
        }
    }
}

impl Default for CampaignDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// The payload handed to the campaign-persistence collaborator. Immutable
/// once built; the server boundary re-checks it with [`validate`].
///
/// [`validate`]: CampaignSubmission::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSubmission {
    pub name: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub objective: CampaignObjective,
    pub audience: Vec<Uuid>,
    pub steps: Vec<WorkflowStep>,
    pub min_delay_secs: u32,
    pub max_delay_secs: u32,
}

impl CampaignSubmission {
    /// Server-side re-validation of a payload arriving over the wire.
    /// Mirrors the assemble checks that don't need the graph.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.steps.is_empty() {
            return Err(WorkflowError::EmptyWorkflow);
        }
        for step in &self.steps {
            step.validate()?;
        }
        if self.audience.is_empty() {
            return Err(WorkflowError::EmptyAudience);
        }
        if self.name.trim().is_empty() {
            return Err(WorkflowError::MissingName);
        }
        Cadence {
            min_delay_secs: self.min_delay_secs,
            max_delay_secs: self.max_delay_secs,
        }
        .validate()
    }

    /// Messages this campaign will produce: every step goes to every
    /// recipient.
    pub fn message_count(&self) -> u64 {
        self.audience.len() as u64 * self.steps.len() as u64
    }
}

/// Packages {audience, ordered steps, cadence} into a submittable payload.
///
/// Fail-fast order: structural errors from linearization first, then
/// empty workflow, orphaned steps, empty audience, blank name, cadence.
pub fn assemble(
    draft: &CampaignDraft,
    graph: &WorkflowGraph,
) -> Result<CampaignSubmission, WorkflowError> {
    let chain = graph.linearize()?;
    if chain.steps.is_empty() {
        return Err(WorkflowError::EmptyWorkflow);
    }
    if !chain.orphaned.is_empty() {
        return Err(WorkflowError::OrphanedSteps {
            count: chain.orphaned.len(),
        });
    }
    if draft.audience.is_empty() {
        return Err(WorkflowError::EmptyAudience);
    }
    if draft.name.trim().is_empty() {
        return Err(WorkflowError::MissingName);
    }
    draft.cadence.validate()?;

    Ok(CampaignSubmission {
        name: draft.name.trim().to_string(),
        scheduled_at: draft.scheduled_at,
        objective: draft.objective,
        audience: draft.audience.clone(),
        steps: chain.steps,
        min_delay_secs: draft.cadence.min_delay_secs,
        max_delay_secs: draft.cadence.max_delay_secs,
    })
}
