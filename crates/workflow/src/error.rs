use thiserror::Error;
use uuid::Uuid;

/// Everything that can go wrong while authoring or assembling a workflow.
///
/// Validation variants are user-correctable and surfaced inline by the UI;
/// structural variants block saving; session variants indicate a misuse of
/// the editor lifecycle. All are checked locally before any collaborator
/// call is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    // ─── Graph integrity ───────────────────────────────────────────────────
    #[error("Node {0} not found")]
    NodeNotFound(Uuid),

    #[error("Edge {0} not found")]
    EdgeNotFound(Uuid),

    #[error("The start node cannot be configured or removed")]
    StartNodeProtected,

    // Field cannot be called `source`: thiserror would treat it as the
    // error's source and demand `Uuid: std::error::Error`.
    #[error("An edge from {source_id} to {target_id} already exists")]
    DuplicateEdge { source_id: Uuid, target_id: Uuid },

    #[error("Edges cannot target the start node")]
    EdgeIntoStart,

    // ─── Structural (block save) ───────────────────────────────────────────
    #[error("Node {node_id} has {branches} outgoing edges; a broadcast sequence cannot branch")]
    AmbiguousFanOut { node_id: Uuid, branches: usize },

    #[error("Workflow contains a cycle through node {node_id}")]
    CycleDetected { node_id: Uuid },

    #[error("{count} step(s) are not connected to the chain")]
    OrphanedSteps { count: usize },

    // ─── Step validation ───────────────────────────────────────────────────
    #[error("Message text cannot be empty")]
    MissingContent,

    #[error("A media step needs an uploaded file or a remote URL")]
    MissingMediaSource,

    #[error("Invalid media URL: {0}")]
    InvalidMediaUrl(String),

    #[error("A poll needs at least two non-empty options")]
    PollNeedsOptions,

    #[error("Selectable count {selectable} is outside 1..={options}")]
    PollSelectableOutOfRange { selectable: u32, options: usize },

    #[error("Step delay must be between {min} and {max} seconds")]
    DelayOutOfRange { min: u32, max: u32 },

    // ─── Assembly validation ───────────────────────────────────────────────
    #[error("Workflow has no steps")]
    EmptyWorkflow,

    #[error("Campaign audience is empty")]
    EmptyAudience,

    #[error("Campaign name is required")]
    MissingName,

    #[error("Cadence must satisfy min >= {min_floor}s and max >= min")]
    InvalidCadence { min_floor: u32 },

    // ─── Editor session ────────────────────────────────────────────────────
    #[error("No step form is open")]
    NoFormOpen,

    #[error("A submission is already in flight")]
    SubmissionInFlight,
}

impl WorkflowError {
    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NodeNotFound(_) => "node_not_found",
            Self::EdgeNotFound(_) => "edge_not_found",
            Self::StartNodeProtected => "start_node_protected",
            Self::DuplicateEdge { .. } => "duplicate_edge",
            Self::EdgeIntoStart => "edge_into_start",
            Self::AmbiguousFanOut { .. } => "ambiguous_fan_out",
            Self::CycleDetected { .. } => "cycle_detected",
            Self::OrphanedSteps { .. } => "orphaned_steps",
            Self::MissingContent => "missing_content",
            Self::MissingMediaSource => "missing_media_source",
            Self::InvalidMediaUrl(_) => "invalid_media_url",
            Self::PollNeedsOptions => "poll_needs_options",
            Self::PollSelectableOutOfRange { .. } => "poll_selectable_out_of_range",
            Self::DelayOutOfRange { .. } => "delay_out_of_range",
            Self::EmptyWorkflow => "empty_workflow",
            Self::EmptyAudience => "empty_audience",
            Self::MissingName => "missing_name",
            Self::InvalidCadence { .. } => "invalid_cadence",
            Self::NoFormOpen => "no_form_open",
            Self::SubmissionInFlight => "submission_in_flight",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_edge_message_names_both_endpoints() {
        let source_id = Uuid::new_v4();
        let target_id = Uuid::new_v4();
        let err = WorkflowError::DuplicateEdge {
            source_id,
            target_id,
        };
        let message = err.to_string();
        assert!(message.contains(&source_id.to_string()));
        assert!(message.contains(&target_id.to_string()));
        assert_eq!(err.code(), "duplicate_edge");
    }
}
