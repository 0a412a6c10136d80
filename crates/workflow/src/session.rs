//! The workflow editor session. Owns one graph and one draft for the
//! lifetime of an authoring session and mediates every UI action against
//! them, keeping the model testable independent of any rendering layer.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::assembly::{assemble, Cadence, CampaignDraft, CampaignObjective, CampaignSubmission};
use crate::error::WorkflowError;
use crate::graph::{CanvasPosition, WorkflowGraph};
use crate::step::{
    MediaSource, PollConfig, StepKind, StepPatch, WorkflowStep, MAX_DELAY_SECS, MIN_DELAY_SECS,
};

/// Horizontal lane new nodes are placed in; purely cosmetic.
const CANVAS_COLUMN_X: f64 = 250.0;
const CANVAS_ROW_SPACING: f64 = 140.0;

/// What confirming the open form will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    /// Create a new node of this kind and append it to the chain.
    New(StepKind),
    /// Patch the existing node with this id.
    Existing(Uuid),
}

/// The open step-configuration form. Field edits happen directly on the
/// form; nothing touches the graph until the form is confirmed.
#[derive(Debug, Clone)]
pub struct StepForm {
    pub target: FormTarget,
    pub kind: StepKind,
    pub content: String,
    pub media: Option<MediaSource>,
    /// Delay in whole seconds as the UI presents it; converted to
    /// milliseconds at confirm time.
    pub delay_secs: u32,
    pub poll_options: Vec<String>,
    pub selectable_count: u32,
}

impl StepForm {
    fn for_new(kind: StepKind) -> Self {
        Self {
            target: FormTarget::New(kind),
            kind,
            content: String::new(),
            media: None,
            delay_secs: kind.default_delay_secs(),
            poll_options: Vec::new(),
            selectable_count: 1,
        }
    }

    fn for_existing(step: &WorkflowStep) -> Self {
        let (poll_options, selectable_count) = match &step.poll {
            Some(poll) => (poll.options.clone(), poll.selectable_count),
            None => (Vec::new(), 1),
        };
        Self {
            target: FormTarget::Existing(step.id),
            kind: step.kind,
            content: step.content.clone(),
            media: step.media.clone(),
            delay_secs: (step.delay_ms / 1000).max(1) as u32,
            poll_options,
            selectable_count,
        }
    }

    /// Builds and validates the step the form describes. Leaves the form
    /// untouched so a failed confirm keeps the user's edits on screen.
    fn build_step(&self, id: Uuid) -> Result<WorkflowStep, WorkflowError> {
        if self.delay_secs < MIN_DELAY_SECS || self.delay_secs > MAX_DELAY_SECS {
            return Err(WorkflowError::DelayOutOfRange {
                min: MIN_DELAY_SECS,
                max: MAX_DELAY_SECS,
            });
        }
        let poll = if self.kind == StepKind::Poll {
            Some(PollConfig {
                selectable_count: self.selectable_count,
                options: self.poll_options.clone(),
            })
        } else {
            None
        };
        let step = WorkflowStep {
            id,
            kind: self.kind,
            content: self.content.clone(),
            media: self.media.clone(),
            delay_ms: u64::from(self.delay_secs) * 1000,
            poll,
        };
        step.validate()?;
        Ok(step)
    }
}

/// One editing session: graph + draft + open form + chain tail.
///
/// The tail is explicit controller state, refreshed by an edge walk from
/// start after every structural mutation — never recomputed from canvas
/// layout. "Add step" appends at the tail.
pub struct WorkflowEditorSession {
    graph: WorkflowGraph,
    draft: CampaignDraft,
    form: Option<StepForm>,
    tail: Uuid,
    submission_in_flight: bool,
}

impl WorkflowEditorSession {
    pub fn new() -> Self {
        let graph = WorkflowGraph::new();
        let tail = graph.start_id();
        Self {
            graph,
            draft: CampaignDraft::new(),
            form: None,
            tail,
            submission_in_flight: false,
        }
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn draft(&self) -> &CampaignDraft {
        &self.draft
    }

    /// Current tail of the chain; the start node when the chain is empty.
    pub fn tail_id(&self) -> Uuid {
        self.tail
    }

    pub fn form(&self) -> Option<&StepForm> {
        self.form.as_ref()
    }

    /// Mutable access to the open form for field edits.
    pub fn form_mut(&mut self) -> Result<&mut StepForm, WorkflowError> {
        self.form.as_mut().ok_or(WorkflowError::NoFormOpen)
    }

    pub fn is_submission_in_flight(&self) -> bool {
        self.submission_in_flight
    }

    // ─── Step form state machine ───────────────────────────────────────────

    /// Opens the configuration form for a new step of the given kind with
    /// per-kind field defaults. An already-open form is replaced; the last
    /// click wins.
    pub fn open_new_step(&mut self, kind: StepKind) {
        debug!(?kind, "Opening new-step form");
        self.form = Some(StepForm::for_new(kind));
    }

    /// Opens the form pre-populated from an existing node.
    pub fn open_edit_step(&mut self, node_id: Uuid) -> Result<(), WorkflowError> {
        if node_id == self.graph.start_id() {
            return Err(WorkflowError::StartNodeProtected);
        }
        let node = self
            .graph
            .node(node_id)
            .ok_or(WorkflowError::NodeNotFound(node_id))?;
        self.form = Some(StepForm::for_existing(&node.step));
        Ok(())
    }

    /// Discards in-progress field edits without touching the graph.
    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Validates the open form and applies it: a new step is created,
    /// auto-connected from the chain tail, and becomes the tail; an
    /// existing step is patched in place. On a validation error the form
    /// stays open with the user's edits intact.
    pub fn confirm_form(&mut self) -> Result<Uuid, WorkflowError> {
        let form = self.form.as_ref().ok_or(WorkflowError::NoFormOpen)?;

        match form.target {
            FormTarget::New(_) => {
                let step = form.build_step(Uuid::new_v4())?;
                let position = CanvasPosition {
                    x: CANVAS_COLUMN_X,
                    y: CANVAS_ROW_SPACING * (self.graph.step_count() as f64 + 1.0),
                };
                let node_id = self.graph.add_step(step, position);
                self.graph.connect(self.tail, node_id)?;
                self.tail = node_id;
                self.form = None;
                info!(node_id = %node_id, "Step appended to workflow chain");
                Ok(node_id)
            }
            FormTarget::Existing(node_id) => {
                let step = form.build_step(node_id)?;
                self.graph.update_step(
                    node_id,
                    StepPatch {
                        content: Some(step.content),
                        media: step.media,
                        delay_ms: Some(step.delay_ms),
                        poll: step.poll,
                    },
                )?;
                self.form = None;
                Ok(node_id)
            }
        }
    }

    // ─── Structural mutations ──────────────────────────────────────────────

    pub fn remove_step(&mut self, node_id: Uuid) -> Result<(), WorkflowError> {
        self.graph.remove_step(node_id)?;
        self.refresh_tail();
        Ok(())
    }

    pub fn connect(&mut self, source: Uuid, target: Uuid) -> Result<Uuid, WorkflowError> {
        let edge_id = self.graph.connect(source, target)?;
        self.refresh_tail();
        Ok(edge_id)
    }

    pub fn disconnect(&mut self, edge_id: Uuid) -> Result<(), WorkflowError> {
        self.graph.disconnect(edge_id)?;
        self.refresh_tail();
        Ok(())
    }

    /// Layout only; never affects linearization or the tail.
    pub fn move_step(
        &mut self,
        node_id: Uuid,
        position: CanvasPosition,
    ) -> Result<(), WorkflowError> {
        self.graph.set_position(node_id, position)
    }

    /// Walks the single-edge chain from start to find the current tail.
    /// Stops at the first node with zero or several outgoing edges; a
    /// fan-out leaves the tail at the last unambiguous node (linearize
    /// will reject the fan-out before any save).
    fn refresh_tail(&mut self) {
        let mut visited = std::collections::HashSet::new();
        let mut current = self.graph.start_id();
        visited.insert(current);

        loop {
            let targets: Vec<Uuid> = self
                .graph
                .edges()
                .iter()
                .filter(|e| e.source == current)
                .map(|e| e.target)
                .collect();
            match targets.as_slice() {
                [next] if visited.insert(*next) => current = *next,
                _ => break,
            }
        }
        self.tail = current;
    }

    // ─── Draft mutators ────────────────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_scheduled_date(&mut self, at: Option<DateTime<Utc>>) {
        self.draft.scheduled_at = at;
    }

    pub fn set_objective(&mut self, objective: CampaignObjective) {
        self.draft.objective = objective;
    }

    pub fn add_recipient(&mut self, contact_id: Uuid) {
        self.draft.add_recipient(contact_id);
    }

    pub fn remove_recipient(&mut self, contact_id: Uuid) {
        self.draft.remove_recipient(contact_id);
    }

    pub fn set_audience(&mut self, contact_ids: Vec<Uuid>) {
        self.draft.set_audience(contact_ids);
    }

    pub fn set_cadence(&mut self, cadence: Cadence) {
        self.draft.cadence = cadence;
    }

    // ─── Submission lifecycle ──────────────────────────────────────────────

    /// Runs assembly and marks a submission in flight. A validation
    /// failure leaves the session untouched; a second call while one is
    /// outstanding is rejected so the UI cannot double-submit.
    pub fn begin_submission(&mut self) -> Result<CampaignSubmission, WorkflowError> {
        if self.submission_in_flight {
            return Err(WorkflowError::SubmissionInFlight);
        }
        let submission = assemble(&self.draft, &self.graph)?;
        self.submission_in_flight = true;
        info!(
            name = %submission.name,
            steps = submission.steps.len(),
            audience = submission.audience.len(),
            "Campaign submission assembled"
        );
        Ok(submission)
    }

    /// Resolves the in-flight submission. Success destroys the draft and
    /// graph (the session is fresh for the next campaign); failure
    /// preserves both so the user can retry.
    pub fn finish_submission(&mut self, succeeded: bool) {
        self.submission_in_flight = false;
        if succeeded {
            self.reset();
        }
    }

    /// Cancels authoring entirely. Nothing is persisted.
    pub fn discard(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.graph = WorkflowGraph::new();
        self.draft = CampaignDraft::new();
        self.form = None;
        self.tail = self.graph.start_id();
        self.submission_in_flight = false;
    }
}

impl Default for WorkflowEditorSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append_text(session: &mut WorkflowEditorSession, content: &str) -> Uuid {
        session.open_new_step(StepKind::Text);
        session.form_mut().unwrap().content = content.to_string();
        session.confirm_form().unwrap()
    }

    #[test]
    fn test_confirm_appends_at_tail() {
        let mut session = WorkflowEditorSession::new();
        assert_eq!(session.tail_id(), session.graph().start_id());

        let a = append_text(&mut session, "first");
        assert_eq!(session.tail_id(), a);

        let b = append_text(&mut session, "second");
        assert_eq!(session.tail_id(), b);

        let chain = session.graph().linearize().unwrap();
        let contents: Vec<&str> = chain.steps.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_cancel_form_leaves_graph_untouched() {
        let mut session = WorkflowEditorSession::new();
        session.open_new_step(StepKind::Text);
        session.form_mut().unwrap().content = "never confirmed".to_string();
        session.cancel_form();

        assert!(session.form().is_none());
        assert_eq!(session.graph().step_count(), 0);
        assert!(session.confirm_form().is_err());
    }

    #[test]
    fn test_failed_confirm_keeps_form_open() {
        let mut session = WorkflowEditorSession::new();
        session.open_new_step(StepKind::Text);
        // Text with no content fails validation.
        assert_eq!(session.confirm_form(), Err(WorkflowError::MissingContent));
        assert!(session.form().is_some());
        assert_eq!(session.graph().step_count(), 0);

        session.form_mut().unwrap().content = "fixed".to_string();
        session.confirm_form().unwrap();
        assert_eq!(session.graph().step_count(), 1);
    }

    #[test]
    fn test_edit_existing_preserves_id_and_delay() {
        let mut session = WorkflowEditorSession::new();
        session.open_new_step(StepKind::Text);
        {
            let form = session.form_mut().unwrap();
            form.content = "Hello {nome}".to_string();
            form.delay_secs = 2;
        }
        let id = session.confirm_form().unwrap();

        session.open_edit_step(id).unwrap();
        assert_eq!(session.form().unwrap().content, "Hello {nome}");
        session.form_mut().unwrap().content = "Hi {nome}".to_string();
        session.confirm_form().unwrap();

        let chain = session.graph().linearize().unwrap();
        assert_eq!(chain.steps.len(), 1);
        assert_eq!(chain.steps[0].id, id);
        assert_eq!(chain.steps[0].content, "Hi {nome}");
        assert_eq!(chain.steps[0].delay_ms, 2000);
    }

    #[test]
    fn test_edit_start_node_rejected() {
        let mut session = WorkflowEditorSession::new();
        let start = session.graph().start_id();
        assert_eq!(
            session.open_edit_step(start),
            Err(WorkflowError::StartNodeProtected)
        );
    }

    #[test]
    fn test_tail_refreshes_on_remove_and_disconnect() {
        let mut session = WorkflowEditorSession::new();
        let a = append_text(&mut session, "a");
        let b = append_text(&mut session, "b");
        assert_eq!(session.tail_id(), b);

        session.remove_step(b).unwrap();
        assert_eq!(session.tail_id(), a);

        // Disconnecting a's incoming edge empties the chain again.
        let edge = session.graph().edges()[0].id;
        session.disconnect(edge).unwrap();
        assert_eq!(session.tail_id(), session.graph().start_id());

        // Reconnecting restores a as the tail.
        let start = session.graph().start_id();
        session.connect(start, a).unwrap();
        assert_eq!(session.tail_id(), a);
    }

    #[test]
    fn test_submission_guard_and_retry() {
        let mut session = WorkflowEditorSession::new();
        append_text(&mut session, "hello");
        session.set_name("Launch");
        session.add_recipient(Uuid::new_v4());

        let submission = session.begin_submission().unwrap();
        assert_eq!(submission.steps.len(), 1);
        assert!(session.is_submission_in_flight());
        assert_eq!(
            session.begin_submission(),
            Err(WorkflowError::SubmissionInFlight)
        );

        // Failure preserves the draft for a retry.
        session.finish_submission(false);
        assert!(!session.is_submission_in_flight());
        assert_eq!(session.draft().name, "Launch");
        assert_eq!(session.graph().step_count(), 1);

        // Success clears everything.
        session.begin_submission().unwrap();
        session.finish_submission(true);
        assert!(session.draft().name.is_empty());
        assert_eq!(session.graph().step_count(), 0);
        assert_eq!(session.tail_id(), session.graph().start_id());
    }

    #[test]
    fn test_failed_assembly_does_not_mark_in_flight() {
        let mut session = WorkflowEditorSession::new();
        // No steps, no audience, no name.
        assert_eq!(session.begin_submission(), Err(WorkflowError::EmptyWorkflow));
        assert!(!session.is_submission_in_flight());
    }

    #[test]
    fn test_move_step_never_changes_order() {
        let mut session = WorkflowEditorSession::new();
        let a = append_text(&mut session, "a");
        let b = append_text(&mut session, "b");

        // Drag a far below b on the canvas.
        session
            .move_step(a, CanvasPosition { x: 0.0, y: 9000.0 })
            .unwrap();

        let chain = session.graph().linearize().unwrap();
        assert_eq!(chain.steps[0].id, a);
        assert_eq!(chain.steps[1].id, b);
    }

    #[test]
    fn test_poll_form_defaults_and_confirm() {
        let mut session = WorkflowEditorSession::new();
        session.open_new_step(StepKind::Poll);
        {
            let form = session.form_mut().unwrap();
            assert_eq!(form.delay_secs, StepKind::Poll.default_delay_secs());
            form.content = "Which flavor?".to_string();
            form.poll_options = vec!["Chocolate".to_string(), "Vanilla".to_string()];
            form.selectable_count = 1;
        }
        let id = session.confirm_form().unwrap();
        let node = session.graph().node(id).unwrap();
        assert_eq!(node.step.poll.as_ref().unwrap().options.len(), 2);
    }
}
