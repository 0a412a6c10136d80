use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;

/// Form delay range in whole seconds. The UI works in seconds and the
/// model stores milliseconds; conversion happens at confirm time.
pub const MIN_DELAY_SECS: u32 = 1;
pub const MAX_DELAY_SECS: u32 = 60;

/// What a step broadcasts. Fixed set; immutable after a step is created —
/// changing the kind means deleting the node and creating a new one, which
/// is why [`StepPatch`] deliberately has no kind field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Text,
    Audio,
    Image,
    Video,
    Document,
    Poll,
}

impl StepKind {
    /// Default delay suggested when a new-step form opens, in seconds.
    /// Media kinds default higher to reflect expected render time.
    pub fn default_delay_secs(&self) -> u32 {
        match self {
            Self::Text | Self::Poll => 1,
            Self::Image | Self::Document => 2,
            Self::Audio | Self::Video => 3,
        }
    }

    /// Kinds that carry an attachment and therefore require a media source.
    pub fn requires_media(&self) -> bool {
        matches!(self, Self::Audio | Self::Image | Self::Video | Self::Document)
    }
}

/// Where a step's attachment comes from. An uploaded file and a remote URL
/// are mutually exclusive, so this is an enum rather than two options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum MediaSource {
    Upload { file_ref: String },
    Url { url: String },
}

/// Poll-specific configuration. Only meaningful when the step kind is
/// `Poll`; a valid poll has at least two non-empty options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    pub selectable_count: u32,
    pub options: Vec<String>,
}

/// A single broadcast action in a campaign workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: Uuid,
    pub kind: StepKind,
    /// Message body, media caption, or poll question depending on kind.
    pub content: String,
    pub media: Option<MediaSource>,
    /// Wait after this step fires before the next step, in milliseconds.
    pub delay_ms: u64,
    pub poll: Option<PollConfig>,
}

impl WorkflowStep {
    /// Creates a step of the given kind with the per-kind default delay
    /// and empty content.
    pub fn new(kind: StepKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: String::new(),
            media: None,
            delay_ms: u64::from(kind.default_delay_secs()) * 1000,
            poll: None,
        }
    }

    /// Confirm-time validation, applied before a step enters the graph.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.delay_ms == 0 {
            return Err(WorkflowError::DelayOutOfRange {
                min: MIN_DELAY_SECS,
                max: MAX_DELAY_SECS,
            });
        }

        match self.kind {
            StepKind::Text => {
                // The content IS the message; captions elsewhere are optional.
                if self.content.trim().is_empty() {
                    return Err(WorkflowError::MissingContent);
                }
            }
            StepKind::Poll => {
                let poll = self.poll.as_ref().ok_or(WorkflowError::PollNeedsOptions)?;
                let filled = poll.options.iter().filter(|o| !o.trim().is_empty()).count();
                if filled < 2 {
                    return Err(WorkflowError::PollNeedsOptions);
                }
                if poll.selectable_count < 1 || poll.selectable_count as usize > filled {
                    return Err(WorkflowError::PollSelectableOutOfRange {
                        selectable: poll.selectable_count,
                        options: filled,
                    });
                }
            }
            _ => {
                match &self.media {
                    None => return Err(WorkflowError::MissingMediaSource),
                    Some(MediaSource::Url { url }) => {
                        if url::Url::parse(url).is_err() {
                            return Err(WorkflowError::InvalidMediaUrl(url.clone()));
                        }
                    }
                    Some(MediaSource::Upload { .. }) => {}
                }
            }
        }

        Ok(())
    }
}

/// Partial update merged into an existing step. Carries no `kind` on
/// purpose: a step's kind is immutable for its lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepPatch {
    pub content: Option<String>,
    pub media: Option<MediaSource>,
    pub delay_ms: Option<u64>,
    pub poll: Option<PollConfig>,
}

impl StepPatch {
    /// Applies the patch onto `step`, leaving unset fields untouched.
    pub fn apply(self, step: &mut WorkflowStep) {
        if let Some(content) = self.content {
            step.content = content;
        }
        if let Some(media) = self.media {
            step.media = Some(media);
        }
        if let Some(delay_ms) = self.delay_ms {
            step.delay_ms = delay_ms;
        }
        if let Some(poll) = self.poll {
            step.poll = Some(poll);
        }
    }
}
