//! Campaign workflow authoring core — graph model, editor session, assembly.
//!
//! A workflow is a directed graph of broadcast steps rooted at a fixed
//! start node. The editor session mediates UI actions against the graph,
//! and assembly linearizes the graph into the ordered step sequence a
//! delivery worker would consume.

pub mod assembly;
pub mod error;
pub mod graph;
pub mod session;
pub mod step;

pub use assembly::{assemble, Cadence, CampaignDraft, CampaignObjective, CampaignSubmission};
pub use error::WorkflowError;
pub use graph::{CanvasPosition, LinearChain, StepNode, WorkflowEdge, WorkflowGraph};
pub use session::{StepForm, WorkflowEditorSession};
pub use step::{MediaSource, PollConfig, StepKind, StepPatch, WorkflowStep};
