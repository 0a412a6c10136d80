//! The editable workflow graph. Holds nodes and edges and answers
//! structural queries; it never executes anything.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::step::{StepPatch, WorkflowStep};

/// Canvas coordinates for layout. Never semantically meaningful —
/// linearization follows edges, not positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

/// A step node on the canvas: one [`WorkflowStep`] plus where it is drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepNode {
    pub id: Uuid,
    pub step: WorkflowStep,
    pub position: CanvasPosition,
}

/// A directed edge: "send source, then after source's delay proceed to
/// target". Edges carry no payload of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
}

/// The linearized execution order derived from the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearChain {
    /// Steps in send order, start node excluded.
    pub steps: Vec<WorkflowStep>,
    /// Step nodes present in the graph but unreachable from start.
    /// Excluded from the chain; callers decide whether that blocks a save.
    pub orphaned: Vec<Uuid>,
}

impl LinearChain {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of per-step delays across the chain.
    pub fn total_delay_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.delay_ms).sum()
    }
}

/// Directed graph of broadcast steps rooted at a distinguished start node.
///
/// The start node is a bare id, not a step: it has no configuration, never
/// receives an incoming edge, and cannot be removed. Every other node wraps
/// exactly one [`WorkflowStep`].
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    start: Uuid,
    nodes: HashMap<Uuid, StepNode>,
    edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self {
            start: Uuid::new_v4(),
            nodes: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Id of the start node.
    pub fn start_id(&self) -> Uuid {
        self.start
    }

    /// Number of step nodes (start excluded).
    pub fn step_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node_id: Uuid) -> bool {
        node_id == self.start || self.nodes.contains_key(&node_id)
    }

    pub fn node(&self, node_id: Uuid) -> Option<&StepNode> {
        self.nodes.get(&node_id)
    }

    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    pub fn outgoing_degree(&self, node_id: Uuid) -> usize {
        self.edges.iter().filter(|e| e.source == node_id).count()
    }

    pub fn incoming_degree(&self, node_id: Uuid) -> usize {
        self.edges.iter().filter(|e| e.target == node_id).count()
    }

    /// Layout snapshot for canvas round-trips.
    pub fn positions(&self) -> HashMap<Uuid, CanvasPosition> {
        self.nodes.iter().map(|(id, n)| (*id, n.position)).collect()
    }

    /// Adds a step node at the given canvas position and returns its id.
    /// The node starts disconnected; callers wire it with [`connect`].
    ///
    /// [`connect`]: WorkflowGraph::connect
    pub fn add_step(&mut self, step: WorkflowStep, position: CanvasPosition) -> Uuid {
        let id = step.id;
        self.nodes.insert(id, StepNode { id, step, position });
        id
    }

    /// Merges a partial update into an existing step. The step's kind is
    /// not patchable; delete and recreate the node to change it.
    pub fn update_step(&mut self, node_id: Uuid, patch: StepPatch) -> Result<(), WorkflowError> {
        if node_id == self.start {
            return Err(WorkflowError::StartNodeProtected);
        }
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(WorkflowError::NodeNotFound(node_id))?;
        patch.apply(&mut node.step);
        Ok(())
    }

    /// Moves a node on the canvas. Layout only.
    pub fn set_position(
        &mut self,
        node_id: Uuid,
        position: CanvasPosition,
    ) -> Result<(), WorkflowError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(WorkflowError::NodeNotFound(node_id))?;
        node.position = position;
        Ok(())
    }

    /// Removes a node and every edge where it is source or target,
    /// atomically. Removing an already-removed id is `NodeNotFound` with
    /// the graph untouched.
    pub fn remove_step(&mut self, node_id: Uuid) -> Result<(), WorkflowError> {
        if node_id == self.start {
            return Err(WorkflowError::StartNodeProtected);
        }
        if self.nodes.remove(&node_id).is_none() {
            return Err(WorkflowError::NodeNotFound(node_id));
        }
        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
        Ok(())
    }

    /// Adds a directed edge and returns its id. Rejects unknown endpoints,
    /// edges into start, self-loops, and duplicate source→target pairs.
    pub fn connect(&mut self, source: Uuid, target: Uuid) -> Result<Uuid, WorkflowError> {
        if !self.contains(source) {
            return Err(WorkflowError::NodeNotFound(source));
        }
        if !self.contains(target) {
            return Err(WorkflowError::NodeNotFound(target));
        }
        if target == self.start {
            return Err(WorkflowError::EdgeIntoStart);
        }
        if source == target {
            return Err(WorkflowError::CycleDetected { node_id: source });
        }
        if self.edges.iter().any(|e| e.source == source && e.target == target) {
            return Err(WorkflowError::DuplicateEdge {
                source_id: source,
                target_id: target,
            });
        }
        let edge = WorkflowEdge {
            id: Uuid::new_v4(),
            source,
            target,
        };
        let id = edge.id;
        self.edges.push(edge);
        Ok(id)
    }

    /// Removes exactly one edge.
    pub fn disconnect(&mut self, edge_id: Uuid) -> Result<(), WorkflowError> {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != edge_id);
        if self.edges.len() == before {
            return Err(WorkflowError::EdgeNotFound(edge_id));
        }
        Ok(())
    }

    /// Derives the execution order by walking edges from the start node.
    ///
    /// The walk follows the single outgoing edge of each node until a node
    /// has none. A node with more than one outgoing edge is ambiguous
    /// fan-out and is rejected; revisiting a node is a cycle and is
    /// rejected. Step nodes the walk never reaches are reported in
    /// [`LinearChain::orphaned`] rather than silently dropped.
    pub fn linearize(&self) -> Result<LinearChain, WorkflowError> {
        let mut visited = HashSet::new();
        visited.insert(self.start);

        let mut steps = Vec::new();
        let mut current = self.start;

        loop {
            let outgoing: Vec<&WorkflowEdge> =
                self.edges.iter().filter(|e| e.source == current).collect();
            match outgoing.len() {
                0 => break,
                1 => {
                    let next = outgoing[0].target;
                    if !visited.insert(next) {
                        return Err(WorkflowError::CycleDetected { node_id: next });
                    }
                    let node = self
                        .nodes
                        .get(&next)
                        .ok_or(WorkflowError::NodeNotFound(next))?;
                    steps.push(node.step.clone());
                    current = next;
                }
                branches => {
                    return Err(WorkflowError::AmbiguousFanOut {
                        node_id: current,
                        branches,
                    })
                }
            }
        }

        let mut orphaned: Vec<Uuid> = self
            .nodes
            .keys()
            .filter(|id| !visited.contains(id))
            .copied()
            .collect();
        orphaned.sort();
        if !orphaned.is_empty() {
            warn!(
                count = orphaned.len(),
                "Workflow has step nodes not connected to the chain"
            );
        }

        Ok(LinearChain { steps, orphaned })
    }
}

impl Default for WorkflowGraph {
    fn default() -> Self {
        Self::new()
    }
}
