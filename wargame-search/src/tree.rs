//! Search tree structure and node management
//!
//! Uses arena allocation: nodes live in one vector and refer to each other
//! by index, so parent links never own anything.
//!
//! ## Architecture
//! - Level 2: Tree operations (expand, expand_frontier)
//! - Level 3: Node accessors, root child selection
//! - Level 4: Statistics

use rustc_hash::FxHashMap;
use wargame_core::{Action, GameState, Score};

use crate::clock::{Clock, Timeout};

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the search tree
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Game state at this node
    pub state: GameState,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Action that led here from the parent (None for root)
    pub action: Option<Action>,
    /// Children in move generation order
    pub children: Vec<NodeId>,
    /// Plies below the root
    pub depth: u32,
    /// Successors have been generated
    pub expanded: bool,
    /// Heuristic score, computed at most once
    pub heuristic: Option<Score>,
    /// Value from the latest propagation pass
    pub value: Option<Score>,
}

impl SearchNode {
    pub fn new(state: GameState, parent: Option<NodeId>, action: Option<Action>, depth: u32) -> Self {
        Self {
            state,
            parent,
            action,
            children: Vec::new(),
            depth,
            expanded: false,
            heuristic: None,
            value: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Game over at this node (never expanded)
    pub fn is_terminal(&self) -> bool {
        self.state.is_finished()
    }
}

// ============================================================================
// SEARCH TREE (Level 2 - Tree Operations)
// ============================================================================

/// Search tree with arena allocation and a frontier of unexpanded leaves
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
    frontier: Vec<NodeId>,
}

impl SearchTree {
    /// Create a new tree with the given root state
    pub fn new(root_state: GameState) -> Self {
        Self {
            nodes: vec![SearchNode::new(root_state, None, None, 0)],
            frontier: vec![NodeId::ROOT],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaves waiting for expansion
    pub fn frontier(&self) -> &[NodeId] {
        &self.frontier
    }

    /// Generate the successors of one node
    ///
    /// Returns the new children. Terminal and already expanded nodes get none.
    pub fn expand(&mut self, node_id: NodeId) -> Vec<NodeId> {
        let node = self.get(node_id);
        if node.expanded || node.is_terminal() {
            self.get_mut(node_id).expanded = true;
            return Vec::new();
        }

        let depth = node.depth + 1;
        let successors: Vec<_> = node.state.next_state_candidates().collect();

        let mut children = Vec::with_capacity(successors.len());
        for (state, action) in successors {
            let child_id = NodeId(self.nodes.len());
            self.nodes
                .push(SearchNode::new(state, Some(node_id), Some(action), depth));
            children.push(child_id);
        }

        let node = self.get_mut(node_id);
        node.children.extend_from_slice(&children);
        node.expanded = true;
        children
    }

    /// Expand every frontier node one level; the new children become the frontier
    ///
    /// Returns the number of nodes added. The clock is checked before each
    /// expansion; on timeout the tree keeps whatever was expanded so far.
    pub fn expand_frontier(&mut self, clock: &Clock) -> Result<usize, Timeout> {
        let frontier = std::mem::take(&mut self.frontier);
        let mut added = 0;

        for (i, &node_id) in frontier.iter().enumerate() {
            if let Err(timeout) = clock.check() {
                self.frontier.extend_from_slice(&frontier[i..]);
                return Err(timeout);
            }
            let children = self.expand(node_id);
            added += children.len();
            self.frontier.extend(children);
        }

        Ok(added)
    }

    /// Forget propagated values (cached heuristics are kept)
    pub fn reset_values(&mut self) {
        for node in &mut self.nodes {
            node.value = None;
        }
    }

    // ========================================================================
    // Level 3: Root Child Selection
    // ========================================================================

    /// Best valued root child, first encountered on ties
    pub fn best_root_child(&self, maximizing: bool) -> Option<(NodeId, Score)> {
        let mut best: Option<(NodeId, Score)> = None;
        for &child in &self.get(self.root()).children {
            let Some(value) = self.get(child).value else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, best_value)) if maximizing => value > best_value,
                Some((_, best_value)) => value < best_value,
            };
            if better {
                best = Some((child, value));
            }
        }
        best
    }

    /// Root children carrying exactly `value`, in generation order
    pub fn root_children_valued(&self, value: Score) -> Vec<NodeId> {
        self.get(self.root())
            .children
            .iter()
            .copied()
            .filter(|&child| self.get(child).value == Some(value))
            .collect()
    }

    // ========================================================================
    // Level 4: Statistics
    // ========================================================================

    /// Node count per depth (root at depth 0)
    pub fn nodes_per_depth(&self) -> FxHashMap<u32, u64> {
        let mut counts = FxHashMap::default();
        for node in &self.nodes {
            *counts.entry(node.depth).or_insert(0) += 1;
        }
        counts
    }

    /// Mean number of children over nodes that have any
    pub fn average_branching_factor(&self) -> f64 {
        let parents = self.nodes.iter().filter(|node| !node.children.is_empty()).count();
        if parents == 0 {
            0.0
        } else {
            (self.nodes.len() - 1) as f64 / parents as f64
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
