//! Branch-and-bound nodes and the open-node queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::NodeSelection;

/// A subproblem: the root model with tightened variable bounds.
#[derive(Debug, Clone)]
pub(crate) struct BnbNode {
    /// Bounds per model variable.
    pub bounds: Vec<(f64, f64)>,
    /// Relaxation objective of the parent (lower bound for this node).
    pub bound: f64,
    /// Depth in the search tree (0 = root).
    pub depth: usize,
    /// Creation order, used to break ties deterministically.
    pub seq: u64,
}

/// Heap entry ordering nodes by best (lowest) bound first.
pub(crate) struct BestBoundEntry(BnbNode);

impl PartialEq for BestBoundEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BestBoundEntry {}

impl Ord for BestBoundEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: lower bound = higher priority, then
        // deeper, then older nodes.
        other
            .0
            .bound
            .total_cmp(&self.0.bound)
            .then_with(|| self.0.depth.cmp(&other.0.depth))
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

impl PartialOrd for BestBoundEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Open nodes, ordered according to the node selection rule.
pub(crate) enum NodeQueue {
    DepthFirst(Vec<BnbNode>),
    BestBound(BinaryHeap<BestBoundEntry>),
}

impl NodeQueue {
    pub fn new(selection: NodeSelection) -> Self {
        match selection {
            NodeSelection::DepthFirst => NodeQueue::DepthFirst(Vec::new()),
            NodeSelection::BestBound => NodeQueue::BestBound(BinaryHeap::new()),
        }
    }

    pub fn push(&mut self, node: BnbNode) {
        match self {
            NodeQueue::DepthFirst(stack) => stack.push(node),
            NodeQueue::BestBound(heap) => heap.push(BestBoundEntry(node)),
        }
    }

    pub fn pop(&mut self) -> Option<BnbNode> {
        match self {
            NodeQueue::DepthFirst(stack) => stack.pop(),
            NodeQueue::BestBound(heap) => heap.pop().map(|entry| entry.0),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NodeQueue::DepthFirst(stack) => stack.len(),
            NodeQueue::BestBound(heap) => heap.len(),
        }
    }

    /// Lowest bound among open nodes.
    pub fn best_bound(&self) -> Option<f64> {
        let bounds: Box<dyn Iterator<Item = f64> + '_> = match self {
            NodeQueue::DepthFirst(stack) => Box::new(stack.iter().map(|n| n.bound)),
            NodeQueue::BestBound(heap) => Box::new(heap.iter().map(|e| e.0.bound)),
        };
        bounds.min_by(f64::total_cmp)
    }
}
