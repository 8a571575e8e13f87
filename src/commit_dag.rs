//! An incrementally-built graph of the commit history.
//!
//! Nodes are created on first mention, so a parent named by a child before
//! its own work item has run exists as a placeholder whose declared parent
//! count is not yet known. Edges run from parent to child, backward from how
//! Git stores the relation.

use gix::hashtable::{hash_map, HashMap};
use gix::ObjectId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use smallvec::SmallVec;

struct CommitNode {
    /// Number of distinct declared parents still unconsumed during the
    /// depth peel. Zero until the commit's own work item has run.
    parents_left: u32,
}

#[derive(Default)]
pub struct CommitDag {
    graph: DiGraph<CommitNode, ()>,
    index: HashMap<ObjectId, NodeIndex>,
    roots: Vec<NodeIndex>,
}

impl CommitDag {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&mut self, oid: ObjectId) -> NodeIndex {
        match self.index.entry(oid) {
            hash_map::Entry::Occupied(e) => *e.get(),
            hash_map::Entry::Vacant(e) => {
                *e.insert(self.graph.add_node(CommitNode { parents_left: 0 }))
            }
        }
    }

    /// Records one commit and its parent edges. Must be called at most once
    /// per commit; the caller's commit table guards that.
    pub fn add_node(&mut self, oid: ObjectId, parents: &[ObjectId]) {
        let node_idx = self.get_or_create(oid);

        // A commit may declare the same parent more than once; the peel
        // consumes one count per distinct incoming edge.
        let mut distinct: SmallVec<[ObjectId; 2]> = SmallVec::new();
        for parent in parents {
            if !distinct.contains(parent) {
                distinct.push(*parent);
            }
        }

        self.graph[node_idx].parents_left = distinct.len() as u32;
        if distinct.is_empty() {
            self.roots.push(node_idx);
        }
        for parent in distinct {
            let parent_idx = self.get_or_create(parent);
            self.graph.add_edge(parent_idx, node_idx, ());
        }
    }

    pub fn num_commits(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of commits on the longest root-to-leaf path, via iterative
    /// level-order peeling.
    ///
    /// Each frontier pass decrements `parents_left` across every outgoing
    /// edge; a child enters the next frontier only once its last parent has
    /// reached it, which yields the longest-path level without ever
    /// re-enqueueing a node. O(V+E), no recursion.
    pub fn max_depth(mut self) -> u64 {
        let mut frontier = std::mem::take(&mut self.roots);
        let mut next = Vec::new();
        let mut depth = 0u64;

        while !frontier.is_empty() {
            depth += 1;
            for node_idx in frontier.drain(..) {
                let children: SmallVec<[NodeIndex; 4]> = self
                    .graph
                    .neighbors_directed(node_idx, Direction::Outgoing)
                    .collect();
                for child_idx in children {
                    let child = &mut self.graph[child_idx];
                    child.parents_left -= 1;
                    if child.parents_left == 0 {
                        next.push(child_idx);
                    }
                }
            }
            std::mem::swap(&mut frontier, &mut next);
        }

        depth
    }
}
