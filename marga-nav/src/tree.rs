//! Sample set: the tree vertex store shared by all planner variants.

use std::collections::HashMap;

use marga_grid::GridCoord;

use crate::node::{Node, NO_PARENT};

/// Vertex store keyed by cell index.
///
/// Acts as both open and closed list: every inserted node is a permanent
/// tree vertex whose parent may later be replaced by rewiring. Lookup is
/// O(1); scans iterate in first-insertion order so that distance ties
/// resolve the same way on every run.
#[derive(Clone, Debug, Default)]
pub struct SampleSet {
    nodes: HashMap<i32, Node>,
    /// Cell indices in first-insertion order
    order: Vec<i32>,
}

impl SampleSet {
    /// Create a set holding a single tree root.
    pub fn with_root(root: Node) -> Self {
        let mut set = Self::default();
        set.insert(root);
        set
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a cell index is present.
    pub fn contains(&self, id: i32) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Look up a vertex by cell index.
    pub fn get(&self, id: i32) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Insert a vertex. Idempotent on `id`: a later insert with the same
    /// cell index replaces the stored node (used by the goal commit).
    pub fn insert(&mut self, node: Node) {
        if self.nodes.insert(node.id, node).is_none() {
            self.order.push(node.id);
        }
    }

    /// Replace a vertex's parent and accumulated cost together.
    ///
    /// Descendant costs are left to drift; path extraction recomputes the
    /// returned cost from edge lengths, so eager propagation is not needed.
    pub fn reparent(&mut self, id: i32, pid: i32, g: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.pid = pid;
            node.g = g;
        } else {
            debug_assert!(false, "reparent of unknown vertex {}", id);
        }
    }

    /// Vertices in first-insertion order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Nearest vertex to a cell by Euclidean distance (linear scan).
    ///
    /// Ties keep the earliest-inserted vertex.
    pub fn nearest(&self, target: GridCoord) -> Option<Node> {
        let mut best: Option<Node> = None;
        let mut best_d = f32::INFINITY;
        for node in self.iter_ordered() {
            let d = node.coord().distance(&target);
            if d < best_d {
                best_d = d;
                best = Some(*node);
            }
        }
        best
    }

    /// Cell indices of all vertices within `radius` of a cell, in
    /// first-insertion order.
    pub fn neighborhood(&self, center: GridCoord, radius: f32) -> Vec<i32> {
        self.iter_ordered()
            .filter(|node| node.coord().distance(&center) <= radius)
            .map(|node| node.id)
            .collect()
    }

    /// Walk the parent chain from a vertex to its root.
    ///
    /// Returns the cell sequence root-first plus the path cost recomputed
    /// by summing edge lengths (rewiring leaves stale `g` on descendants).
    /// `None` on a dangling parent or a cycle, which would be a store
    /// invariant violation.
    pub fn extract_path(&self, from: i32) -> Option<(Vec<GridCoord>, f32)> {
        let mut cells = Vec::new();
        let mut current = from;
        let mut steps = 0usize;

        loop {
            let node = self.nodes.get(&current)?;
            cells.push(node.coord());
            if node.pid == NO_PARENT {
                break;
            }
            steps += 1;
            if steps > self.nodes.len() {
                debug_assert!(false, "parent chain does not terminate");
                return None;
            }
            current = node.pid;
        }

        cells.reverse();
        let cost = cells
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum();
        Some((cells, cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(x: i32, y: i32, g: f32, pid: i32) -> Node {
        Node::new(x, y, g, 0.0, y * 10 + x, pid)
    }

    #[test]
    fn test_insert_is_idempotent_on_id() {
        let mut set = SampleSet::with_root(node(0, 0, 0.0, NO_PARENT));
        set.insert(node(3, 0, 3.0, 0));
        set.insert(node(3, 0, 2.0, 0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(3).unwrap().g, 2.0);
    }

    #[test]
    fn test_nearest_prefers_earliest_on_tie() {
        let mut set = SampleSet::with_root(node(0, 0, 0.0, NO_PARENT));
        set.insert(node(4, 0, 4.0, 0));
        set.insert(node(0, 4, 4.0, 0));
        // (2, 2) is equidistant from all three vertices
        let nearest = set.nearest(GridCoord::new(2, 2)).unwrap();
        assert_eq!(nearest.id, 0);
    }

    #[test]
    fn test_neighborhood() {
        let mut set = SampleSet::with_root(node(0, 0, 0.0, NO_PARENT));
        set.insert(node(2, 0, 2.0, 0));
        set.insert(node(5, 0, 5.0, 2));
        set.insert(node(9, 0, 9.0, 5));
        let near = set.neighborhood(GridCoord::new(1, 0), 4.0);
        assert_eq!(near, vec![0, 2, 5]);
    }

    #[test]
    fn test_extract_path_recomputes_cost() {
        let mut set = SampleSet::with_root(node(0, 0, 0.0, NO_PARENT));
        set.insert(node(3, 0, 3.0, 0));
        // Stale g on the leaf must not leak into the returned cost
        set.insert(node(3, 4, 99.0, 3));
        let (cells, cost) = set.extract_path(43).unwrap();
        assert_eq!(
            cells,
            vec![
                GridCoord::new(0, 0),
                GridCoord::new(3, 0),
                GridCoord::new(3, 4)
            ]
        );
        assert!((cost - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_extract_path_rejects_dangling_parent() {
        let mut set = SampleSet::default();
        set.insert(node(3, 0, 3.0, 77));
        assert!(set.extract_path(3).is_none());
    }

    #[test]
    fn test_reparent() {
        let mut set = SampleSet::with_root(node(0, 0, 0.0, NO_PARENT));
        set.insert(node(4, 0, 4.0, 0));
        set.insert(node(4, 3, 9.0, 4));
        set.reparent(34, 0, 5.0);
        let n = set.get(34).unwrap();
        assert_eq!(n.pid, 0);
        assert_eq!(n.g, 5.0);
    }
}
