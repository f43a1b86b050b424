//! Node table keyed by node number.
//!
//! Stores every node of a network, centroids included, and exposes the
//! regular ones to the matcher through [`NodeSource`].

use std::collections::BTreeMap;

use crate::identifiers::NodeId;
use crate::models::traits::NodeSource;
use crate::models::types::*;

#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    nodes: BTreeMap<NodeId, NetworkNode>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from nodes; a repeated id is rejected
    pub fn from_nodes(nodes: impl IntoIterator<Item = NetworkNode>) -> Result<Self> {
        let mut table = Self::new();
        for node in nodes {
            table.insert(node)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, node: NetworkNode) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(MatchError::malformed(
                format!("node {}", node.id),
                "duplicate node id",
            ));
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Drop a node, leaving any reference to it dangling
    pub fn remove(&mut self, id: NodeId) -> Option<NetworkNode> {
        self.nodes.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn centroid_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_centroid).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkNode> {
        self.nodes.values()
    }
}

impl NodeSource for NodeTable {
    fn nodes(&self) -> Result<Vec<NetworkNode>> {
        Ok(self.nodes.values().filter(|n| !n.is_centroid).copied().collect())
    }

    fn node(&self, id: NodeId) -> Option<NetworkNode> {
        self.nodes.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_nodes_only_in_id_order() {
        let table = NodeTable::from_nodes(vec![
            NetworkNode::new(300, 3.0, 3.0),
            NetworkNode::centroid(1, 0.0, 0.0),
            NetworkNode::new(101, 1.0, 1.0),
        ])
        .unwrap();

        let ids: Vec<u64> = table.nodes().unwrap().iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![101, 300]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.centroid_count(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = NodeTable::from_nodes(vec![
            NetworkNode::new(5, 0.0, 0.0),
            NetworkNode::new(5, 1.0, 1.0),
        ]);
        assert!(matches!(result, Err(MatchError::MalformedInput { .. })));
    }

    #[test]
    fn test_removed_node_no_longer_resolves() {
        let mut table = NodeTable::from_nodes(vec![NetworkNode::new(5, 0.0, 0.0)]).unwrap();
        assert!(table.node(NodeId(5)).is_some());

        table.remove(NodeId(5));
        assert!(table.node(NodeId(5)).is_none());
        assert!(table.is_empty());
    }
}
