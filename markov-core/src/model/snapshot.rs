use serde::{Deserialize, Serialize};

use super::node::NodeKey;

/// One outgoing weighted edge of a snapshot node.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EdgeSnapshot {
	/// Destination token.
	pub to: String,
	/// Number of times this transition was observed.
	pub weight: usize,
}

/// One node of a snapshot: its identity and every outgoing edge.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NodeSnapshot {
	pub key: NodeKey,
	pub edges: Vec<EdgeSnapshot>,
}

/// A read-only view of a full transition graph.
///
/// Carries every node of both registries with its `(destination, weight)`
/// pairs, which is enough for an external renderer to reconstruct the whole
/// weighted graph without understanding training or generation logic.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GraphSnapshot {
	/// The order the graph was configured with.
	pub order: i32,
	/// Every node of both registries.
	pub nodes: Vec<NodeSnapshot>,
}

impl GraphSnapshot {
	/// Sums the weights of every edge in the snapshot.
	pub fn total_weight(&self) -> usize {
		self.nodes
			.iter()
			.flat_map(|node| node.edges.iter())
			.map(|edge| edge.weight)
			.sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::graph::TransitionGraph;

	#[test]
	fn total_weight_counts_every_observation() {
		let mut graph = TransitionGraph::new(2);
		graph.train_ngram("a b a b");

		// 4 incoming tokens, each recorded once in the token registry
		// and once in the window registry
		assert_eq!(graph.snapshot().total_weight(), 8);
	}

	#[test]
	fn empty_graph_snapshot_only_holds_sentinels() {
		let graph = TransitionGraph::new(crate::model::graph::SENTENCE_ORDER);
		let snapshot = graph.snapshot();
		assert_eq!(snapshot.nodes.len(), 2);
		assert!(snapshot.nodes.iter().all(|node| node.edges.is_empty()));
	}
}
