use std::collections::HashMap;
use std::fmt;

use rand::Rng;

use serde::{Deserialize, Serialize};

/// Identity of a graph vertex.
///
/// A vertex is keyed either by a single token or by an ordered window of
/// tokens. Identity is by value: two structurally equal keys always resolve
/// to the same node in a registry, never to duplicates.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKey {
	Token(String),
	Window(Vec<String>),
}

impl fmt::Display for NodeKey {
	/// Renders a token as-is and a window as its slots joined with `|`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeKey::Token(token) => write!(f, "{}", token),
			NodeKey::Window(window) => write!(f, "{}", window.join("|")),
		}
	}
}

/// Represents a vertex in the transition graph.
///
/// A `WeightedNode` corresponds to a fixed key (a token or a token window)
/// and stores all observed transitions from this key to the next token.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during training
/// - Pick the next token using weighted random sampling
/// - Merge with another node having the same key (ex. parallel training support)
///
/// ## Invariants
/// - All edges belong to the same `key`
/// - Each edge weight is strictly positive
#[derive(Clone, Debug)]
pub struct WeightedNode {
	/// Identifier of the node (token or window key).
	key: NodeKey,
	/// Outgoing edges indexed by the destination token.
	/// The value represents how many times this transition was observed.
	/// Example: { "thing" => 42, "add" => 3 }
	edges: HashMap<String, usize>,
}

impl WeightedNode {
	/// Creates a new node with an empty edge set for the given key.
	pub fn new(key: NodeKey) -> Self {
		Self {
			key,
			edges: HashMap::new(),
		}
	}

	/// Returns the identity of this node.
	pub fn key(&self) -> &NodeKey {
		&self.key
	}

	/// Records an occurrence of a transition toward `target`.
	///
	/// - If the edge already exists, its weight is increased.
	/// - Otherwise, a new edge is created with an initial weight of 1.
	///
	/// Returns the resulting weight.
	pub fn add_edge(&mut self, target: &str) -> usize {
		let weight = self.edges.entry(target.to_owned()).or_insert(0);
		*weight += 1;
		*weight
	}

	/// Returns the weight of the edge toward `target`, if it exists.
	pub fn edge_weight(&self, target: &str) -> Option<usize> {
		self.edges.get(target).copied()
	}

	/// Returns the number of distinct outgoing edges.
	pub fn degree(&self) -> usize {
		self.edges.len()
	}

	/// Returns an iterator over `(destination token, weight)` pairs.
	pub fn edges(&self) -> impl Iterator<Item = (&str, usize)> {
		self.edges.iter().map(|(target, weight)| (target.as_str(), *weight))
	}

	/// Picks the next token using a single weighted random draw.
	///
	/// With `weighted` set, the probability of selecting a destination is
	/// proportional to its edge weight; otherwise every destination is
	/// equally likely. Tie-breaking among equal weights is arbitrary.
	///
	/// This method performs:
	/// - an O(n) scan over the edges
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the node has no outgoing edges.
	pub fn pick_next(&self, weighted: bool) -> Option<&str> {
		if self.edges.is_empty() {
			return None;
		}

		// Compute the total draw space
		let total: usize = if weighted {
			self.edges.values().sum()
		} else {
			self.edges.len()
		};
		if total == 0 {
			// Should not happen due to invariants, but kept for safety
			return None;
		}

		// Randomly select a destination
		let mut r = rand::rng().random_range(0..total);

		let mut fallback: Option<&str> = None;
		for (target, weight) in &self.edges {
			let bucket = if weighted { *weight } else { 1 };
			if r < bucket {
				return Some(target);
			}
			r -= bucket;
			fallback = Some(target);
		}

		// Fallback: should not happen, but kept for safety.
		fallback
	}

	/// Merges another node into this one.
	///
	/// Both nodes must carry the same key. Edge weights are summed.
	///
	/// This method is intended for parallel training, where multiple
	/// partial graphs are combined into a single one.
	///
	/// # Errors
	/// Returns an error if the node keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err("Key mismatch".to_owned());
		}

		for (target, weight) in &other.edges {
			*self.edges.entry(target.clone()).or_insert(0) += *weight;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn token_node(token: &str) -> WeightedNode {
		WeightedNode::new(NodeKey::Token(token.to_owned()))
	}

	#[test]
	fn edge_weight_counts_observations() {
		let mut node = token_node("a");
		assert_eq!(node.edge_weight("b"), None);
		assert_eq!(node.add_edge("b"), 1);
		assert_eq!(node.add_edge("b"), 2);
		assert_eq!(node.add_edge("b"), 3);
		assert_eq!(node.edge_weight("b"), Some(3));
		assert_eq!(node.degree(), 1);

		assert_eq!(node.add_edge("c"), 1);
		assert_eq!(node.degree(), 2);
	}

	#[test]
	fn pick_next_without_edges_is_none() {
		let node = token_node("lonely");
		assert_eq!(node.pick_next(true), None);
		assert_eq!(node.pick_next(false), None);
	}

	#[test]
	fn weighted_sampling_respects_proportions() {
		let mut node = token_node("a");
		node.add_edge("b");
		node.add_edge("b");
		node.add_edge("c");

		let draws = 10_000;
		let mut b_count = 0;
		for _ in 0..draws {
			if node.pick_next(true) == Some("b") {
				b_count += 1;
			}
		}

		let b_frequency = b_count as f64 / draws as f64;
		assert!((b_frequency - 2.0 / 3.0).abs() < 0.05, "b frequency was {}", b_frequency);
	}

	#[test]
	fn uniform_sampling_ignores_weights() {
		let mut node = token_node("a");
		node.add_edge("b");
		node.add_edge("b");
		node.add_edge("c");

		let draws = 10_000;
		let mut b_count = 0;
		for _ in 0..draws {
			if node.pick_next(false) == Some("b") {
				b_count += 1;
			}
		}

		let b_frequency = b_count as f64 / draws as f64;
		assert!((b_frequency - 0.5).abs() < 0.05, "b frequency was {}", b_frequency);
	}

	#[test]
	fn merge_sums_edge_weights() {
		let mut left = token_node("a");
		left.add_edge("b");
		left.add_edge("c");

		let mut right = token_node("a");
		right.add_edge("b");
		right.add_edge("d");

		left.merge(&right).unwrap();
		assert_eq!(left.edge_weight("b"), Some(2));
		assert_eq!(left.edge_weight("c"), Some(1));
		assert_eq!(left.edge_weight("d"), Some(1));
	}

	#[test]
	fn merge_rejects_key_mismatch() {
		let mut left = token_node("a");
		let right = token_node("b");
		assert!(left.merge(&right).is_err());
	}

	#[test]
	fn window_key_display_joins_slots() {
		let key = NodeKey::Window(vec!["the".to_owned(), "quick".to_owned()]);
		assert_eq!(key.to_string(), "the|quick");
	}
}
