use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use super::node::{NodeKey, WeightedNode};
use super::snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot};
use crate::io::read_file;

/// Order value selecting sentence mode instead of a token window.
pub const SENTENCE_ORDER: i32 = -1;

/// Reserved token marking the start of a trainable sequence.
///
/// Tokenization lowercases input and splits on whitespace and commas, so no
/// legitimate token ever equals a sentinel; the design does not defend
/// against a collision.
pub const START: &str = "<start>";

/// Reserved token marking the end of a trainable sequence.
pub const END: &str = "<end>";

/// Reserved token filling window slots that have not yet seen input.
pub const PLACEHOLDER: &str = "<none>";

/// Splits raw text on whitespace and commas into lowercased, non-empty tokens.
fn tokenize(text: &str) -> Vec<String> {
	text.split(|c: char| c.is_whitespace() || c == ',')
		.filter(|token| !token.is_empty())
		.map(str::to_lowercase)
		.collect()
}

/// A weighted transition graph trained from free-form text.
///
/// The graph owns two node registries: one keyed by single tokens (the
/// order-1 chain, always maintained) and one keyed by ordered k-token
/// windows (populated by n-gram training only). Generation walks the graph
/// at random, degrading from the window registry to the token registry when
/// a window has never been observed.
///
/// # Responsibilities
/// - Tokenize and segment raw text during training
/// - Accumulate edge weights in both registries
/// - Generate token sequences by bounded random walk
/// - Merge with another graph of the same order (ex. parallel training)
///
/// # Invariants
/// - `START` and `END` live in the token registry from construction onward
/// - Node identity is unique per distinct token or window key
/// - Every edge weight equals the number of observations (never zero)
///
/// # Notes
/// - The order is fixed for the graph's lifetime: changing it means
///   constructing a fresh graph and swapping the caller's reference.
/// - Validating the order (rejecting 0 or other non-positive values besides
///   [`SENTENCE_ORDER`]) is the caller's responsibility; an order of 0
///   produces empty window keys and is unsupported.
pub struct TransitionGraph {
	/// The window size `k` (>= 1), or [`SENTENCE_ORDER`] for sentence mode.
	order: i32,

	/// Mapping from a single token to its node (the order-1 chain).
	tokens: HashMap<String, WeightedNode>,

	/// Mapping from a k-token window to its node.
	windows: HashMap<Vec<String>, WeightedNode>,
}

impl TransitionGraph {
	/// Creates an empty graph with the given order.
	///
	/// The `START` and `END` sentinel nodes are inserted into the token
	/// registry; no other construction path creates them.
	pub fn new(order: i32) -> Self {
		let mut tokens = HashMap::new();
		tokens.insert(START.to_owned(), WeightedNode::new(NodeKey::Token(START.to_owned())));
		tokens.insert(END.to_owned(), WeightedNode::new(NodeKey::Token(END.to_owned())));
		Self { order, tokens, windows: HashMap::new() }
	}

	/// Returns the configured order.
	pub fn order(&self) -> i32 {
		self.order
	}

	/// Returns the number of distinct tokens known to the graph,
	/// excluding the two sentinels.
	pub fn size(&self) -> usize {
		self.tokens.len() - 2
	}

	/// Returns the node registered for `token`, if any.
	pub fn node(&self, token: &str) -> Option<&WeightedNode> {
		self.tokens.get(token)
	}

	/// Returns the node registered for the window `key`, if any.
	pub fn window(&self, key: &[String]) -> Option<&WeightedNode> {
		self.windows.get(key)
	}

	/// Returns an iterator over every node in both registries.
	pub fn nodes(&self) -> impl Iterator<Item = &WeightedNode> {
		self.tokens.values().chain(self.windows.values())
	}

	/// Gets or lazily creates the token node for `token`.
	fn token_entry(&mut self, token: &str) -> &mut WeightedNode {
		self.tokens
			.entry(token.to_owned())
			.or_insert_with(|| WeightedNode::new(NodeKey::Token(token.to_owned())))
	}

	/// Gets or lazily creates the window node for `window`.
	fn window_entry(&mut self, window: &[String]) -> &mut WeightedNode {
		self.windows
			.entry(window.to_vec())
			.or_insert_with(|| WeightedNode::new(NodeKey::Window(window.to_vec())))
	}

	/// Records one observation of the transition `from` -> `to` in the token
	/// registry, creating both nodes as needed.
	///
	/// Returns the resulting edge weight.
	pub fn add_edge(&mut self, from: &str, to: &str) -> usize {
		self.token_entry(to);
		self.token_entry(from).add_edge(to)
	}

	/// Trains the graph on `text` using whichever strategy matches the
	/// configured order.
	pub fn train(&mut self, text: &str) {
		if self.order == SENTENCE_ORDER {
			self.train_sentence(text);
		} else {
			self.train_ngram(text);
		}
	}

	/// Trains the order-1 chain on whole sentences.
	///
	/// Splits `text` on sentence terminators (`.`, `!`, `?`), discards
	/// whitespace-only segments, tokenizes each remaining segment, wraps it
	/// as `[START, tokens.., END]` and records one edge per adjacent pair.
	///
	/// # Notes
	/// - A surviving segment that tokenizes to nothing (ex. only commas)
	///   stops processing of every remaining segment from this call, not
	///   just the offending one. Known quirk, kept until product direction
	///   says otherwise.
	/// - Degenerate input contributes no edges and never errors.
	pub fn train_sentence(&mut self, text: &str) {
		for segment in text.split(['.', '!', '?']) {
			if segment.trim().is_empty() {
				continue;
			}

			let tokens = tokenize(segment);
			if tokens.is_empty() {
				return;
			}

			let mut wrapped: Vec<&str> = Vec::with_capacity(tokens.len() + 2);
			wrapped.push(START);
			wrapped.extend(tokens.iter().map(String::as_str));
			wrapped.push(END);

			for pair in wrapped.windows(2) {
				self.add_edge(pair[0], pair[1]);
			}
		}
	}

	/// Trains the order-k window chain (and its order-1 fallback) on `text`.
	///
	/// The whole text is tokenized with no sentence segmentation. A rolling
	/// window of `k` slots starts out all placeholders; for every incoming
	/// token:
	/// - an order-1 edge is recorded from the last real window token (or
	///   `START` while the window is still all placeholders) — this fallback
	///   chain is always maintained, independent of `k`
	/// - an order-k edge is recorded from the current window, placeholders
	///   included verbatim
	/// - the window shifts left by one and the token is appended
	pub fn train_ngram(&mut self, text: &str) {
		let k = if self.order < 0 { 0 } else { self.order as usize };
		let mut window: Vec<String> = vec![PLACEHOLDER.to_owned(); k];

		for token in tokenize(text) {
			let previous = match window.last() {
				Some(slot) if slot != PLACEHOLDER => slot.clone(),
				_ => START.to_owned(),
			};
			self.add_edge(&previous, &token);
			self.window_entry(&window).add_edge(&token);

			if k > 0 {
				window.remove(0);
				window.push(token);
			}
		}
	}

	/// Generates a token sequence by walking the order-1 chain from `START`.
	///
	/// The walk stops when `END` is picked, when the current node has no
	/// candidate, or when the emitted count exceeds `max_len` (the loop
	/// continues while it is `<= max_len`, so up to `max_len + 1` tokens may
	/// be emitted). The guard is the sole protection against cyclic
	/// high-weight subgraphs and must never be removed.
	///
	/// Sentinels never appear in the returned sequence.
	pub fn generate_sentence(&self, max_len: usize, weighted: bool) -> Vec<String> {
		let mut generated: Vec<String> = Vec::new();

		let Some(mut current) = self.tokens.get(START) else {
			return generated;
		};

		while generated.len() <= max_len {
			let next = match current.pick_next(weighted) {
				Some(token) if token != END => token.to_owned(),
				_ => break,
			};

			// Lookup misses terminate the walk, they are never an error
			match self.tokens.get(&next) {
				Some(node) => {
					current = node;
					generated.push(next);
				}
				None => {
					generated.push(next);
					break;
				}
			}
		}

		generated
	}

	/// Generates text by walking the order-k window chain, falling back to
	/// the order-1 chain whenever the current window is unknown or dried up.
	///
	/// The initial window is all placeholders, or the prompt's tokenized
	/// tail right-aligned into the window (left-padded when shorter than
	/// `k`, truncated to the last `k` tokens when longer).
	///
	/// Each step looks the window up in the window registry; on a miss, or
	/// when the window node has no outgoing edges, the draw falls back to
	/// the token registry keyed by the last window token (or `START` if that
	/// slot is a placeholder). The walk stops on a double miss, on `END`, or
	/// once `max_len` tokens have been emitted.
	///
	/// Returns the accumulated tokens joined with single spaces.
	pub fn generate_ngram(&self, max_len: usize, prompt: Option<&str>) -> String {
		let k = if self.order < 0 { 0 } else { self.order as usize };
		let mut window: Vec<String> = vec![PLACEHOLDER.to_owned(); k];

		if let Some(prompt) = prompt {
			let tail = tokenize(prompt);
			let take = tail.len().min(k);
			for (slot, token) in window[k - take..].iter_mut().zip(&tail[tail.len() - take..]) {
				*slot = token.clone();
			}
		}

		let mut generated: Vec<String> = Vec::new();
		while generated.len() < max_len {
			let next = self
				.windows
				.get(&window)
				.and_then(|node| node.pick_next(true))
				.or_else(|| {
					let fallback = match window.last() {
						Some(slot) if slot != PLACEHOLDER => slot.as_str(),
						_ => START,
					};
					self.tokens.get(fallback).and_then(|node| node.pick_next(true))
				});

			match next {
				Some(token) if token != END => {
					let token = token.to_owned();
					if k > 0 {
						window.remove(0);
						window.push(token.clone());
					}
					generated.push(token);
				}
				_ => break,
			}
		}

		generated.join(" ")
	}

	/// Generates text using whichever strategy matches the configured order.
	///
	/// `prompt` only seeds the window chain; `weighted` only affects the
	/// sentence chain (the window chain always draws weighted).
	pub fn generate(&self, max_len: usize, prompt: Option<&str>, weighted: bool) -> String {
		if self.order == SENTENCE_ORDER {
			self.generate_sentence(max_len, weighted).join(" ")
		} else {
			self.generate_ngram(max_len, prompt)
		}
	}

	/// Merges another graph into this one.
	///
	/// # Notes
	/// - Both graphs must have the same order.
	/// - Edge weights for matching nodes are summed; missing nodes are cloned.
	///
	/// # Errors
	/// Returns an error if the graph orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.order != other.order {
			return Err("Order mismatch".to_owned());
		}

		for (key, node) in &other.tokens {
			if let Some(existing) = self.tokens.get_mut(key) {
				existing.merge(node)?;
			} else {
				self.tokens.insert(key.clone(), node.clone());
			}
		}

		for (key, node) in &other.windows {
			if let Some(existing) = self.windows.get_mut(key) {
				existing.merge(node)?;
			} else {
				self.windows.insert(key.clone(), node.clone());
			}
		}

		Ok(())
	}

	/// Trains the graph from a whole text file, one line at a time.
	///
	/// # Behavior
	/// - Splits the file's lines into chunks (based on CPU cores * factor).
	/// - Spawns threads training a partial graph for each chunk.
	/// - Merges all partial graphs sequentially into this one.
	///
	/// Each partial graph is owned by exactly one thread, so the
	/// single-threaded contract of the graph itself is preserved.
	///
	/// Returns the number of nodes the file added to the token registry.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or a merge fails.
	pub fn train_file<P: AsRef<Path>>(&mut self, filepath: P) -> Result<usize, Box<dyn std::error::Error>> {
		let lines = read_file(&filepath)?;
		if lines.is_empty() {
			return Ok(0);
		}

		let before = self.size();
		let order = self.order;

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = (lines.len() + chunks - 1) / chunks;

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial = TransitionGraph::new(order);
				for line in chunk {
					partial.train(&line);
				}
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		for partial in rx.iter() {
			self.merge(&partial)?;
		}

		Ok(self.size() - before)
	}

	/// Captures a serializable read-only view of the full graph.
	pub fn snapshot(&self) -> GraphSnapshot {
		let nodes = self
			.nodes()
			.map(|node| NodeSnapshot {
				key: node.key().clone(),
				edges: node
					.edges()
					.map(|(to, weight)| EdgeSnapshot { to: to.to_owned(), weight })
					.collect(),
			})
			.collect();

		GraphSnapshot { order: self.order, nodes }
	}
}
