//! Top-level module for the transition-graph generation system.
//!
//! This crate provides a Markov-chain text generator, including:
//! - Weighted graph vertices (`WeightedNode`)
//! - The trainable transition graph (`TransitionGraph`)
//! - A read-only graph view for renderers (`GraphSnapshot`)

/// Trainable transition graph holding the per-token and per-window
/// node registries.
///
/// Exposes sentence-mode and n-gram training, random-walk generation
/// with order-1 fallback, merging, and bulk file training.
pub mod graph;

/// A single graph vertex identified by a token or a token window.
///
/// Tracks outgoing weighted edges and supports weighted random sampling.
pub mod node;

/// Serializable read-only view of a full graph.
///
/// Sufficient for an external renderer to reconstruct every node and
/// every weighted edge without understanding generation logic.
pub mod snapshot;
