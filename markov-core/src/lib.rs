//! Markov transition-graph text generation library.
//!
//! This crate provides a weighted transition-graph model including:
//! - A single-token (order-1) chain trained on whole sentences
//! - An order-k token-window chain with automatic fallback to the order-1 chain
//! - Weighted random generation bounded by a mandatory length guard
//! - A read-only snapshot of the full graph for external renderers
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core transition-graph model and generation logic.
///
/// This module exposes the graph and its introspection snapshot while keeping
/// internal node bookkeeping private where possible.
pub mod model;

/// I/O utilities (file loading).
///
/// Not exposed
pub(crate) mod io;
