//! Rule-tree AST for the query-builder to CQL translator
//!
//! This crate defines the closed tagged union a visual query builder's rule
//! tree is decoded into. Traversal sites match exhaustively on the union, so
//! a node is always either a leaf predicate or a combinator group; the
//! loosely-typed wire format is handled separately by [`parse_tree`].

mod json;
mod rule;

pub use json::*;
pub use rule::*;
