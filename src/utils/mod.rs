//! Shared helpers.
//!
//! - [`BitVector`] - fixed-width bit set backing IN/OUT/KILL vectors
//! - [`escape_dot`] - string escaping for Graphviz output

mod bitset;
mod dot;

pub use bitset::{BitVector, Marked};
pub use dot::escape_dot;
