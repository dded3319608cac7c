//! Scope normalization: heterogeneous scope input to a stable cache key.

pub mod catalog;
pub mod normalizer;

pub use normalizer::{normalize, NormalizedScope, ScopeInput};
