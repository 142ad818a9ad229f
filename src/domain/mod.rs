//! Domain layer types and invariants.

pub mod blocks;
pub mod error;
pub mod labels;
pub mod template;
