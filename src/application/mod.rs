//! Application services layer.

pub mod documents;
pub mod error;
pub mod render;
