//! Infrastructure adapters and runtime bootstrap.

pub mod docx;
pub mod error;
pub mod http;
pub mod pdf;
pub mod telemetry;
