//! Core Module - Business Logic
//!
//! Input resolution, the scan workflow, risk scoring and report rendering.

pub mod report;
pub mod resolver;
pub mod risk_score;
pub mod workflow;

pub use report::*;
pub use resolver::*;
pub use risk_score::*;
pub use workflow::*;
