//! Structured data (JSON-LD) rendering-compliance auditor.
//!
//! Fetches a page, extracts its JSON-LD items and reader-visible text, and asks
//! a reasoning capability whether the structured data makes claims a reader
//! cannot see.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod fetch;
pub mod llm;
pub mod policy;
pub mod render;
pub mod server;
pub mod types;
pub mod util;

pub use audit::{Auditor, assemble};
pub use error::AuditError;
pub use evaluator::{EvaluationRequest, PolicyEvaluator, ReasoningCapability};
pub use types::{AuditResult, AuditStatus, ExtractedContent, Severity, Verdict, Violation};
