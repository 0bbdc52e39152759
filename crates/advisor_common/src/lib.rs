//! Advisor Common - hybrid query-resolution core for course advising.
//!
//! Classifies free-text student questions, resolves them against a validated
//! academic knowledge graph where possible, and falls back to a generative
//! collaborator only when structured resolution cannot answer confidently.
//! Every routing decision is deterministic and auditable.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod decision_log;
pub mod engine;
pub mod error;
pub mod extract;
pub mod generative;
pub mod knowledge;
pub mod normalize;
pub mod people;
pub mod plan;
pub mod reason;
pub mod session;
pub mod types;

pub use engine::AdvisorEngine;
pub use error::AdvisorError;
pub use knowledge::{Catalog, KnowledgeBase};
pub use types::{AdvisorResponse, RoutingDecision, SourceTag};
