//! Batched step data and per-agent lookup for the ML-Agents environment API.
//!
//! Each simulation step yields, per behavior, a [`DecisionSteps`] batch
//! (agents requesting an action) and a [`TerminalSteps`] batch (agents
//! whose episode ended). Both hold row-aligned tensors and resolve an
//! [`AgentId`](mlagents_core::AgentId) to its row through a lazily built,
//! cached index. The [`BaseEnv`] trait is the boundary a training loop
//! consumes these batches through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod batch;
pub mod config;
pub mod decision;
pub mod env;
pub mod index;
pub mod terminal;

pub use config::{DuplicateAgentPolicy, StepsConfig};
pub use decision::{DecisionBatch, DecisionStep, DecisionSteps};
pub use env::{BaseEnv, BehaviorMapping, EnvError};
pub use index::IndexState;
pub use terminal::{TerminalBatch, TerminalStep, TerminalSteps};
