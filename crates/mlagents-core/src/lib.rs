//! Core types for the ML-Agents environment API.
//!
//! This is the leaf crate of the workspace. It defines the identifiers,
//! the observation/behavior/action specifications that describe a
//! behavior group, batched actions, and the error types shared by the
//! step-batch crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod id;
pub mod spec;

pub use action::{ActionSpec, ActionTuple};
pub use error::{ActionError, BatchField, SpecError, StepsError};
pub use id::{AgentId, BehaviorName, GroupId};
pub use spec::{BehaviorSpec, DimensionProperty, ObservationSpec, ObservationType};
