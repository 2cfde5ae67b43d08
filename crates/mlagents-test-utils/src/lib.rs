//! Test utilities for mlagents-envs development.
//!
//! Provides behavior-spec and step-batch [`fixtures`] and a
//! [`ScriptedEnv`] implementing [`BaseEnv`](mlagents_steps::BaseEnv) for
//! exercising trainer-side code without a running simulation.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
mod scripted;

pub use scripted::{ScriptedEnv, ScriptedEnvConfig};
