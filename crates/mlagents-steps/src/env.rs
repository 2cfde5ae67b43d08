//! The environment boundary consumed by a training loop.
//!
//! [`BaseEnv`] is the seam between a trainer and whatever drives the
//! simulation (a socket channel to a game-engine instance, an in-process
//! simulator, a scripted test double). Once per simulation step the
//! environment hands out one [`DecisionSteps`]/[`TerminalSteps`] pair per
//! behavior and accepts actions for the agents that requested a decision.

use std::error::Error;
use std::fmt;

use indexmap::IndexMap;
use mlagents_core::{ActionError, ActionTuple, AgentId, BehaviorName, BehaviorSpec, StepsError};

use crate::decision::DecisionSteps;
use crate::terminal::TerminalSteps;

/// Behavior specs keyed by behavior name, in registration order.
pub type BehaviorMapping = IndexMap<BehaviorName, BehaviorSpec>;

/// Errors surfaced by a [`BaseEnv`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvError {
    /// The behavior name is not registered with the environment.
    UnknownBehavior {
        /// The requested name.
        name: BehaviorName,
    },
    /// The environment has been closed.
    Closed,
    /// A step batch could not be built or queried.
    Steps(StepsError),
    /// An action did not match the behavior's action spec.
    Action(ActionError),
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBehavior { name } => write!(f, "unknown behavior '{name}'"),
            Self::Closed => write!(f, "environment is closed"),
            Self::Steps(e) => write!(f, "steps: {e}"),
            Self::Action(e) => write!(f, "action: {e}"),
        }
    }
}

impl Error for EnvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Steps(e) => Some(e),
            Self::Action(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StepsError> for EnvError {
    fn from(e: StepsError) -> Self {
        Self::Steps(e)
    }
}

impl From<ActionError> for EnvError {
    fn from(e: ActionError) -> Self {
        Self::Action(e)
    }
}

/// A multi-agent environment grouping agents by behavior.
///
/// # Lifecycle
///
/// 1. [`reset`](Self::reset) starts a new episode for every agent.
/// 2. [`get_steps`](Self::get_steps) reads each behavior's batches.
/// 3. [`set_actions`](Self::set_actions) /
///    [`set_action_for_agent`](Self::set_action_for_agent) queue actions
///    for agents in the current decision batch.
/// 4. [`step`](Self::step) advances the simulation until at least one
///    agent requests a decision again; go to 2.
/// 5. [`close`](Self::close) releases the environment; every later call
///    fails with [`EnvError::Closed`].
///
/// A simulation step is not a fixed time increment: agents may request
/// decisions at different frequencies.
pub trait BaseEnv {
    /// Behaviors known to the environment.
    fn behavior_specs(&self) -> &BehaviorMapping;

    /// Reset every agent and start a new episode.
    fn reset(&mut self) -> Result<(), EnvError>;

    /// Advance the simulation, applying queued actions.
    fn step(&mut self) -> Result<(), EnvError>;

    /// Decision and terminal batches of `behavior` for the current step.
    fn get_steps(
        &self,
        behavior: &BehaviorName,
    ) -> Result<(DecisionSteps, TerminalSteps), EnvError>;

    /// Queue one action row per agent of the current decision batch,
    /// in the batch's row order.
    fn set_actions(&mut self, behavior: &BehaviorName, action: ActionTuple)
        -> Result<(), EnvError>;

    /// Queue a single-row action for one agent of the current decision
    /// batch.
    fn set_action_for_agent(
        &mut self,
        behavior: &BehaviorName,
        agent_id: AgentId,
        action: ActionTuple,
    ) -> Result<(), EnvError>;

    /// Release the environment.
    fn close(&mut self) -> Result<(), EnvError>;

    /// Spec of `behavior`.
    fn behavior_spec(&self, behavior: &BehaviorName) -> Result<&BehaviorSpec, EnvError> {
        self.behavior_specs()
            .get(behavior)
            .ok_or_else(|| EnvError::UnknownBehavior {
                name: behavior.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_steps_error_as_source() {
        let e: EnvError = StepsError::AgentNotFound {
            agent_id: AgentId(4),
        }
        .into();
        assert_eq!(e.to_string(), "steps: agent_id 4 is not present in the batch");
        assert!(e.source().is_some());
    }

    #[test]
    fn unknown_behavior_display() {
        let e = EnvError::UnknownBehavior {
            name: BehaviorName::from("Crawler"),
        };
        assert_eq!(e.to_string(), "unknown behavior 'Crawler'");
        assert!(e.source().is_none());
    }
}
