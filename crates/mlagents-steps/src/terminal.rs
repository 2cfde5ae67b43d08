//! Agents whose episode ended this simulation step.
//!
//! Same batch and lookup semantics as [`DecisionSteps`](crate::DecisionSteps),
//! without an action mask and with a per-agent `interrupted` flag.

use indexmap::IndexMap;
use mlagents_core::{AgentId, BatchField, BehaviorSpec, GroupId, StepsError};
use ndarray::{Array1, ArrayD};
use tracing::trace;

use crate::batch::{self, CommonFields};
use crate::config::StepsConfig;
use crate::index::{AgentIndex, IndexState};

/// Final data of one agent whose episode ended.
#[derive(Clone, Debug, PartialEq)]
pub struct TerminalStep {
    /// One array per observation, in behavior-spec order.
    pub obs: Vec<ArrayD<f32>>,
    /// Reward collected since the last step.
    pub reward: f32,
    /// `true` if the episode hit its step limit rather than a terminal
    /// state.
    pub interrupted: bool,
    /// The agent this step belongs to.
    pub agent_id: AgentId,
    /// The agent's group.
    pub group_id: GroupId,
    /// Reward shared by the agent's group since the last step.
    pub group_reward: f32,
}

/// Caller-supplied arrays for a [`TerminalSteps`].
#[derive(Clone, Debug)]
pub struct TerminalBatch {
    /// One tensor per observation; axis 0 is the batch axis.
    pub obs: Vec<ArrayD<f32>>,
    /// Reward per agent.
    pub reward: Array1<f32>,
    /// Interrupted flag per agent.
    pub interrupted: Array1<bool>,
    /// Agent id per row.
    pub agent_id: Vec<AgentId>,
    /// Group id per agent.
    pub group_id: Vec<GroupId>,
    /// Group reward per agent.
    pub group_reward: Array1<f32>,
}

impl TerminalBatch {
    /// A batch whose agents belong to no group and were not interrupted.
    pub fn ungrouped(obs: Vec<ArrayD<f32>>, reward: Array1<f32>, agent_id: Vec<AgentId>) -> Self {
        let n = agent_id.len();
        Self {
            obs,
            reward,
            interrupted: Array1::from_elem(n, false),
            agent_id,
            group_id: vec![GroupId::NONE; n],
            group_reward: Array1::zeros(n),
        }
    }
}

/// Data a batch of agents collected in the step their episode ended.
///
/// An agent id may appear in both the decision and the terminal batch
/// of the same step when the agent ended an episode and immediately
/// started the next one.
#[derive(Clone, Debug)]
pub struct TerminalSteps {
    obs: Vec<ArrayD<f32>>,
    reward: Array1<f32>,
    interrupted: Array1<bool>,
    agent_id: Vec<AgentId>,
    group_id: Vec<GroupId>,
    group_reward: Array1<f32>,
    index: AgentIndex,
}

impl TerminalSteps {
    /// An empty batch sized after `spec`.
    pub fn empty(spec: &BehaviorSpec) -> Self {
        Self {
            obs: batch::empty_observations(spec),
            reward: Array1::zeros(0),
            interrupted: Array1::from_elem(0, false),
            agent_id: Vec::new(),
            group_id: Vec::new(),
            group_reward: Array1::zeros(0),
            index: AgentIndex::new(),
        }
    }

    /// Build a batch with the default [`StepsConfig`].
    ///
    /// # Errors
    ///
    /// See [`with_config`](Self::with_config).
    pub fn new(parts: TerminalBatch) -> Result<Self, StepsError> {
        Self::with_config(parts, &StepsConfig::default())
    }

    /// Build a batch, checking every batched field against the agent count.
    ///
    /// # Errors
    ///
    /// As for [`DecisionSteps::with_config`](crate::DecisionSteps::with_config),
    /// with [`BatchField::Interrupted`] in place of the action mask.
    pub fn with_config(parts: TerminalBatch, config: &StepsConfig) -> Result<Self, StepsError> {
        CommonFields {
            obs: &parts.obs,
            reward: &parts.reward,
            agent_id: &parts.agent_id,
            group_id: &parts.group_id,
            group_reward: &parts.group_reward,
        }
        .validate(config)?;
        batch::check_len(
            BatchField::Interrupted,
            parts.interrupted.len(),
            parts.agent_id.len(),
        )?;

        Ok(Self {
            obs: parts.obs,
            reward: parts.reward,
            interrupted: parts.interrupted,
            agent_id: parts.agent_id,
            group_id: parts.group_id,
            group_reward: parts.group_reward,
            index: AgentIndex::new(),
        })
    }

    /// Check observation count and shapes against `spec`.
    ///
    /// # Errors
    ///
    /// [`StepsError::ObservationCount`] or [`StepsError::ObservationShape`].
    pub fn check_spec(&self, spec: &BehaviorSpec) -> Result<(), StepsError> {
        batch::check_observation_shapes(&self.obs, spec)
    }

    /// Map from agent id to its row; built on first call, then cached.
    pub fn agent_id_to_index(&self) -> &IndexMap<AgentId, usize> {
        self.index.get_or_build(&self.agent_id)
    }

    /// Whether the agent index has been built yet.
    pub fn index_state(&self) -> IndexState {
        self.index.state()
    }

    /// Number of agents in the batch.
    pub fn len(&self) -> usize {
        self.agent_id.len()
    }

    /// Whether the batch has no agents.
    pub fn is_empty(&self) -> bool {
        self.agent_id.is_empty()
    }

    /// Whether `agent_id` has a row in this batch.
    ///
    /// Builds the agent index if it is still unbuilt.
    pub fn contains(&self, agent_id: AgentId) -> bool {
        self.agent_id_to_index().contains_key(&agent_id)
    }

    /// The [`TerminalStep`] of one agent.
    ///
    /// The first lookup builds the agent index, whether or not it
    /// succeeds. Batch data is never changed.
    ///
    /// # Errors
    ///
    /// [`StepsError::AgentNotFound`] if `agent_id` has no row.
    pub fn get(&self, agent_id: AgentId) -> Result<TerminalStep, StepsError> {
        let row = *self
            .agent_id_to_index()
            .get(&agent_id)
            .ok_or(StepsError::AgentNotFound { agent_id })?;
        trace!(%agent_id, row, "extracting terminal step");
        Ok(self.step_at(row, agent_id))
    }

    /// Agent ids in row order.
    pub fn iter(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agent_id.iter().copied()
    }

    /// One [`TerminalStep`] per row, in row order.
    pub fn steps(&self) -> impl Iterator<Item = TerminalStep> + '_ {
        self.agent_id
            .iter()
            .enumerate()
            .map(|(row, &agent_id)| self.step_at(row, agent_id))
    }

    fn step_at(&self, row: usize, agent_id: AgentId) -> TerminalStep {
        TerminalStep {
            obs: batch::observation_rows(&self.obs, row),
            reward: self.reward[row],
            interrupted: self.interrupted[row],
            agent_id,
            group_id: self.group_id[row],
            group_reward: self.group_reward[row],
        }
    }

    /// Batched observations.
    pub fn obs(&self) -> &[ArrayD<f32>] {
        &self.obs
    }

    /// Reward per agent.
    pub fn reward(&self) -> &Array1<f32> {
        &self.reward
    }

    /// Interrupted flag per agent.
    pub fn interrupted(&self) -> &Array1<bool> {
        &self.interrupted
    }

    /// Agent id per row.
    pub fn agent_id(&self) -> &[AgentId] {
        &self.agent_id
    }

    /// Group id per agent.
    pub fn group_id(&self) -> &[GroupId] {
        &self.group_id
    }

    /// Group reward per agent.
    pub fn group_reward(&self) -> &Array1<f32> {
        &self.group_reward
    }
}
