//! Agents requesting a decision this simulation step.
//!
//! [`DecisionSteps`] holds one step's batched data for a behavior group;
//! [`DecisionStep`] is the owned per-agent slice returned by
//! [`DecisionSteps::get`].

use indexmap::IndexMap;
use mlagents_core::{AgentId, BatchField, BehaviorSpec, GroupId, StepsError};
use ndarray::{Array1, Array2, ArrayD};
use tracing::trace;

use crate::batch::{self, CommonFields};
use crate::config::StepsConfig;
use crate::index::{AgentIndex, IndexState};

/// Data one agent collected since the last simulation step.
///
/// An owned snapshot: changing it does not affect the batch it was
/// extracted from.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionStep {
    /// One array per observation, in behavior-spec order.
    pub obs: Vec<ArrayD<f32>>,
    /// Reward collected since the last step.
    pub reward: f32,
    /// The agent this step belongs to.
    pub agent_id: AgentId,
    /// One mask row per discrete branch; `true` marks an unavailable
    /// action. `None` when the batch carries no mask.
    pub action_mask: Option<Vec<Array1<bool>>>,
    /// The agent's group.
    pub group_id: GroupId,
    /// Reward shared by the agent's group since the last step.
    pub group_reward: f32,
}

/// Caller-supplied arrays for a [`DecisionSteps`].
///
/// Every batched field has one row per entry of `agent_id`.
#[derive(Clone, Debug)]
pub struct DecisionBatch {
    /// One tensor per observation; axis 0 is the batch axis.
    pub obs: Vec<ArrayD<f32>>,
    /// Reward per agent.
    pub reward: Array1<f32>,
    /// Agent id per row.
    pub agent_id: Vec<AgentId>,
    /// Optional mask, one `(batch, branch_size)` array per discrete branch.
    pub action_mask: Option<Vec<Array2<bool>>>,
    /// Group id per agent.
    pub group_id: Vec<GroupId>,
    /// Group reward per agent.
    pub group_reward: Array1<f32>,
}

impl DecisionBatch {
    /// A batch with no action mask whose agents belong to no group.
    pub fn ungrouped(obs: Vec<ArrayD<f32>>, reward: Array1<f32>, agent_id: Vec<AgentId>) -> Self {
        let n = agent_id.len();
        Self {
            obs,
            reward,
            agent_id,
            action_mask: None,
            group_id: vec![GroupId::NONE; n],
            group_reward: Array1::zeros(n),
        }
    }

    /// Attach an action mask.
    pub fn with_action_mask(mut self, action_mask: Vec<Array2<bool>>) -> Self {
        self.action_mask = Some(action_mask);
        self
    }
}

/// Data a batch of agents of one behavior collected since the last
/// simulation step.
///
/// Not every agent has new data at every step, so the agent set, its
/// order, and the batch size may all change between steps; agents are
/// tracked by [`AgentId`].
///
/// Immutable after construction. The agent-id → row map is built on the
/// first lookup and cached for the lifetime of the batch.
///
/// # Examples
///
/// ```
/// use mlagents_core::AgentId;
/// use mlagents_steps::{DecisionBatch, DecisionSteps, IndexState};
/// use ndarray::array;
///
/// let steps = DecisionSteps::new(DecisionBatch::ungrouped(
///     vec![array![[0.1f32, 0.2], [0.3, 0.4]].into_dyn()],
///     array![1.0, -1.0],
///     vec![AgentId(7), AgentId(3)],
/// ))
/// .unwrap();
///
/// assert_eq!(steps.index_state(), IndexState::Unbuilt);
/// let step = steps.get(AgentId(3)).unwrap();
/// assert_eq!(step.reward, -1.0);
/// assert_eq!(step.obs[0], array![0.3f32, 0.4].into_dyn());
/// assert_eq!(steps.index_state(), IndexState::Built);
/// ```
#[derive(Clone, Debug)]
pub struct DecisionSteps {
    obs: Vec<ArrayD<f32>>,
    reward: Array1<f32>,
    agent_id: Vec<AgentId>,
    action_mask: Option<Vec<Array2<bool>>>,
    group_id: Vec<GroupId>,
    group_reward: Array1<f32>,
    index: AgentIndex,
}

impl DecisionSteps {
    /// An empty batch sized after `spec`.
    ///
    /// Every observation tensor has shape `[0, *obs_spec.shape]`, the
    /// scalar vectors are empty, and there is no action mask.
    pub fn empty(spec: &BehaviorSpec) -> Self {
        Self {
            obs: batch::empty_observations(spec),
            reward: Array1::zeros(0),
            agent_id: Vec::new(),
            action_mask: None,
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
    pub fn new(parts: DecisionBatch) -> Result<Self, StepsError> {
        Self::with_config(parts, &StepsConfig::default())
    }

    /// Build a batch, checking every batched field against the agent count.
    ///
    /// # Errors
    ///
    /// - [`StepsError::MissingBatchAxis`] for a scalar observation.
    /// - [`StepsError::BatchSizeMismatch`] when a field's leading
    ///   dimension differs from `agent_id.len()`.
    /// - [`StepsError::DuplicateAgentId`] / [`StepsError::NonFiniteReward`]
    ///   when `config` asks for those checks.
    pub fn with_config(parts: DecisionBatch, config: &StepsConfig) -> Result<Self, StepsError> {
        CommonFields {
            obs: &parts.obs,
            reward: &parts.reward,
            agent_id: &parts.agent_id,
            group_id: &parts.group_id,
            group_reward: &parts.group_reward,
        }
        .validate(config)?;

        if let Some(mask) = &parts.action_mask {
            let n = parts.agent_id.len();
            for (branch, m) in mask.iter().enumerate() {
                batch::check_len(BatchField::ActionMask(branch), m.nrows(), n)?;
            }
        }

        Ok(Self {
            obs: parts.obs,
            reward: parts.reward,
            agent_id: parts.agent_id,
            action_mask: parts.action_mask,
            group_id: parts.group_id,
            group_reward: parts.group_reward,
            index: AgentIndex::new(),
        })
    }

    /// Check observation shapes and action-mask branches against `spec`.
    ///
    /// # Errors
    ///
    /// [`StepsError::ObservationCount`], [`StepsError::ObservationShape`],
    /// [`StepsError::ActionMaskBranches`], or [`StepsError::ActionMaskWidth`].
    pub fn check_spec(&self, spec: &BehaviorSpec) -> Result<(), StepsError> {
        batch::check_observation_shapes(&self.obs, spec)?;
        if let Some(mask) = &self.action_mask {
            let branches = spec.action_spec().discrete_branches();
            if mask.len() != branches.len() {
                return Err(StepsError::ActionMaskBranches {
                    expected: branches.len(),
                    actual: mask.len(),
                });
            }
            for (branch, (m, &size)) in mask.iter().zip(branches).enumerate() {
                if m.ncols() != size {
                    return Err(StepsError::ActionMaskWidth {
                        branch,
                        expected: size,
                        actual: m.ncols(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Map from agent id to its row in this batch.
    ///
    /// Built on the first call by scanning the agent ids in row order;
    /// a repeated id maps to its last row. Later calls return the cached
    /// map.
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

    /// The [`DecisionStep`] of one agent.
    ///
    /// Resolves the row through [`agent_id_to_index`](Self::agent_id_to_index),
    /// so the first lookup builds the index, whether or not it succeeds.
    /// Batch data is never changed.
    ///
    /// # Errors
    ///
    /// [`StepsError::AgentNotFound`] if `agent_id` has no row.
    pub fn get(&self, agent_id: AgentId) -> Result<DecisionStep, StepsError> {
        let row = *self
            .agent_id_to_index()
            .get(&agent_id)
            .ok_or(StepsError::AgentNotFound { agent_id })?;
        trace!(%agent_id, row, "extracting decision step");
        Ok(self.step_at(row, agent_id))
    }

    /// Agent ids in row order.
    pub fn iter(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agent_id.iter().copied()
    }

    /// One [`DecisionStep`] per row, in row order.
    pub fn steps(&self) -> impl Iterator<Item = DecisionStep> + '_ {
        self.agent_id
            .iter()
            .enumerate()
            .map(|(row, &agent_id)| self.step_at(row, agent_id))
    }

    fn step_at(&self, row: usize, agent_id: AgentId) -> DecisionStep {
        DecisionStep {
            obs: batch::observation_rows(&self.obs, row),
            reward: self.reward[row],
            agent_id,
            action_mask: self
                .action_mask
                .as_ref()
                .map(|mask| mask.iter().map(|m| m.row(row).to_owned()).collect()),
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

    /// Agent id per row.
    pub fn agent_id(&self) -> &[AgentId] {
        &self.agent_id
    }

    /// Action mask per discrete branch, if the batch carries one.
    pub fn action_mask(&self) -> Option<&[Array2<bool>]> {
        self.action_mask.as_deref()
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
