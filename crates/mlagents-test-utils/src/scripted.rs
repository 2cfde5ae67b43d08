//! An in-process [`BaseEnv`] with fixed-length episodes.

use indexmap::IndexMap;
use mlagents_core::{ActionTuple, AgentId, BehaviorName, BehaviorSpec, GroupId, StepsError};
use mlagents_steps::{
    BaseEnv, BehaviorMapping, DecisionBatch, DecisionSteps, EnvError, TerminalBatch,
    TerminalSteps,
};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::fixtures::random_obs;

/// Knobs for a [`ScriptedEnv`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedEnvConfig {
    /// Agents spawned per behavior at the start of every episode.
    pub agents_per_behavior: usize,
    /// Simulation steps before every agent is interrupted and respawned.
    pub episode_length: u32,
    /// Seed for observation noise.
    pub seed: u64,
}

impl Default for ScriptedEnvConfig {
    fn default() -> Self {
        Self {
            agents_per_behavior: 3,
            episode_length: 4,
            seed: 0,
        }
    }
}

struct BehaviorState {
    spec: BehaviorSpec,
    age: u32,
    decision: DecisionSteps,
    terminal: TerminalSteps,
    pending: Option<ActionTuple>,
    last_applied: Option<ActionTuple>,
}

/// A deterministic environment for exercising trainer-side code.
///
/// Every behavior runs episodes of `episode_length` steps. All agents
/// of a behavior request a decision every step; the reward of an agent
/// is the sum of its last action's components. When an episode ends
/// the agents show up in the terminal batch (interrupted) and fresh
/// agent ids take their place in the decision batch of the same step.
/// Steps without queued actions apply the all-zero action.
pub struct ScriptedEnv {
    specs: BehaviorMapping,
    config: ScriptedEnvConfig,
    rng: ChaCha8Rng,
    states: IndexMap<BehaviorName, BehaviorState>,
    next_agent: i32,
    steps_taken: u64,
    closed: bool,
}

impl ScriptedEnv {
    pub fn new(specs: BehaviorMapping, config: ScriptedEnvConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let states = specs
            .iter()
            .map(|(name, spec)| {
                let state = BehaviorState {
                    spec: spec.clone(),
                    age: 0,
                    decision: DecisionSteps::empty(spec),
                    terminal: TerminalSteps::empty(spec),
                    pending: None,
                    last_applied: None,
                };
                (name.clone(), state)
            })
            .collect();
        Self {
            specs,
            config,
            rng,
            states,
            next_agent: 0,
            steps_taken: 0,
            closed: false,
        }
    }

    /// A single-behavior environment.
    pub fn single(name: &str, spec: BehaviorSpec, config: ScriptedEnvConfig) -> Self {
        let mut specs = BehaviorMapping::new();
        specs.insert(BehaviorName::from(name), spec);
        Self::new(specs, config)
    }

    /// Simulation steps taken since construction.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// The action applied to `behavior` by the most recent [`step`](BaseEnv::step).
    pub fn last_applied(&self, behavior: &BehaviorName) -> Option<&ActionTuple> {
        self.states.get(behavior)?.last_applied.as_ref()
    }

    fn ensure_open(&self) -> Result<(), EnvError> {
        if self.closed {
            return Err(EnvError::Closed);
        }
        Ok(())
    }

    fn state_mut(&mut self, behavior: &BehaviorName) -> Result<&mut BehaviorState, EnvError> {
        self.states
            .get_mut(behavior)
            .ok_or_else(|| EnvError::UnknownBehavior {
                name: behavior.clone(),
            })
    }

    fn spawn(&mut self) -> Vec<AgentId> {
        let ids = (0..self.config.agents_per_behavior)
            .map(|i| AgentId(self.next_agent + i as i32))
            .collect();
        self.next_agent += self.config.agents_per_behavior as i32;
        ids
    }
}

fn decision_for(
    spec: &BehaviorSpec,
    agent_id: Vec<AgentId>,
    reward: Array1<f32>,
    rng: &mut ChaCha8Rng,
) -> Result<DecisionSteps, StepsError> {
    let n = agent_id.len();
    let mut parts = DecisionBatch::ungrouped(random_obs(spec, n, rng), reward, agent_id);
    let branches = spec.action_spec().discrete_branches();
    if !branches.is_empty() {
        parts = parts.with_action_mask(
            branches
                .iter()
                .map(|&size| Array2::from_elem((n, size), false))
                .collect(),
        );
    }
    DecisionSteps::new(parts)
}

fn rewards_of(action: &ActionTuple) -> Array1<f32> {
    let n = action.n_agents();
    Array1::from_shape_fn(n, |row| {
        let continuous: f32 = action.continuous().row(row).sum();
        let discrete: i32 = action.discrete().row(row).sum();
        continuous + discrete as f32
    })
}

impl BaseEnv for ScriptedEnv {
    fn behavior_specs(&self) -> &BehaviorMapping {
        &self.specs
    }

    fn reset(&mut self) -> Result<(), EnvError> {
        self.ensure_open()?;
        let names: Vec<BehaviorName> = self.states.keys().cloned().collect();
        for name in names {
            let ids = self.spawn();
            let n = ids.len();
            let Self { states, rng, .. } = self;
            let state = states
                .get_mut(&name)
                .ok_or_else(|| EnvError::UnknownBehavior { name: name.clone() })?;
            state.decision = decision_for(&state.spec, ids, Array1::zeros(n), rng)?;
            state.terminal = TerminalSteps::empty(&state.spec);
            state.age = 0;
            state.pending = None;
            state.last_applied = None;
        }
        debug!(behaviors = self.states.len(), "scripted env reset");
        Ok(())
    }

    fn step(&mut self) -> Result<(), EnvError> {
        self.ensure_open()?;
        let names: Vec<BehaviorName> = self.states.keys().cloned().collect();
        for name in names {
            let episode_length = self.config.episode_length;
            let ends = self
                .states
                .get(&name)
                .is_some_and(|s| s.age + 1 >= episode_length);
            let fresh = if ends { self.spawn() } else { Vec::new() };
            let Self { states, rng, .. } = self;
            let state = states
                .get_mut(&name)
                .ok_or_else(|| EnvError::UnknownBehavior { name: name.clone() })?;

            let n = state.decision.len();
            let action = state
                .pending
                .take()
                .unwrap_or_else(|| state.spec.action_spec().empty_action(n));
            let reward = rewards_of(&action);
            state.last_applied = Some(action);

            if ends {
                let ended = state.decision.agent_id().to_vec();
                let terminal = TerminalBatch {
                    obs: random_obs(&state.spec, n, rng),
                    reward,
                    interrupted: Array1::from_elem(n, true),
                    agent_id: ended,
                    group_id: vec![GroupId::NONE; n],
                    group_reward: Array1::zeros(n),
                };
                state.terminal = TerminalSteps::new(terminal)?;
                let spawned = fresh.len();
                state.decision = decision_for(&state.spec, fresh, Array1::zeros(spawned), rng)?;
                state.age = 0;
                debug!(behavior = %name, ended = n, "episode ended");
            } else {
                let ids = state.decision.agent_id().to_vec();
                state.decision = decision_for(&state.spec, ids, reward, rng)?;
                state.terminal = TerminalSteps::empty(&state.spec);
                state.age += 1;
            }
        }
        self.steps_taken += 1;
        Ok(())
    }

    fn get_steps(
        &self,
        behavior: &BehaviorName,
    ) -> Result<(DecisionSteps, TerminalSteps), EnvError> {
        self.ensure_open()?;
        let state = self
            .states
            .get(behavior)
            .ok_or_else(|| EnvError::UnknownBehavior {
                name: behavior.clone(),
            })?;
        Ok((state.decision.clone(), state.terminal.clone()))
    }

    fn set_actions(
        &mut self,
        behavior: &BehaviorName,
        action: ActionTuple,
    ) -> Result<(), EnvError> {
        self.ensure_open()?;
        let state = self.state_mut(behavior)?;
        let n = state.decision.len();
        if let Err(e) = state.spec.action_spec().validate_action(&action, n) {
            warn!(%behavior, error = %e, "rejected action batch");
            return Err(e.into());
        }
        state.pending = Some(action);
        Ok(())
    }

    fn set_action_for_agent(
        &mut self,
        behavior: &BehaviorName,
        agent_id: AgentId,
        action: ActionTuple,
    ) -> Result<(), EnvError> {
        self.ensure_open()?;
        let state = self.state_mut(behavior)?;
        let row = *state
            .decision
            .agent_id_to_index()
            .get(&agent_id)
            .ok_or(StepsError::AgentNotFound { agent_id })?;
        let action_spec = state.spec.action_spec();
        if let Err(e) = action_spec.validate_action(&action, 1) {
            warn!(%behavior, %agent_id, error = %e, "rejected agent action");
            return Err(e.into());
        }

        let n = state.decision.len();
        let queued = state
            .pending
            .take()
            .unwrap_or_else(|| action_spec.empty_action(n));
        let (mut continuous, mut discrete) = queued.into_parts();
        continuous.row_mut(row).assign(&action.continuous().row(0));
        discrete.row_mut(row).assign(&action.discrete().row(0));
        state.pending = Some(ActionTuple::new(continuous, discrete));
        Ok(())
    }

    fn close(&mut self) -> Result<(), EnvError> {
        self.ensure_open()?;
        self.closed = true;
        debug!(steps = self.steps_taken, "scripted env closed");
        Ok(())
    }
}
