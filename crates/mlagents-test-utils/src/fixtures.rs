//! Reusable behavior specs and populated step batches.
//!
//! - [`vector_behavior`]: one flat vector observation.
//! - [`mixed_behavior`]: a vector plus a small "camera" observation and
//!   two discrete branches, so batches carry an action mask.
//! - [`decision_batch`] / [`terminal_batch`]: seeded random data shaped
//!   after a spec, for any list of agent ids.

use mlagents_core::{
    ActionSpec, AgentId, BehaviorSpec, DimensionProperty, GroupId, ObservationSpec,
    ObservationType,
};
use mlagents_steps::{DecisionBatch, TerminalBatch};
use ndarray::{Array1, Array2, ArrayD, IxDyn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A behavior with one vector observation of `obs_size` floats.
pub fn vector_behavior(obs_size: usize, action_spec: ActionSpec) -> BehaviorSpec {
    let obs = ObservationSpec::vector(obs_size)
        .expect("obs_size must be non-zero")
        .with_name("VectorSensor");
    BehaviorSpec::new(vec![obs], action_spec)
}

/// A behavior with a 4-float vector, a 3×3×1 visual observation, a goal
/// signal, and discrete branches of sizes 2 and 3.
pub fn mixed_behavior() -> BehaviorSpec {
    let vector = ObservationSpec::vector(4)
        .expect("non-empty shape")
        .with_name("VectorSensor");
    let camera = ObservationSpec::new(
        [3, 3, 1],
        [
            DimensionProperty::TRANSLATIONAL_EQUIVARIANCE,
            DimensionProperty::TRANSLATIONAL_EQUIVARIANCE,
            DimensionProperty::NONE,
        ],
        ObservationType::Default,
    )
    .expect("valid camera shape")
    .with_name("CameraSensor");
    let goal = ObservationSpec::new([2], [DimensionProperty::NONE], ObservationType::GoalSignal)
        .expect("valid goal shape")
        .with_name("GoalSensor");
    let actions = ActionSpec::new(1, [2, 3]).expect("non-empty branches");
    BehaviorSpec::new(vec![vector, camera, goal], actions)
}

/// Convert raw ids to [`AgentId`]s.
pub fn agent_ids(raw: &[i32]) -> Vec<AgentId> {
    raw.iter().copied().map(AgentId).collect()
}

pub(crate) fn random_obs(spec: &BehaviorSpec, n: usize, rng: &mut ChaCha8Rng) -> Vec<ArrayD<f32>> {
    spec.observation_specs()
        .iter()
        .map(|s| {
            let mut shape = vec![n];
            shape.extend_from_slice(s.shape());
            ArrayD::from_shape_fn(IxDyn(&shape), |_| rng.random::<f32>())
        })
        .collect()
}

fn random_mask(spec: &BehaviorSpec, n: usize, rng: &mut ChaCha8Rng) -> Option<Vec<Array2<bool>>> {
    let branches = spec.action_spec().discrete_branches();
    if branches.is_empty() {
        return None;
    }
    Some(
        branches
            .iter()
            .map(|&size| Array2::from_shape_fn((n, size), |_| rng.random_bool(0.25)))
            .collect(),
    )
}

/// A decision batch for `ids` with seeded random observations and rewards.
///
/// Carries an action mask when `spec` has discrete branches. Agents
/// with an even id share group 1; odd ids are ungrouped.
pub fn decision_batch(spec: &BehaviorSpec, ids: &[i32], seed: u64) -> DecisionBatch {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = ids.len();
    DecisionBatch {
        obs: random_obs(spec, n, &mut rng),
        reward: Array1::from_shape_fn(n, |_| rng.random_range(-1.0f32..1.0)),
        agent_id: agent_ids(ids),
        action_mask: random_mask(spec, n, &mut rng),
        group_id: group_ids(ids),
        group_reward: Array1::from_shape_fn(n, |_| rng.random_range(0.0f32..1.0)),
    }
}

/// A terminal batch for `ids`; every third row is interrupted.
pub fn terminal_batch(spec: &BehaviorSpec, ids: &[i32], seed: u64) -> TerminalBatch {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = ids.len();
    TerminalBatch {
        obs: random_obs(spec, n, &mut rng),
        reward: Array1::from_shape_fn(n, |_| rng.random_range(-1.0f32..1.0)),
        interrupted: Array1::from_shape_fn(n, |row| row % 3 == 0),
        agent_id: agent_ids(ids),
        group_id: group_ids(ids),
        group_reward: Array1::from_shape_fn(n, |_| rng.random_range(0.0f32..1.0)),
    }
}

fn group_ids(ids: &[i32]) -> Vec<GroupId> {
    ids.iter()
        .map(|id| if id % 2 == 0 { GroupId(1) } else { GroupId::NONE })
        .collect()
}
