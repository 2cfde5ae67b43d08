//! Benchmark profiles for step-batch operations.
//!
//! - [`reference_behavior_spec`]: a 32-float vector sensor, a 16x16x3
//!   visual sensor, and a hybrid action space with two discrete branches
//! - [`reference_decision_steps`]: a populated batch of `n_agents` agents
//!   with shuffled, non-contiguous ids

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use mlagents_core::{
    ActionSpec, AgentId, BehaviorSpec, DimensionProperty, GroupId, ObservationSpec,
    ObservationType,
};
use mlagents_steps::{DecisionBatch, DecisionSteps};
use ndarray::{Array1, Array2, ArrayD, IxDyn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build the reference behavior spec.
pub fn reference_behavior_spec() -> BehaviorSpec {
    let vector = ObservationSpec::vector(32).unwrap().with_name("VectorSensor");
    let visual = ObservationSpec::new(
        [16, 16, 3],
        [
            DimensionProperty::TRANSLATIONAL_EQUIVARIANCE,
            DimensionProperty::TRANSLATIONAL_EQUIVARIANCE,
            DimensionProperty::NONE,
        ],
        ObservationType::Default,
    )
    .unwrap()
    .with_name("CameraSensor");
    BehaviorSpec::new(vec![vector, visual], ActionSpec::new(2, [3, 5]).unwrap())
}

/// Generate agent ids as they arrive from a long-running simulation:
/// unique, sparse, and in no particular order.
pub fn scattered_agent_ids(n_agents: usize, seed: u64) -> Vec<AgentId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ids: Vec<AgentId> = (0..n_agents as i32).map(|i| AgentId(i * 7 + 3)).collect();
    ids.shuffle(&mut rng);
    ids
}

/// Build a decision batch of `n_agents` agents against
/// [`reference_behavior_spec`], with every fourth agent in group 1.
pub fn reference_decision_steps(n_agents: usize, seed: u64) -> DecisionSteps {
    let spec = reference_behavior_spec();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let obs = spec
        .observation_specs()
        .iter()
        .map(|s| {
            let mut shape = vec![n_agents];
            shape.extend_from_slice(s.shape());
            ArrayD::from_shape_fn(IxDyn(&shape), |_| rng.random::<f32>())
        })
        .collect();
    let action_mask = spec
        .action_spec()
        .discrete_branches()
        .iter()
        .map(|&size| Array2::from_shape_fn((n_agents, size), |_| rng.random_bool(0.1)))
        .collect();

    DecisionSteps::new(DecisionBatch {
        obs,
        reward: Array1::from_shape_fn(n_agents, |_| rng.random_range(-1.0f32..1.0)),
        agent_id: scattered_agent_ids(n_agents, seed),
        action_mask: Some(action_mask),
        group_id: (0..n_agents)
            .map(|i| if i % 4 == 0 { GroupId(1) } else { GroupId::NONE })
            .collect(),
        group_reward: Array1::zeros(n_agents),
    })
    .unwrap()
}
