//! Property tests for agent lookup over decision and terminal batches.

use std::collections::HashSet;

use mlagents_core::{ActionSpec, AgentId, StepsError};
use mlagents_steps::{DecisionBatch, DecisionSteps, IndexState, TerminalSteps};
use mlagents_test_utils::fixtures::{decision_batch, mixed_behavior, terminal_batch, vector_behavior};
use ndarray::{Array1, Array2};
use proptest::prelude::*;

fn unique_ids() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::hash_set(any::<i32>(), 0..32).prop_map(|set| set.into_iter().collect())
}

/// A batch whose observation row `i` is filled with `i`.
fn row_tagged(ids: &[i32]) -> DecisionSteps {
    let n = ids.len();
    let obs = Array2::from_shape_fn((n, 3), |(row, _)| row as f32).into_dyn();
    let reward = Array1::from_shape_fn(n, |row| row as f32 * 0.5);
    let agent_id = ids.iter().copied().map(AgentId).collect();
    DecisionSteps::new(DecisionBatch::ungrouped(vec![obs], reward, agent_id)).unwrap()
}

proptest! {
    #[test]
    fn index_maps_each_id_to_its_row(ids in unique_ids()) {
        let steps = row_tagged(&ids);
        let index = steps.agent_id_to_index();
        prop_assert_eq!(index.len(), ids.len());
        for (row, &id) in ids.iter().enumerate() {
            prop_assert_eq!(index[&AgentId(id)], row);
        }
    }

    #[test]
    fn get_returns_the_agents_row(ids in unique_ids()) {
        let steps = row_tagged(&ids);
        for (row, &id) in ids.iter().enumerate() {
            let step = steps.get(AgentId(id)).unwrap();
            prop_assert_eq!(step.agent_id, AgentId(id));
            prop_assert_eq!(step.reward, row as f32 * 0.5);
            prop_assert!(step.obs[0].iter().all(|&v| v == row as f32));
            prop_assert!(step.action_mask.is_none());
        }
    }

    #[test]
    fn unknown_id_fails_without_touching_the_batch(ids in unique_ids(), missing in any::<i32>()) {
        prop_assume!(!ids.contains(&missing));
        let steps = row_tagged(&ids);
        let reward = steps.reward().clone();
        let obs = steps.obs().to_vec();
        let agent_id = steps.agent_id().to_vec();
        let group_id = steps.group_id().to_vec();
        let group_reward = steps.group_reward().clone();
        prop_assert_eq!(steps.index_state(), IndexState::Unbuilt);
        prop_assert_eq!(
            steps.get(AgentId(missing)).unwrap_err(),
            StepsError::AgentNotFound { agent_id: AgentId(missing) }
        );
        prop_assert_eq!(steps.reward(), &reward);
        prop_assert_eq!(steps.obs(), obs.as_slice());
        prop_assert_eq!(steps.agent_id(), agent_id.as_slice());
        prop_assert_eq!(steps.group_id(), group_id.as_slice());
        prop_assert_eq!(steps.group_reward(), &group_reward);
        prop_assert!(steps.action_mask().is_none());
        // The lookup itself is the first index request.
        prop_assert_eq!(steps.index_state(), IndexState::Built);
        prop_assert_eq!(steps.agent_id_to_index().len(), ids.len());
    }

    #[test]
    fn index_is_built_once(ids in unique_ids()) {
        let steps = row_tagged(&ids);
        prop_assert_eq!(steps.index_state(), IndexState::Unbuilt);
        let first: *const _ = steps.agent_id_to_index();
        prop_assert_eq!(steps.index_state(), IndexState::Built);
        let second: *const _ = steps.agent_id_to_index();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn duplicate_ids_resolve_to_last_row(ids in prop::collection::vec(0i32..8, 1..24)) {
        let steps = row_tagged(&ids);
        let distinct: HashSet<i32> = ids.iter().copied().collect();
        let index = steps.agent_id_to_index();
        prop_assert_eq!(index.len(), distinct.len());
        for &id in &distinct {
            let last = ids.iter().rposition(|&x| x == id).unwrap();
            prop_assert_eq!(index[&AgentId(id)], last);
        }
    }

    #[test]
    fn fixture_batches_agree_with_their_spec(ids in unique_ids(), seed in any::<u64>()) {
        let spec = mixed_behavior();
        let decision = DecisionSteps::new(decision_batch(&spec, &ids, seed)).unwrap();
        prop_assert!(decision.check_spec(&spec).is_ok());
        let terminal = TerminalSteps::new(terminal_batch(&spec, &ids, seed)).unwrap();
        prop_assert!(terminal.check_spec(&spec).is_ok());
        for id in decision.iter() {
            prop_assert!(terminal.contains(id));
        }
    }
}

#[test]
fn empty_batches_follow_spec_shapes() {
    let spec = mixed_behavior();
    let decision = DecisionSteps::empty(&spec);
    assert_eq!(decision.len(), 0);
    assert_eq!(decision.obs()[0].shape(), &[0, 4]);
    assert_eq!(decision.obs()[1].shape(), &[0, 3, 3, 1]);
    assert_eq!(decision.obs()[2].shape(), &[0, 2]);
    assert!(decision.action_mask().is_none());
    assert!(decision.check_spec(&spec).is_ok());

    let terminal = TerminalSteps::empty(&spec);
    assert!(terminal.is_empty());
    assert!(!terminal.contains(AgentId(0)));
}

#[test]
fn absent_mask_stays_absent_per_agent() {
    let spec = vector_behavior(6, ActionSpec::continuous(2));
    let steps = DecisionSteps::new(decision_batch(&spec, &[3, 1, 4], 9)).unwrap();
    assert!(steps.action_mask().is_none());
    assert!(steps.steps().all(|step| step.action_mask.is_none()));
}
