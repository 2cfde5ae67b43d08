//! Validation and row extraction shared by decision and terminal batches.

use mlagents_core::{AgentId, BatchField, BehaviorSpec, GroupId, StepsError};
use ndarray::{Array1, ArrayD, Axis, IxDyn};

use crate::config::{DuplicateAgentPolicy, StepsConfig};
use crate::index;

/// Fields every batch kind carries.
pub(crate) struct CommonFields<'a> {
    pub obs: &'a [ArrayD<f32>],
    pub reward: &'a Array1<f32>,
    pub agent_id: &'a [AgentId],
    pub group_id: &'a [GroupId],
    pub group_reward: &'a Array1<f32>,
}

impl CommonFields<'_> {
    /// Check the common fields against the agent count and `config`.
    pub(crate) fn validate(&self, config: &StepsConfig) -> Result<(), StepsError> {
        let n = self.agent_id.len();
        check_observations(self.obs, n)?;
        check_len(BatchField::Reward, self.reward.len(), n)?;
        check_len(BatchField::GroupId, self.group_id.len(), n)?;
        check_len(BatchField::GroupReward, self.group_reward.len(), n)?;

        if config.duplicate_agents == DuplicateAgentPolicy::Reject {
            if let Some((agent_id, first_row, row)) = index::first_duplicate(self.agent_id) {
                return Err(StepsError::DuplicateAgentId {
                    agent_id,
                    first_row,
                    row,
                });
            }
        }
        if config.reject_non_finite {
            check_finite(BatchField::Reward, self.reward)?;
            check_finite(BatchField::GroupReward, self.group_reward)?;
        }
        Ok(())
    }
}

pub(crate) fn check_len(field: BatchField, actual: usize, expected: usize) -> Result<(), StepsError> {
    if actual != expected {
        return Err(StepsError::BatchSizeMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_observations(obs: &[ArrayD<f32>], n: usize) -> Result<(), StepsError> {
    for (index, o) in obs.iter().enumerate() {
        let Some(&leading) = o.shape().first() else {
            return Err(StepsError::MissingBatchAxis { index });
        };
        check_len(BatchField::Observation(index), leading, n)?;
    }
    Ok(())
}

fn check_finite(field: BatchField, values: &Array1<f32>) -> Result<(), StepsError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(row) => Err(StepsError::NonFiniteReward { field, row }),
        None => Ok(()),
    }
}

/// Check observation count and per-agent shapes against `spec`.
pub(crate) fn check_observation_shapes(
    obs: &[ArrayD<f32>],
    spec: &BehaviorSpec,
) -> Result<(), StepsError> {
    let specs = spec.observation_specs();
    if obs.len() != specs.len() {
        return Err(StepsError::ObservationCount {
            expected: specs.len(),
            actual: obs.len(),
        });
    }
    for (index, (o, s)) in obs.iter().zip(specs).enumerate() {
        let per_agent = o.shape().get(1..).unwrap_or_default();
        if per_agent != s.shape() {
            return Err(StepsError::ObservationShape {
                index,
                expected: s.shape().to_vec(),
                actual: per_agent.to_vec(),
            });
        }
    }
    Ok(())
}

/// Zero-row observation tensors shaped after `spec`.
pub(crate) fn empty_observations(spec: &BehaviorSpec) -> Vec<ArrayD<f32>> {
    spec.observation_specs()
        .iter()
        .map(|s| {
            let mut shape = Vec::with_capacity(s.rank() + 1);
            shape.push(0);
            shape.extend_from_slice(s.shape());
            ArrayD::zeros(IxDyn(&shape))
        })
        .collect()
}

/// Owned copy of row `row` of every observation, batch axis removed.
pub(crate) fn observation_rows(obs: &[ArrayD<f32>], row: usize) -> Vec<ArrayD<f32>> {
    obs.iter()
        .map(|o| o.index_axis(Axis(0), row).to_owned())
        .collect()
}
