//! Error types for the ML-Agents environment API.
//!
//! Organized by subsystem: spec construction, step batches, and
//! actions. The environment-level error lives next to the `BaseEnv`
//! trait in `mlagents-steps`.

use std::error::Error;
use std::fmt;

use crate::id::AgentId;

/// Errors from constructing an [`ObservationSpec`](crate::ObservationSpec)
/// or [`ActionSpec`](crate::ActionSpec).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecError {
    /// The observation shape has no dimensions.
    EmptyShape,
    /// A dimension of the observation shape is zero.
    ZeroDimension {
        /// Axis of the offending dimension.
        axis: usize,
    },
    /// The number of dimension properties does not match the shape rank.
    DimensionPropertyCount {
        /// Rank of the shape.
        rank: usize,
        /// Number of properties supplied.
        properties: usize,
    },
    /// A discrete action branch has no actions.
    EmptyDiscreteBranch {
        /// Index of the offending branch.
        branch: usize,
    },
    /// A discrete action branch has more actions than an `i32` action
    /// value can address.
    DiscreteBranchTooLarge {
        /// Index of the offending branch.
        branch: usize,
        /// Declared branch size.
        size: usize,
    },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyShape => write!(f, "observation shape must have at least one dimension"),
            Self::ZeroDimension { axis } => {
                write!(f, "observation shape has a zero-sized dimension at axis {axis}")
            }
            Self::DimensionPropertyCount { rank, properties } => write!(
                f,
                "{properties} dimension properties supplied for a shape of rank {rank}"
            ),
            Self::EmptyDiscreteBranch { branch } => {
                write!(f, "discrete branch {branch} has no actions")
            }
            Self::DiscreteBranchTooLarge { branch, size } => write!(
                f,
                "discrete branch {branch} has {size} actions, at most {} are addressable",
                i32::MAX
            ),
        }
    }
}

impl Error for SpecError {}

/// Names one batched field of a step batch, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchField {
    /// The n-th observation tensor.
    Observation(usize),
    /// The reward vector.
    Reward,
    /// The group-id vector.
    GroupId,
    /// The group-reward vector.
    GroupReward,
    /// The action mask of the n-th discrete branch.
    ActionMask(usize),
    /// The interrupted-flag vector of a terminal batch.
    Interrupted,
}

impl fmt::Display for BatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observation(i) => write!(f, "obs[{i}]"),
            Self::Reward => write!(f, "reward"),
            Self::GroupId => write!(f, "group_id"),
            Self::GroupReward => write!(f, "group_reward"),
            Self::ActionMask(i) => write!(f, "action_mask[{i}]"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Errors from building or querying a batch of steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepsError {
    /// The requested agent has no row in this batch.
    AgentNotFound {
        /// The id that was looked up.
        agent_id: AgentId,
    },
    /// A batched field's leading dimension differs from the agent count.
    BatchSizeMismatch {
        /// The offending field.
        field: BatchField,
        /// Number of agent ids in the batch.
        expected: usize,
        /// Leading length of the field.
        actual: usize,
    },
    /// An observation tensor is a scalar and has no batch axis.
    MissingBatchAxis {
        /// Index of the offending observation.
        index: usize,
    },
    /// The same agent id occupies two rows and duplicates are rejected.
    DuplicateAgentId {
        /// The repeated id.
        agent_id: AgentId,
        /// Row of the first occurrence.
        first_row: usize,
        /// Row of the repeated occurrence.
        row: usize,
    },
    /// A reward is NaN or infinite and non-finite values are rejected.
    NonFiniteReward {
        /// The field holding the value.
        field: BatchField,
        /// Row of the first non-finite value.
        row: usize,
    },
    /// The batch carries a different number of observations than the behavior spec.
    ObservationCount {
        /// Observations declared by the behavior spec.
        expected: usize,
        /// Observations present in the batch.
        actual: usize,
    },
    /// An observation's per-agent shape differs from its spec.
    ObservationShape {
        /// Index of the offending observation.
        index: usize,
        /// Shape declared by the observation spec.
        expected: Vec<usize>,
        /// Shape found in the batch, without the batch axis.
        actual: Vec<usize>,
    },
    /// The action mask has a different number of branches than the behavior spec.
    ActionMaskBranches {
        /// Discrete branches declared by the action spec.
        expected: usize,
        /// Branches present in the mask.
        actual: usize,
    },
    /// An action-mask branch has the wrong number of actions.
    ActionMaskWidth {
        /// Index of the offending branch.
        branch: usize,
        /// Branch size declared by the action spec.
        expected: usize,
        /// Width found in the mask.
        actual: usize,
    },
}

impl fmt::Display for StepsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentNotFound { agent_id } => {
                write!(f, "agent_id {agent_id} is not present in the batch")
            }
            Self::BatchSizeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field} has leading dimension {actual}, expected {expected} (one per agent)"
            ),
            Self::MissingBatchAxis { index } => {
                write!(f, "obs[{index}] is a scalar and has no batch axis")
            }
            Self::DuplicateAgentId {
                agent_id,
                first_row,
                row,
            } => write!(
                f,
                "agent_id {agent_id} appears at rows {first_row} and {row}"
            ),
            Self::NonFiniteReward { field, row } => {
                write!(f, "{field} is not finite at row {row}")
            }
            Self::ObservationCount { expected, actual } => {
                write!(f, "batch has {actual} observations, spec declares {expected}")
            }
            Self::ObservationShape {
                index,
                expected,
                actual,
            } => write!(
                f,
                "obs[{index}] has per-agent shape {actual:?}, spec declares {expected:?}"
            ),
            Self::ActionMaskBranches { expected, actual } => write!(
                f,
                "action mask has {actual} branches, spec declares {expected}"
            ),
            Self::ActionMaskWidth {
                branch,
                expected,
                actual,
            } => write!(
                f,
                "action mask branch {branch} has width {actual}, spec declares {expected}"
            ),
        }
    }
}

impl Error for StepsError {}

/// Errors from validating an [`ActionTuple`](crate::ActionTuple) against
/// an [`ActionSpec`](crate::ActionSpec).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// The continuous action array has the wrong shape.
    ContinuousShape {
        /// `(n_agents, continuous_size)` required by the action spec.
        expected: (usize, usize),
        /// Shape that was supplied.
        actual: (usize, usize),
    },
    /// The discrete action array has the wrong shape.
    DiscreteShape {
        /// `(n_agents, branch_count)` required by the action spec.
        expected: (usize, usize),
        /// Shape that was supplied.
        actual: (usize, usize),
    },
    /// A discrete action is outside its branch.
    DiscreteOutOfRange {
        /// Row of the offending action.
        row: usize,
        /// Branch of the offending action.
        branch: usize,
        /// The supplied value.
        value: i32,
        /// Number of actions in the branch.
        branch_size: usize,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContinuousShape { expected, actual } => write!(
                f,
                "continuous actions have shape {actual:?}, expected {expected:?}"
            ),
            Self::DiscreteShape { expected, actual } => write!(
                f,
                "discrete actions have shape {actual:?}, expected {expected:?}"
            ),
            Self::DiscreteOutOfRange {
                row,
                branch,
                value,
                branch_size,
            } => write!(
                f,
                "discrete action {value} at row {row} is outside branch {branch} of size {branch_size}"
            ),
        }
    }
}

impl Error for ActionError {}
