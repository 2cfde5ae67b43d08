//! Action spaces and batched actions.
//!
//! An [`ActionSpec`] describes a hybrid action space: a continuous part of
//! fixed width and any number of discrete branches. An [`ActionTuple`]
//! carries one row of actions per agent for both parts.

use ndarray::Array2;
use rand::Rng;
use smallvec::SmallVec;

use crate::error::{ActionError, SpecError};

/// Hybrid action space of a behavior.
///
/// # Examples
///
/// ```
/// use mlagents_core::ActionSpec;
///
/// let spec = ActionSpec::new(2, [3, 5]).unwrap();
/// assert!(spec.is_continuous() && spec.is_discrete());
/// assert_eq!(spec.discrete_size(), 2);
///
/// let action = spec.empty_action(4);
/// assert_eq!(action.continuous().dim(), (4, 2));
/// assert_eq!(action.discrete().dim(), (4, 2));
/// assert!(spec.validate_action(&action, 4).is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionSpec {
    continuous_size: usize,
    discrete_branches: SmallVec<[usize; 4]>,
}

impl ActionSpec {
    /// Create an action spec with `continuous_size` continuous actions and
    /// one discrete branch per entry of `discrete_branches`.
    ///
    /// # Errors
    ///
    /// [`SpecError::EmptyDiscreteBranch`] if a branch has size zero,
    /// [`SpecError::DiscreteBranchTooLarge`] if a branch has more than
    /// `i32::MAX` actions.
    pub fn new(
        continuous_size: usize,
        discrete_branches: impl IntoIterator<Item = usize>,
    ) -> Result<Self, SpecError> {
        let discrete_branches: SmallVec<[usize; 4]> = discrete_branches.into_iter().collect();
        for (branch, &size) in discrete_branches.iter().enumerate() {
            if size == 0 {
                return Err(SpecError::EmptyDiscreteBranch { branch });
            }
            if i32::try_from(size).is_err() {
                return Err(SpecError::DiscreteBranchTooLarge { branch, size });
            }
        }
        Ok(Self {
            continuous_size,
            discrete_branches,
        })
    }

    /// A purely continuous action space.
    pub fn continuous(size: usize) -> Self {
        Self {
            continuous_size: size,
            discrete_branches: SmallVec::new(),
        }
    }

    /// A purely discrete action space.
    pub fn discrete(branches: impl IntoIterator<Item = usize>) -> Result<Self, SpecError> {
        Self::new(0, branches)
    }

    /// Number of continuous actions.
    pub fn continuous_size(&self) -> usize {
        self.continuous_size
    }

    /// Number of actions in each discrete branch.
    pub fn discrete_branches(&self) -> &[usize] {
        &self.discrete_branches
    }

    /// Number of discrete branches.
    pub fn discrete_size(&self) -> usize {
        self.discrete_branches.len()
    }

    /// Whether the space has a continuous part.
    pub fn is_continuous(&self) -> bool {
        self.continuous_size > 0
    }

    /// Whether the space has at least one discrete branch.
    pub fn is_discrete(&self) -> bool {
        !self.discrete_branches.is_empty()
    }

    /// All-zero actions for `n_agents` agents.
    pub fn empty_action(&self, n_agents: usize) -> ActionTuple {
        ActionTuple {
            continuous: Array2::zeros((n_agents, self.continuous_size)),
            discrete: Array2::zeros((n_agents, self.discrete_size())),
        }
    }

    /// Uniformly random actions for `n_agents` agents.
    ///
    /// Continuous values are drawn from `[-1, 1)`, discrete values from
    /// `[0, branch_size)` of their branch.
    pub fn random_action<R: Rng + ?Sized>(&self, n_agents: usize, rng: &mut R) -> ActionTuple {
        let continuous = Array2::from_shape_fn((n_agents, self.continuous_size), |_| {
            rng.random_range(-1.0f32..1.0)
        });
        let discrete = Array2::from_shape_fn((n_agents, self.discrete_size()), |(_, b)| {
            // Branch sizes are checked against i32::MAX in `new`.
            let size = i32::try_from(self.discrete_branches[b]).unwrap_or(i32::MAX);
            rng.random_range(0..size)
        });
        ActionTuple {
            continuous,
            discrete,
        }
    }

    /// Check that `action` holds one valid row per agent.
    ///
    /// # Errors
    ///
    /// [`ActionError::ContinuousShape`] or [`ActionError::DiscreteShape`]
    /// on a shape mismatch, [`ActionError::DiscreteOutOfRange`] for the
    /// first discrete value outside its branch.
    pub fn validate_action(&self, action: &ActionTuple, n_agents: usize) -> Result<(), ActionError> {
        let expected = (n_agents, self.continuous_size);
        if action.continuous.dim() != expected {
            return Err(ActionError::ContinuousShape {
                expected,
                actual: action.continuous.dim(),
            });
        }
        let expected = (n_agents, self.discrete_size());
        if action.discrete.dim() != expected {
            return Err(ActionError::DiscreteShape {
                expected,
                actual: action.discrete.dim(),
            });
        }
        for ((row, branch), &value) in action.discrete.indexed_iter() {
            let branch_size = self.discrete_branches[branch];
            if value < 0 || value as usize >= branch_size {
                return Err(ActionError::DiscreteOutOfRange {
                    row,
                    branch,
                    value,
                    branch_size,
                });
            }
        }
        Ok(())
    }
}

/// Actions for a batch of agents, one row per agent.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionTuple {
    continuous: Array2<f32>,
    discrete: Array2<i32>,
}

impl ActionTuple {
    /// Combine a continuous and a discrete action array.
    ///
    /// Row counts are not reconciled here; that happens in
    /// [`ActionSpec::validate_action`].
    pub fn new(continuous: Array2<f32>, discrete: Array2<i32>) -> Self {
        Self {
            continuous,
            discrete,
        }
    }

    /// Continuous-only actions.
    pub fn from_continuous(continuous: Array2<f32>) -> Self {
        let n = continuous.nrows();
        Self {
            continuous,
            discrete: Array2::zeros((n, 0)),
        }
    }

    /// Discrete-only actions.
    pub fn from_discrete(discrete: Array2<i32>) -> Self {
        let n = discrete.nrows();
        Self {
            continuous: Array2::zeros((n, 0)),
            discrete,
        }
    }

    /// Continuous part, shape `(n_agents, continuous_size)`.
    pub fn continuous(&self) -> &Array2<f32> {
        &self.continuous
    }

    /// Discrete part, shape `(n_agents, branch_count)`.
    pub fn discrete(&self) -> &Array2<i32> {
        &self.discrete
    }

    /// Number of agent rows.
    pub fn n_agents(&self) -> usize {
        self.continuous.nrows().max(self.discrete.nrows())
    }

    /// Split into `(continuous, discrete)`.
    pub fn into_parts(self) -> (Array2<f32>, Array2<i32>) {
        (self.continuous, self.discrete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zero_sized_branch_rejected() {
        assert_eq!(
            ActionSpec::discrete([3, 0]),
            Err(SpecError::EmptyDiscreteBranch { branch: 1 })
        );
    }

    #[test]
    fn branch_beyond_i32_range_rejected() {
        let size = 1usize << 31;
        assert_eq!(
            ActionSpec::discrete([4, size]),
            Err(SpecError::DiscreteBranchTooLarge { branch: 1, size })
        );

        let widest = ActionSpec::discrete([i32::MAX as usize]).unwrap();
        let action = widest.random_action(3, &mut ChaCha8Rng::seed_from_u64(0));
        assert!(widest.validate_action(&action, 3).is_ok());
    }

    #[test]
    fn continuous_spec_has_no_branches() {
        let spec = ActionSpec::continuous(3);
        assert!(spec.is_continuous());
        assert!(!spec.is_discrete());
        assert_eq!(spec.discrete_branches(), &[] as &[usize]);
    }

    #[test]
    fn random_action_stays_in_range() {
        let spec = ActionSpec::new(2, [2, 4]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let action = spec.random_action(32, &mut rng);
        assert!(spec.validate_action(&action, 32).is_ok());
        assert!(action
            .continuous()
            .iter()
            .all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn random_action_is_deterministic_for_a_seed() {
        let spec = ActionSpec::new(1, [5]).unwrap();
        let a = spec.random_action(8, &mut ChaCha8Rng::seed_from_u64(3));
        let b = spec.random_action(8, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_continuous_width_rejected() {
        let spec = ActionSpec::continuous(2);
        let action = ActionTuple::from_continuous(array![[0.0, 0.0, 0.0]]);
        assert_eq!(
            spec.validate_action(&action, 1),
            Err(ActionError::ContinuousShape {
                expected: (1, 2),
                actual: (1, 3)
            })
        );
    }

    #[test]
    fn wrong_agent_count_rejected() {
        let spec = ActionSpec::discrete([3]).unwrap();
        let action = ActionTuple::from_discrete(array![[0], [1]]);
        assert_eq!(
            spec.validate_action(&action, 3),
            Err(ActionError::ContinuousShape {
                expected: (3, 0),
                actual: (2, 0)
            })
        );
    }

    #[test]
    fn out_of_range_discrete_rejected() {
        let spec = ActionSpec::discrete([3, 2]).unwrap();
        let action = ActionTuple::from_discrete(array![[0, 1], [2, 2]]);
        assert_eq!(
            spec.validate_action(&action, 2),
            Err(ActionError::DiscreteOutOfRange {
                row: 1,
                branch: 1,
                value: 2,
                branch_size: 2
            })
        );

        let negative = ActionTuple::from_discrete(array![[-1, 0], [0, 0]]);
        assert!(matches!(
            spec.validate_action(&negative, 2),
            Err(ActionError::DiscreteOutOfRange { row: 0, branch: 0, .. })
        ));
    }

    #[test]
    fn n_agents_from_either_part() {
        assert_eq!(ActionTuple::from_discrete(array![[1], [0]]).n_agents(), 2);
        assert_eq!(ActionSpec::continuous(2).empty_action(5).n_agents(), 5);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn action_spec() -> impl Strategy<Value = ActionSpec> {
            (0usize..4, prop::collection::vec(1usize..6, 0..4))
                .prop_map(|(continuous, branches)| ActionSpec::new(continuous, branches).unwrap())
        }

        proptest! {
            #[test]
            fn generated_actions_validate(
                spec in action_spec(),
                n_agents in 0usize..16,
                seed in any::<u64>(),
            ) {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let random = spec.random_action(n_agents, &mut rng);
                prop_assert!(spec.validate_action(&random, n_agents).is_ok());
                let empty = spec.empty_action(n_agents);
                prop_assert!(spec.validate_action(&empty, n_agents).is_ok());
                prop_assert_eq!(empty.discrete().ncols(), spec.discrete_size());
            }
        }
    }
}
