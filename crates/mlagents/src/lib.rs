//! mlagents: batched step data and per-agent lookup for multi-agent
//! reinforcement-learning environments.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the mlagents sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use mlagents::prelude::*;
//! use ndarray::array;
//!
//! let spec = BehaviorSpec::new(
//!     vec![ObservationSpec::vector(2).unwrap()],
//!     ActionSpec::discrete([3]).unwrap(),
//! );
//!
//! // An empty batch has the behavior's shapes with zero rows.
//! let empty = DecisionSteps::empty(&spec);
//! assert!(empty.is_empty());
//! assert_eq!(empty.obs()[0].shape(), &[0, 2]);
//!
//! // Two agents requesting a decision.
//! let steps = DecisionSteps::new(
//!     DecisionBatch::ungrouped(
//!         vec![array![[0.1f32, 0.2], [0.3, 0.4]].into_dyn()],
//!         array![1.0, -0.5],
//!         vec![AgentId(17), AgentId(4)],
//!     )
//!     .with_action_mask(vec![array![[false, true, false], [false, false, false]]]),
//! )
//! .unwrap();
//! steps.check_spec(&spec).unwrap();
//!
//! let step = steps.get(AgentId(4)).unwrap();
//! assert_eq!(step.reward, -0.5);
//! assert_eq!(step.obs[0], array![0.3f32, 0.4].into_dyn());
//! assert!(matches!(
//!     steps.get(AgentId(99)),
//!     Err(StepsError::AgentNotFound { .. })
//! ));
//!
//! // One discrete choice per agent; validate before handing it back.
//! let action = ActionTuple::from_discrete(array![[0], [2]]);
//! spec.action_spec().validate_action(&action, steps.len()).unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `mlagents-core` | IDs, observation/action/behavior specs, errors |
//! | [`steps`] | `mlagents-steps` | Decision/terminal batches, agent index, `BaseEnv` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers, specs, and error types (`mlagents-core`).
///
/// Contains [`types::ObservationSpec`], [`types::ActionSpec`],
/// [`types::BehaviorSpec`], and [`types::ActionTuple`].
pub use mlagents_core as types;

/// Step batches and the environment boundary (`mlagents-steps`).
///
/// [`steps::DecisionSteps`] and [`steps::TerminalSteps`] hold one
/// simulation step's data per behavior; [`steps::BaseEnv`] is the trait a
/// training loop drives.
pub use mlagents_steps as steps;

/// Common imports for typical usage.
///
/// ```rust
/// use mlagents::prelude::*;
/// ```
pub mod prelude {
    // Identifiers
    pub use mlagents_core::{AgentId, BehaviorName, GroupId};

    // Specs and actions
    pub use mlagents_core::{
        ActionSpec, ActionTuple, BehaviorSpec, DimensionProperty, ObservationSpec,
        ObservationType,
    };

    // Errors
    pub use mlagents_core::{ActionError, SpecError, StepsError};

    // Steps
    pub use mlagents_steps::{
        BaseEnv, BehaviorMapping, DecisionBatch, DecisionStep, DecisionSteps, EnvError,
        IndexState, StepsConfig, TerminalBatch, TerminalStep, TerminalSteps,
    };
}
