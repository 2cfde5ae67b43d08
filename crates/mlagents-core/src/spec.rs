//! Observation and behavior specifications.
//!
//! An [`ObservationSpec`] describes one observation channel of an agent;
//! a [`BehaviorSpec`] bundles the ordered observation channels of a
//! behavior with its [`ActionSpec`]. Both are immutable once built and
//! are used to size empty step batches and to check populated ones.

use std::ops::BitOr;

use smallvec::SmallVec;

use crate::action::ActionSpec;
use crate::error::SpecError;

/// Kind of information carried by an observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObservationType {
    /// Generic observation information.
    #[default]
    Default,
    /// The observation contains goal information for the current task.
    GoalSignal,
}

/// Flags describing how one observation dimension may be treated.
///
/// Values are bit flags and may be combined with `|`.
///
/// # Examples
///
/// ```
/// use mlagents_core::DimensionProperty;
///
/// let p = DimensionProperty::TRANSLATIONAL_EQUIVARIANCE | DimensionProperty::VARIABLE_SIZE;
/// assert!(p.contains(DimensionProperty::VARIABLE_SIZE));
/// assert_eq!(p.bits(), 6);
/// assert_eq!(DimensionProperty::from_bits(8), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DimensionProperty(u8);

impl DimensionProperty {
    /// No information about this dimension.
    pub const UNSPECIFIED: Self = Self(0);
    /// No special property; the trainer must not assume anything.
    pub const NONE: Self = Self(1);
    /// Translational equivariance applies (e.g. spatial axes of an image).
    pub const TRANSLATIONAL_EQUIVARIANCE: Self = Self(2);
    /// The size of this dimension may vary between steps.
    pub const VARIABLE_SIZE: Self = Self(4);

    const KNOWN_BITS: u8 = 0b111;

    /// Raw flag bits.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Build from raw bits, rejecting unknown flags.
    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits & !Self::KNOWN_BITS == 0).then_some(Self(bits))
    }

    /// Whether every flag of `other` is set in `self`.
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DimensionProperty {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Shape and type metadata for one observation channel.
///
/// Validated at construction: the shape has at least one dimension, no
/// dimension is zero, and there is exactly one [`DimensionProperty`] per
/// dimension. Passing no properties fills every dimension with
/// [`DimensionProperty::UNSPECIFIED`].
///
/// # Examples
///
/// ```
/// use mlagents_core::{DimensionProperty, ObservationSpec, ObservationType};
///
/// let camera = ObservationSpec::new(
///     [84, 84, 3],
///     [
///         DimensionProperty::TRANSLATIONAL_EQUIVARIANCE,
///         DimensionProperty::TRANSLATIONAL_EQUIVARIANCE,
///         DimensionProperty::NONE,
///     ],
///     ObservationType::Default,
/// )
/// .unwrap()
/// .with_name("CameraSensor");
///
/// assert_eq!(camera.shape(), &[84, 84, 3]);
/// assert_eq!(camera.element_count(), 84 * 84 * 3);
/// assert_eq!(camera.name(), Some("CameraSensor"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservationSpec {
    shape: SmallVec<[usize; 4]>,
    dimension_property: SmallVec<[DimensionProperty; 4]>,
    observation_type: ObservationType,
    name: Option<String>,
}

impl ObservationSpec {
    /// Create a validated observation spec.
    ///
    /// # Errors
    ///
    /// [`SpecError::EmptyShape`], [`SpecError::ZeroDimension`], or
    /// [`SpecError::DimensionPropertyCount`].
    pub fn new(
        shape: impl IntoIterator<Item = usize>,
        dimension_property: impl IntoIterator<Item = DimensionProperty>,
        observation_type: ObservationType,
    ) -> Result<Self, SpecError> {
        let shape: SmallVec<[usize; 4]> = shape.into_iter().collect();
        if shape.is_empty() {
            return Err(SpecError::EmptyShape);
        }
        if let Some(axis) = shape.iter().position(|&d| d == 0) {
            return Err(SpecError::ZeroDimension { axis });
        }

        let mut dimension_property: SmallVec<[DimensionProperty; 4]> =
            dimension_property.into_iter().collect();
        if dimension_property.is_empty() {
            dimension_property.resize(shape.len(), DimensionProperty::UNSPECIFIED);
        } else if dimension_property.len() != shape.len() {
            return Err(SpecError::DimensionPropertyCount {
                rank: shape.len(),
                properties: dimension_property.len(),
            });
        }

        Ok(Self {
            shape,
            dimension_property,
            observation_type,
            name: None,
        })
    }

    /// A flat vector observation of `size` floats.
    pub fn vector(size: usize) -> Result<Self, SpecError> {
        Self::new([size], [DimensionProperty::NONE], ObservationType::Default)
    }

    /// Attach a name (for observations coming from a sensor, its sensor name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Per-agent shape of the observation.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of values in one agent's observation.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// One property per dimension.
    pub fn dimension_property(&self) -> &[DimensionProperty] {
        &self.dimension_property
    }

    /// The kind of information carried.
    pub fn observation_type(&self) -> ObservationType {
        self.observation_type
    }

    /// Optional observation name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Observation and action spaces shared by every agent of a behavior.
///
/// The order of [`observation_specs`](Self::observation_specs) matches
/// the order of observations in every step batch of the behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BehaviorSpec {
    observation_specs: Vec<ObservationSpec>,
    action_spec: ActionSpec,
}

impl BehaviorSpec {
    /// Bundle observation specs with an action spec.
    pub fn new(observation_specs: Vec<ObservationSpec>, action_spec: ActionSpec) -> Self {
        Self {
            observation_specs,
            action_spec,
        }
    }

    /// Ordered observation specs.
    pub fn observation_specs(&self) -> &[ObservationSpec] {
        &self.observation_specs
    }

    /// The behavior's action spec.
    pub fn action_spec(&self) -> &ActionSpec {
        &self.action_spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PROPS: [DimensionProperty; 0] = [];

    #[test]
    fn empty_shape_rejected() {
        let r = ObservationSpec::new([0usize; 0], NO_PROPS, ObservationType::Default);
        assert_eq!(r, Err(SpecError::EmptyShape));
    }

    #[test]
    fn zero_dimension_rejected() {
        let r = ObservationSpec::new([4, 0, 2], NO_PROPS, ObservationType::Default);
        assert_eq!(r, Err(SpecError::ZeroDimension { axis: 1 }));
    }

    #[test]
    fn property_count_must_match_rank() {
        let r = ObservationSpec::new(
            [4, 4],
            [DimensionProperty::NONE],
            ObservationType::Default,
        );
        assert_eq!(
            r,
            Err(SpecError::DimensionPropertyCount {
                rank: 2,
                properties: 1
            })
        );
    }

    #[test]
    fn missing_properties_default_to_unspecified() {
        let s = ObservationSpec::new([3, 5], NO_PROPS, ObservationType::GoalSignal).unwrap();
        assert_eq!(
            s.dimension_property(),
            &[DimensionProperty::UNSPECIFIED, DimensionProperty::UNSPECIFIED]
        );
        assert_eq!(s.observation_type(), ObservationType::GoalSignal);
        assert_eq!(s.name(), None);
    }

    #[test]
    fn vector_spec_is_rank_one() {
        let s = ObservationSpec::vector(8).unwrap();
        assert_eq!(s.shape(), &[8]);
        assert_eq!(s.rank(), 1);
        assert_eq!(s.dimension_property(), &[DimensionProperty::NONE]);
    }

    #[test]
    fn dimension_property_flags() {
        assert_eq!(DimensionProperty::default(), DimensionProperty::UNSPECIFIED);
        assert_eq!(
            DimensionProperty::from_bits(3),
            Some(DimensionProperty::NONE | DimensionProperty::TRANSLATIONAL_EQUIVARIANCE)
        );
        assert!(!DimensionProperty::NONE.contains(DimensionProperty::VARIABLE_SIZE));
    }

    #[test]
    fn behavior_spec_preserves_order() {
        let a = ObservationSpec::vector(3).unwrap().with_name("a");
        let b = ObservationSpec::vector(5).unwrap().with_name("b");
        let spec = BehaviorSpec::new(vec![a, b], ActionSpec::continuous(2));
        let names: Vec<_> = spec
            .observation_specs()
            .iter()
            .map(|s| s.name().unwrap())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(spec.action_spec().continuous_size(), 2);
    }
}
