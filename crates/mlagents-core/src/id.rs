//! Strongly-typed identifiers for agents, groups, and behaviors.

use std::fmt;

/// Identifies an agent within a simulation.
///
/// Unique within one batch of steps. The simulation reuses the same id
/// for the same agent across steps, which is what lets a trainer stitch
/// trajectories together; nothing else about the value is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub i32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for AgentId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Identifies the cooperative group an agent belongs to.
///
/// `GroupId(0)` means the agent is not part of any group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub i32);

impl GroupId {
    /// The id reported for agents that belong to no group.
    pub const NONE: GroupId = GroupId(0);

    /// Whether this id denotes an actual group.
    pub fn is_grouped(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for GroupId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Name of a behavior: a group of agents sharing one [`BehaviorSpec`]
/// and one policy.
///
/// [`BehaviorSpec`]: crate::BehaviorSpec
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BehaviorName(pub String);

impl BehaviorName {
    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BehaviorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BehaviorName {
    fn from(v: &str) -> Self {
        Self(v.to_owned())
    }
}

impl From<String> for BehaviorName {
    fn from(v: String) -> Self {
        Self(v)
    }
}
