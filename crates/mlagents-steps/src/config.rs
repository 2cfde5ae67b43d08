//! Construction-time checks applied to step batches.

/// What to do when the same agent id occupies more than one row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateAgentPolicy {
    /// Accept the batch; the agent index maps the id to its last row.
    #[default]
    LastWriteWins,
    /// Reject the batch with
    /// [`StepsError::DuplicateAgentId`](mlagents_core::StepsError::DuplicateAgentId).
    Reject,
}

/// Checks applied when a step batch is built from caller-supplied arrays.
///
/// Leading-dimension checks are always on; this struct only holds the
/// checks whose outcome is a policy choice.
#[derive(Clone, Debug, Default)]
pub struct StepsConfig {
    /// Handling of repeated agent ids. Default: last write wins.
    pub duplicate_agents: DuplicateAgentPolicy,
    /// Reject NaN or infinite rewards and group rewards. Default: false.
    pub reject_non_finite: bool,
}

impl StepsConfig {
    /// The strictest configuration: duplicates and non-finite rewards
    /// are both rejected.
    pub fn strict() -> Self {
        Self {
            duplicate_agents: DuplicateAgentPolicy::Reject,
            reject_non_finite: true,
        }
    }
}
