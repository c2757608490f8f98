use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Run/plugin lifecycle state (§4.1). `Failed` is sticky: a roll-up that
/// sees even one `Failed` member never produces `Running` or `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Running,
    Complete,
    Failed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Running => "running",
            RunPhase::Complete => "complete",
            RunPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RunPhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunPhase::Running),
            "complete" => Ok(RunPhase::Complete),
            "failed" => Ok(RunPhase::Failed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Roll up a set of member statuses into a single run-level status (§4.1).
///
/// Precedence: any `failed` wins; else any `running` wins; else `complete`.
/// Recomputed from the full slice every time, so `failed` can never be
/// un-set by a later call that still contains the failing member.
pub fn roll_up_status(members: &[RunPhase]) -> RunPhase {
    if members.iter().any(|s| *s == RunPhase::Failed) {
        return RunPhase::Failed;
    }
    if members.iter().any(|s| *s == RunPhase::Running) {
        return RunPhase::Running;
    }
    RunPhase::Complete
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_member_wins_over_running() {
        let members = [RunPhase::Running, RunPhase::Failed, RunPhase::Complete];
        assert_eq!(roll_up_status(&members), RunPhase::Failed);
    }

    #[test]
    fn running_wins_over_complete() {
        let members = [RunPhase::Complete, RunPhase::Running];
        assert_eq!(roll_up_status(&members), RunPhase::Running);
    }

    #[test]
    fn all_complete_is_complete() {
        let members = [RunPhase::Complete, RunPhase::Complete];
        assert_eq!(roll_up_status(&members), RunPhase::Complete);
    }

    #[test]
    fn empty_slice_is_complete() {
        assert_eq!(roll_up_status(&[]), RunPhase::Complete);
    }

    #[test]
    fn unknown_status_rejected() {
        assert!("bogus".parse::<RunPhase>().is_err());
    }
}
