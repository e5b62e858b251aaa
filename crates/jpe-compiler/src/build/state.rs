//! Build states and their legal transitions.

use std::fmt;

use serde::Serialize;

/// Where a build is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildState {
    Idle,
    Parsing,
    Validating,
    Generating,
    Packaging,
    Succeeded,
    Failed,
}

impl BuildState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Succeeded | BuildState::Failed)
    }

    /// Whether the pipeline may move from `self` to `next`.
    pub fn can_transition_to(&self, next: BuildState) -> bool {
        use BuildState::*;
        matches!(
            (self, next),
            (Idle, Parsing)
                | (Parsing, Validating)
                | (Validating, Generating)
                | (Validating, Failed)
                | (Generating, Packaging)
                | (Generating, Failed)
                | (Packaging, Succeeded)
                | (Packaging, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildState::Idle => "idle",
            BuildState::Parsing => "parsing",
            BuildState::Validating => "validating",
            BuildState::Generating => "generating",
            BuildState::Packaging => "packaging",
            BuildState::Succeeded => "succeeded",
            BuildState::Failed => "failed",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
