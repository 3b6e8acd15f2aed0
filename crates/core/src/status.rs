//! Moderation status of a pereval record.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle of a submission. Every record starts as [`PerevalStatus::New`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerevalStatus {
    New,
    Pending,
    Accepted,
    Rejected,
}

impl PerevalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Only records nobody has started moderating may be edited by the submitter.
    pub fn is_editable(self) -> bool {
        self == Self::New
    }
}

impl std::str::FromStr for PerevalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::Internal(format!("Unknown pereval status '{other}'"))),
        }
    }
}

impl std::fmt::Display for PerevalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
