use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, AsRefStr, Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApproverRole {
    Manager,
    Director,
    HrRecruiter,
    HrManager,
    HrDirector,
}

impl ApproverRole {
    /// HR approvers work across every department.
    pub fn is_hr(&self) -> bool {
        matches!(
            self,
            ApproverRole::HrRecruiter | ApproverRole::HrManager | ApproverRole::HrDirector
        )
    }

    pub fn from_code(code: &str) -> Option<Self> {
        code.trim().parse().ok()
    }
}
