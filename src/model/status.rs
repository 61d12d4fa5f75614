use std::fmt;
use std::str::FromStr;

use strum_macros::{AsRefStr, EnumIter, EnumString};

/// Which column of `manpower_requests` a code lives in.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lane {
    Origin,
    Hr,
    Overall,
}

impl Lane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Origin => "origin_status",
            Lane::Hr => "hr_status",
            Lane::Overall => "overall_status",
        }
    }
}

/// Department lane: manager, then director.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginStatus {
    Draft,
    Submitted,
    MgrApproved,
    MgrRejected,
    DirApproved,
    DirRejected,
}

/// HR lane, only meaningful once the director approved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HrStatus {
    #[strum(serialize = "NONE")]
    NotStarted,
    WaitingRecruiter,
    HrRecruiterApproved,
    WaitingHrManager,
    HrManagerApproved,
    WaitingHrDirector,
    HrDirectorApproved,
    RecruiterRejected,
    HrManagerRejected,
    HrDirectorRejected,
    HrIntake,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    InProgress,
    Approved,
    Rejected,
}

impl OriginStatus {
    pub fn is_rejected(&self) -> bool {
        matches!(self, OriginStatus::MgrRejected | OriginStatus::DirRejected)
    }
}

impl HrStatus {
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            HrStatus::RecruiterRejected | HrStatus::HrManagerRejected | HrStatus::HrDirectorRejected
        )
    }
}

impl OverallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OverallStatus::Approved | OverallStatus::Rejected)
    }
}

/// A raw status column value: either a registry code or whatever the
/// backend sent that we do not know about yet.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Code<T> {
    Known(T),
    Unknown(String),
}

impl<T: FromStr> Code<T> {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<T>() {
            Ok(code) => Code::Known(code),
            Err(_) => Code::Unknown(raw.to_string()),
        }
    }
}

impl<T> Code<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Code::Known(code) => Some(code),
            Code::Unknown(_) => None,
        }
    }

    pub fn is(&self, expected: T) -> bool
    where
        T: PartialEq,
    {
        self.known() == Some(&expected)
    }
}

impl<T: AsRef<str>> Code<T> {
    pub fn as_str(&self) -> &str {
        match self {
            Code::Known(code) => code.as_ref(),
            Code::Unknown(raw) => raw,
        }
    }
}

impl<T> From<T> for Code<T> {
    fn from(code: T) -> Self {
        Code::Known(code)
    }
}

impl<T: AsRef<str>> fmt::Display for Code<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three raw status columns of a request, as one tuple.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RequestStatus {
    pub origin: Code<OriginStatus>,
    pub hr: Code<HrStatus>,
    pub overall: Code<OverallStatus>,
}

impl RequestStatus {
    pub fn new(origin: OriginStatus, hr: HrStatus, overall: OverallStatus) -> Self {
        Self {
            origin: origin.into(),
            hr: hr.into(),
            overall: overall.into(),
        }
    }

    pub fn parse(origin: &str, hr: &str, overall: &str) -> Self {
        Self {
            origin: Code::parse(origin),
            hr: Code::parse(hr),
            overall: Code::parse(overall),
        }
    }

    /// Lanes holding a code outside the registry.
    pub fn unknown_lanes(&self) -> Vec<(Lane, &str)> {
        let mut lanes = Vec::new();
        if let Code::Unknown(raw) = &self.origin {
            lanes.push((Lane::Origin, raw.as_str()));
        }
        if let Code::Unknown(raw) = &self.hr {
            lanes.push((Lane::Hr, raw.as_str()));
        }
        if let Code::Unknown(raw) = &self.overall {
            lanes.push((Lane::Overall, raw.as_str()));
        }
        lanes
    }
}

/// Aggregate outcome implied by the two lane codes.
///
/// `Approved` needs the director and the HR director to have signed off;
/// any rejection in either lane wins over everything else.
pub fn derive_overall(origin: &Code<OriginStatus>, hr: &Code<HrStatus>) -> OverallStatus {
    let origin_rejected = origin.known().is_some_and(OriginStatus::is_rejected);
    let hr_rejected = hr.known().is_some_and(HrStatus::is_rejected);

    if origin_rejected || hr_rejected {
        OverallStatus::Rejected
    } else if origin.is(OriginStatus::DirApproved) && hr.is(HrStatus::HrDirectorApproved) {
        OverallStatus::Approved
    } else {
        OverallStatus::InProgress
    }
}

/// Position of a request in the fixed approval chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, EnumIter)]
pub enum ChainStep {
    Draft = 0,
    ManagerReview = 1,
    DirectorReview = 2,
    RecruiterReview = 3,
    HrManagerReview = 4,
    HrDirectorReview = 5,
    Completed = 6,
}

impl ChainStep {
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

/// Where a request sits in the chain, `None` once rejected or when the
/// codes do not describe a reachable state.
pub fn chain_step(status: &RequestStatus) -> Option<ChainStep> {
    match status.overall.known()? {
        OverallStatus::Rejected => return None,
        OverallStatus::Approved => {
            return (derive_overall(&status.origin, &status.hr) == OverallStatus::Approved)
                .then_some(ChainStep::Completed);
        }
        OverallStatus::InProgress => {}
    }

    match status.origin.known()? {
        OriginStatus::Draft => Some(ChainStep::Draft),
        OriginStatus::Submitted => Some(ChainStep::ManagerReview),
        OriginStatus::MgrApproved => Some(ChainStep::DirectorReview),
        OriginStatus::MgrRejected | OriginStatus::DirRejected => None,
        OriginStatus::DirApproved => match status.hr.known()? {
            HrStatus::NotStarted | HrStatus::HrIntake | HrStatus::WaitingRecruiter => {
                Some(ChainStep::RecruiterReview)
            }
            HrStatus::HrRecruiterApproved | HrStatus::WaitingHrManager => {
                Some(ChainStep::HrManagerReview)
            }
            HrStatus::HrManagerApproved | HrStatus::WaitingHrDirector => {
                Some(ChainStep::HrDirectorReview)
            }
            HrStatus::HrDirectorApproved => Some(ChainStep::Completed),
            HrStatus::RecruiterRejected
            | HrStatus::HrManagerRejected
            | HrStatus::HrDirectorRejected => None,
        },
    }
}
