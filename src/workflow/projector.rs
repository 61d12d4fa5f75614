//! Maps raw lane codes onto the three approval columns every list page
//! shows (manager / HR / executive).
//!
//! All pages take their labels and badge colors from [`project`]; none of
//! them look at raw codes directly.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::model::status::{Code, HrStatus, OriginStatus, OverallStatus, RequestStatus};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Badge {
    Pending,
    Approved,
    Rejected,
    Draft,
    Neutral,
}

impl Badge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::Pending => "pending",
            Badge::Approved => "approved",
            Badge::Rejected => "rejected",
            Badge::Draft => "draft",
            Badge::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    Th,
    En,
}

impl Locale {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "th" => Some(Locale::Th),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StatusLabel {
    Draft,
    Waiting,
    WaitingManager,
    WaitingDirector,
    WaitingRecruiter,
    WaitingHrManager,
    WaitingHrDirector,
    Approved,
    Rejected,
    NotApplicable,
    /// Code outside the registry, echoed as-is.
    Raw(String),
}

impl StatusLabel {
    /// Stable key for API clients.
    pub fn key(&self) -> &str {
        match self {
            StatusLabel::Draft => "draft",
            StatusLabel::Waiting => "waiting",
            StatusLabel::WaitingManager => "waiting_manager",
            StatusLabel::WaitingDirector => "waiting_director",
            StatusLabel::WaitingRecruiter => "waiting_recruiter",
            StatusLabel::WaitingHrManager => "waiting_hr_manager",
            StatusLabel::WaitingHrDirector => "waiting_hr_director",
            StatusLabel::Approved => "approved",
            StatusLabel::Rejected => "rejected",
            StatusLabel::NotApplicable => "not_applicable",
            StatusLabel::Raw(code) => code,
        }
    }

    pub fn text(&self, locale: Locale) -> Cow<'_, str> {
        let text = match (locale, self) {
            (_, StatusLabel::Raw(code)) => return Cow::Borrowed(code),
            (_, StatusLabel::NotApplicable) => "-",

            (Locale::Th, StatusLabel::Draft) => "แบบร่าง",
            (Locale::Th, StatusLabel::Waiting) => "รอดำเนินการ",
            (Locale::Th, StatusLabel::WaitingManager) => "รอผู้จัดการ",
            (Locale::Th, StatusLabel::WaitingDirector) => "รอผู้อำนวยการฝ่าย",
            (Locale::Th, StatusLabel::WaitingRecruiter) => "รอ Recruiter",
            (Locale::Th, StatusLabel::WaitingHrManager) => "รอ HR Manager",
            (Locale::Th, StatusLabel::WaitingHrDirector) => "รอ HR Director",
            (Locale::Th, StatusLabel::Approved) => "อนุมัติ",
            (Locale::Th, StatusLabel::Rejected) => "ไม่อนุมัติ",

            (Locale::En, StatusLabel::Draft) => "Draft",
            (Locale::En, StatusLabel::Waiting) => "Waiting",
            (Locale::En, StatusLabel::WaitingManager) => "Waiting on manager",
            (Locale::En, StatusLabel::WaitingDirector) => "Waiting on director",
            (Locale::En, StatusLabel::WaitingRecruiter) => "Waiting recruiter",
            (Locale::En, StatusLabel::WaitingHrManager) => "Waiting HR manager",
            (Locale::En, StatusLabel::WaitingHrDirector) => "Waiting HR director",
            (Locale::En, StatusLabel::Approved) => "Approved",
            (Locale::En, StatusLabel::Rejected) => "Rejected",
        };
        Cow::Borrowed(text)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DisplayCell {
    pub label: StatusLabel,
    pub badge: Badge,
}

impl DisplayCell {
    fn new(label: StatusLabel, badge: Badge) -> Self {
        Self { label, badge }
    }

    fn waiting() -> Self {
        Self::new(StatusLabel::Waiting, Badge::Pending)
    }

    fn approved() -> Self {
        Self::new(StatusLabel::Approved, Badge::Approved)
    }

    fn not_applicable() -> Self {
        Self::new(StatusLabel::NotApplicable, Badge::Neutral)
    }

    fn raw(code: &str) -> Self {
        Self::new(StatusLabel::Raw(code.to_string()), Badge::Neutral)
    }

    pub fn is_approved(&self) -> bool {
        self.label == StatusLabel::Approved
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DisplayStatus {
    pub manager: DisplayCell,
    pub hr: DisplayCell,
    pub executive: DisplayCell,
}

impl DisplayStatus {
    pub fn is_fully_approved(&self) -> bool {
        self.manager.is_approved() && self.hr.is_approved() && self.executive.is_approved()
    }

    pub fn is_rejected(&self) -> bool {
        self.manager.label == StatusLabel::Rejected
    }

    fn raw_echo(status: &RequestStatus) -> Self {
        Self {
            manager: DisplayCell::raw(status.origin.as_str()),
            hr: DisplayCell::raw(status.hr.as_str()),
            executive: DisplayCell::raw(status.overall.as_str()),
        }
    }
}

/// HR/executive cells once the director has approved. The executive cell of
/// the final row depends on the overall code and is filled in by `project`.
#[derive(Debug, Clone)]
enum HrRow {
    Fixed { hr: DisplayCell, executive: DisplayCell },
    AwaitingFinal,
}

static HR_LANE: Lazy<HashMap<HrStatus, HrRow>> = Lazy::new(|| {
    use HrStatus::*;

    let waiting_recruiter = HrRow::Fixed {
        hr: DisplayCell::new(StatusLabel::WaitingRecruiter, Badge::Pending),
        executive: DisplayCell::waiting(),
    };
    let waiting_hr_manager = HrRow::Fixed {
        hr: DisplayCell::new(StatusLabel::WaitingHrManager, Badge::Pending),
        executive: DisplayCell::waiting(),
    };
    let waiting_hr_director = HrRow::Fixed {
        hr: DisplayCell::approved(),
        executive: DisplayCell::new(StatusLabel::WaitingHrDirector, Badge::Pending),
    };
    let intake = HrRow::Fixed {
        hr: DisplayCell::waiting(),
        executive: DisplayCell::waiting(),
    };

    HashMap::from([
        (NotStarted, intake.clone()),
        (HrIntake, intake),
        (WaitingRecruiter, waiting_recruiter),
        (HrRecruiterApproved, waiting_hr_manager.clone()),
        (WaitingHrManager, waiting_hr_manager),
        (HrManagerApproved, waiting_hr_director.clone()),
        (WaitingHrDirector, waiting_hr_director),
        (HrDirectorApproved, HrRow::AwaitingFinal),
    ])
});

/// Derive the three display columns from the raw codes. Never fails:
/// anything the tables do not cover is echoed back with a neutral badge.
pub fn project(
    origin: &Code<OriginStatus>,
    hr: &Code<HrStatus>,
    overall: &Code<OverallStatus>,
) -> DisplayStatus {
    let status = RequestStatus {
        origin: origin.clone(),
        hr: hr.clone(),
        overall: overall.clone(),
    };
    project_status(&status)
}

pub fn project_status(status: &RequestStatus) -> DisplayStatus {
    for (lane, raw) in status.unknown_lanes() {
        tracing::warn!(lane = lane.as_str(), code = raw, "Unknown status code");
    }

    if status.overall.is(OverallStatus::Rejected) {
        return DisplayStatus {
            manager: DisplayCell::new(StatusLabel::Rejected, Badge::Rejected),
            hr: DisplayCell::not_applicable(),
            executive: DisplayCell::not_applicable(),
        };
    }

    let manager = match status.origin.known() {
        Some(OriginStatus::Draft) => DisplayCell::new(StatusLabel::Draft, Badge::Draft),
        Some(OriginStatus::Submitted) => DisplayCell::new(StatusLabel::WaitingManager, Badge::Pending),
        Some(OriginStatus::MgrApproved) => {
            DisplayCell::new(StatusLabel::WaitingDirector, Badge::Pending)
        }
        Some(OriginStatus::DirApproved) => return project_hr_lane(status),
        Some(OriginStatus::MgrRejected | OriginStatus::DirRejected) | None => {
            return DisplayStatus::raw_echo(status);
        }
    };

    DisplayStatus {
        manager,
        hr: DisplayCell::waiting(),
        executive: DisplayCell::waiting(),
    }
}

fn project_hr_lane(status: &RequestStatus) -> DisplayStatus {
    let row = status.hr.known().and_then(|hr| HR_LANE.get(hr));

    let (hr, executive) = match row {
        Some(HrRow::Fixed { hr, executive }) => (hr.clone(), executive.clone()),
        Some(HrRow::AwaitingFinal) => {
            let executive = if status.overall.is(OverallStatus::Approved) {
                DisplayCell::approved()
            } else {
                DisplayCell::waiting()
            };
            (DisplayCell::approved(), executive)
        }
        None => (
            DisplayCell::raw(status.hr.as_str()),
            DisplayCell::raw(status.overall.as_str()),
        ),
    };

    DisplayStatus {
        manager: DisplayCell::approved(),
        hr,
        executive,
    }
}
