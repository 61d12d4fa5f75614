use crate::model::manpower_request::ManpowerRequest;
use crate::model::role::ApproverRole;
use crate::model::status::{HrStatus, OriginStatus, OverallStatus, RequestStatus, derive_overall};

/// Whether `role` owns the current step of the request.
///
/// This is the only check consulted both before enabling approve/reject
/// controls and before accepting a decision.
pub fn can_act(role: ApproverRole, request: &ManpowerRequest) -> bool {
    role_owns_step(role, &request.status)
}

pub fn role_owns_step(role: ApproverRole, status: &RequestStatus) -> bool {
    // unknown overall codes cannot be proven non-terminal
    if !status.overall.is(OverallStatus::InProgress) || !lanes_agree(status) {
        return false;
    }

    // the HR lane only opens once the director has signed off
    let hr_open = status.origin.is(OriginStatus::DirApproved);
    match role {
        ApproverRole::Manager => status.origin.is(OriginStatus::Submitted),
        ApproverRole::Director => status.origin.is(OriginStatus::MgrApproved),
        ApproverRole::HrRecruiter => hr_open && status.hr.is(HrStatus::WaitingRecruiter),
        ApproverRole::HrManager => {
            hr_open
                && matches!(
                    status.hr.known(),
                    Some(HrStatus::WaitingHrManager | HrStatus::HrRecruiterApproved)
                )
        }
        ApproverRole::HrDirector => {
            hr_open
                && matches!(
                    status.hr.known(),
                    Some(HrStatus::WaitingHrDirector | HrStatus::HrManagerApproved)
                )
        }
    }
}

/// The stored overall code is the one derived from the two lanes.
pub fn lanes_agree(status: &RequestStatus) -> bool {
    status.overall.known() == Some(&derive_overall(&status.origin, &status.hr))
}

/// Only the requester submits, and only a draft.
pub fn can_submit(employee_id: u64, request: &ManpowerRequest) -> bool {
    request.requester_id == employee_id
        && request.status.overall.is(OverallStatus::InProgress)
        && request.status.origin.is(OriginStatus::Draft)
}

/// Same as [`can_act`] for callers that may have no approver role.
pub fn session_can_act(role: Option<ApproverRole>, request: &ManpowerRequest) -> bool {
    role.is_some_and(|role| can_act(role, request))
}

/// A requester may pull back their own request until an approver touched it.
pub fn can_withdraw(employee_id: u64, request: &ManpowerRequest) -> bool {
    request.requester_id == employee_id
        && request.status.overall.is(OverallStatus::InProgress)
        && matches!(
            request.status.origin.known(),
            Some(OriginStatus::Draft | OriginStatus::Submitted)
        )
}
