use derive_more::Display;

use crate::model::manpower_request::{ApprovalAction, ApprovalRecord, ManpowerRequest};
use crate::model::role::ApproverRole;
use crate::model::status::{ChainStep, HrStatus, OriginStatus, OverallStatus, RequestStatus, derive_overall};
use crate::workflow::gate::{can_act, can_submit, lanes_agree};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[display(fmt = "{} may not act on request {} at its current step", role, request_id)]
    NotAuthorized { role: ApproverRole, request_id: u64 },

    #[display(fmt = "request {} is {} and accepts no further decisions", request_id, state)]
    InvalidTransition { request_id: u64, state: String },

    #[display(fmt = "employee {} did not raise request {}", employee_id, request_id)]
    NotRequester { employee_id: u64, request_id: u64 },
}

impl std::error::Error for DecisionError {}

impl DecisionError {
    pub fn code(&self) -> &'static str {
        match self {
            DecisionError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            DecisionError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DecisionError::NotRequester { .. } => "NOT_REQUESTER",
        }
    }
}

/// Result of a decision: what to write, what we expect to overwrite, and the
/// history entry to append alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub request: ManpowerRequest,
    pub previous: RequestStatus,
    pub record: ApprovalRecord,
}

/// Step of the chain each role signs off.
pub fn reviewed_step(role: ApproverRole) -> ChainStep {
    match role {
        ApproverRole::Manager => ChainStep::ManagerReview,
        ApproverRole::Director => ChainStep::DirectorReview,
        ApproverRole::HrRecruiter => ChainStep::RecruiterReview,
        ApproverRole::HrManager => ChainStep::HrManagerReview,
        ApproverRole::HrDirector => ChainStep::HrDirectorReview,
    }
}

/// Apply an approver's decision to a fresh snapshot of the request.
///
/// Approval moves exactly one step along the chain; recruiter and HR manager
/// approvals land directly on the next "waiting" code. Rejection is final.
/// The overall code is always recomputed from the two lanes.
pub fn decide(
    request: &ManpowerRequest,
    role: ApproverRole,
    action: ApprovalAction,
    notes: &str,
) -> Result<Transition, DecisionError> {
    let previous = request.status.clone();

    // an unrecognised overall code counts as closed
    if previous.overall.known().is_none_or(OverallStatus::is_terminal) {
        return Err(DecisionError::InvalidTransition {
            request_id: request.id,
            state: previous.overall.to_string(),
        });
    }

    if !lanes_agree(&previous) {
        return Err(DecisionError::InvalidTransition {
            request_id: request.id,
            state: tuple(&previous),
        });
    }

    if !can_act(role, request) {
        return Err(DecisionError::NotAuthorized {
            role,
            request_id: request.id,
        });
    }

    let mut next = previous.clone();
    match (role, action) {
        (ApproverRole::Manager, ApprovalAction::Approve) => {
            next.origin = OriginStatus::MgrApproved.into();
        }
        (ApproverRole::Manager, ApprovalAction::Reject) => {
            next.origin = OriginStatus::MgrRejected.into();
        }
        (ApproverRole::Director, ApprovalAction::Approve) => {
            next.origin = OriginStatus::DirApproved.into();
            next.hr = HrStatus::WaitingRecruiter.into();
        }
        (ApproverRole::Director, ApprovalAction::Reject) => {
            next.origin = OriginStatus::DirRejected.into();
        }
        (ApproverRole::HrRecruiter, ApprovalAction::Approve) => {
            next.hr = HrStatus::WaitingHrManager.into();
        }
        (ApproverRole::HrRecruiter, ApprovalAction::Reject) => {
            next.hr = HrStatus::RecruiterRejected.into();
        }
        (ApproverRole::HrManager, ApprovalAction::Approve) => {
            next.hr = HrStatus::WaitingHrDirector.into();
        }
        (ApproverRole::HrManager, ApprovalAction::Reject) => {
            next.hr = HrStatus::HrManagerRejected.into();
        }
        (ApproverRole::HrDirector, ApprovalAction::Approve) => {
            next.hr = HrStatus::HrDirectorApproved.into();
        }
        (ApproverRole::HrDirector, ApprovalAction::Reject) => {
            next.hr = HrStatus::HrDirectorRejected.into();
        }
    }
    next.overall = derive_overall(&next.origin, &next.hr).into();

    tracing::debug!(
        request_id = request.id,
        role = role.as_ref(),
        action = action.as_ref(),
        from = %tuple(&previous),
        to = %tuple(&next),
        "Decision computed"
    );

    let mut updated = request.clone();
    updated.status = next;

    Ok(Transition {
        request: updated,
        previous,
        record: ApprovalRecord {
            request_id: request.id,
            step: reviewed_step(role),
            role,
            action,
            notes: notes.to_string(),
        },
    })
}

fn tuple(status: &RequestStatus) -> String {
    format!("{}/{}/{}", status.origin, status.hr, status.overall)
}

/// Status a freshly created request starts in.
pub fn initial_status(submit: bool) -> RequestStatus {
    let origin = if submit { OriginStatus::Submitted } else { OriginStatus::Draft };
    RequestStatus::new(origin, HrStatus::NotStarted, OverallStatus::InProgress)
}

/// A draft handed to the chain by its requester.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub request: ManpowerRequest,
    pub previous: RequestStatus,
}

/// Move a draft to `SUBMITTED`, where the manager picks it up.
pub fn submit(request: &ManpowerRequest, employee_id: u64) -> Result<Submission, DecisionError> {
    if request.requester_id != employee_id {
        return Err(DecisionError::NotRequester {
            employee_id,
            request_id: request.id,
        });
    }
    if !can_submit(employee_id, request) || !lanes_agree(&request.status) {
        return Err(DecisionError::InvalidTransition {
            request_id: request.id,
            state: tuple(&request.status),
        });
    }

    let mut updated = request.clone();
    updated.status.origin = OriginStatus::Submitted.into();
    updated.status.overall = derive_overall(&updated.status.origin, &updated.status.hr).into();

    Ok(Submission {
        request: updated,
        previous: request.status.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::manpower_request::fixtures::{request, submitted};
    use crate::model::status::{Code, chain_step};
    use strum::IntoEnumIterator;

    fn approve(req: &ManpowerRequest, role: ApproverRole) -> ManpowerRequest {
        decide(req, role, ApprovalAction::Approve, "ok").unwrap().request
    }

    #[test]
    fn manager_approval_hands_over_to_director() {
        let req = submitted(7);
        let result = approve(&req, ApproverRole::Manager);

        assert_eq!(result.status.origin, Code::Known(OriginStatus::MgrApproved));
        assert_eq!(result.status.overall, Code::Known(OverallStatus::InProgress));
        assert!(!can_act(ApproverRole::Manager, &result));
        assert!(can_act(ApproverRole::Director, &result));
    }

    #[test]
    fn manager_cannot_reject_after_handing_over() {
        let req = request(8, OriginStatus::MgrApproved, HrStatus::NotStarted, OverallStatus::InProgress);
        let err = decide(&req, ApproverRole::Manager, ApprovalAction::Reject, "budget").unwrap_err();
        assert_eq!(
            err,
            DecisionError::NotAuthorized {
                role: ApproverRole::Manager,
                request_id: 8
            }
        );
        assert_eq!(err.code(), "NOT_AUTHORIZED");
    }

    #[test]
    fn approvals_walk_the_chain_one_step_at_a_time() {
        let chain = [
            ApproverRole::Manager,
            ApproverRole::Director,
            ApproverRole::HrRecruiter,
            ApproverRole::HrManager,
            ApproverRole::HrDirector,
        ];

        let mut req = submitted(9);
        let mut last = chain_step(&req.status).unwrap();
        for role in chain {
            req = approve(&req, role);
            let step = chain_step(&req.status).unwrap();
            assert!(step > last, "{role:?} moved from {last:?} to {step:?}");
            last = step;
        }

        assert_eq!(last, ChainStep::Completed);
        assert_eq!(req.status, RequestStatus::new(
            OriginStatus::DirApproved,
            HrStatus::HrDirectorApproved,
            OverallStatus::Approved,
        ));
        for role in ApproverRole::iter() {
            let err = decide(&req, role, ApprovalAction::Approve, "").unwrap_err();
            assert!(matches!(err, DecisionError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn intermediate_hr_codes_follow_the_auto_advance() {
        let req = request(10, OriginStatus::MgrApproved, HrStatus::NotStarted, OverallStatus::InProgress);
        let req = approve(&req, ApproverRole::Director);
        assert_eq!(req.status.hr, Code::Known(HrStatus::WaitingRecruiter));
        let req = approve(&req, ApproverRole::HrRecruiter);
        assert_eq!(req.status.hr, Code::Known(HrStatus::WaitingHrManager));
        let req = approve(&req, ApproverRole::HrManager);
        assert_eq!(req.status.hr, Code::Known(HrStatus::WaitingHrDirector));
    }

    #[test]
    fn legacy_intermediate_codes_are_accepted() {
        let req = request(11, OriginStatus::DirApproved, HrStatus::HrRecruiterApproved, OverallStatus::InProgress);
        assert_eq!(approve(&req, ApproverRole::HrManager).status.hr, Code::Known(HrStatus::WaitingHrDirector));

        let req = request(12, OriginStatus::DirApproved, HrStatus::HrManagerApproved, OverallStatus::InProgress);
        let done = approve(&req, ApproverRole::HrDirector);
        assert_eq!(done.status.overall, Code::Known(OverallStatus::Approved));
    }

    #[test]
    fn rejection_at_any_step_is_final() {
        let stages = [
            (OriginStatus::Submitted, HrStatus::NotStarted, ApproverRole::Manager, Code::Known(OriginStatus::MgrRejected), None),
            (OriginStatus::MgrApproved, HrStatus::NotStarted, ApproverRole::Director, Code::Known(OriginStatus::DirRejected), None),
            (OriginStatus::DirApproved, HrStatus::WaitingRecruiter, ApproverRole::HrRecruiter, Code::Known(OriginStatus::DirApproved), Some(HrStatus::RecruiterRejected)),
            (OriginStatus::DirApproved, HrStatus::WaitingHrManager, ApproverRole::HrManager, Code::Known(OriginStatus::DirApproved), Some(HrStatus::HrManagerRejected)),
            (OriginStatus::DirApproved, HrStatus::WaitingHrDirector, ApproverRole::HrDirector, Code::Known(OriginStatus::DirApproved), Some(HrStatus::HrDirectorRejected)),
        ];

        for (origin, hr, role, expected_origin, expected_hr) in stages {
            let req = request(13, origin, hr, OverallStatus::InProgress);
            let transition = decide(&req, role, ApprovalAction::Reject, "headcount frozen").unwrap();
            let rejected = transition.request;

            assert_eq!(rejected.status.origin, expected_origin);
            if let Some(expected_hr) = expected_hr {
                assert_eq!(rejected.status.hr, Code::Known(expected_hr));
            }
            assert_eq!(rejected.status.overall, Code::Known(OverallStatus::Rejected));
            assert_eq!(chain_step(&rejected.status), None);

            for next_role in ApproverRole::iter() {
                for action in [ApprovalAction::Approve, ApprovalAction::Reject] {
                    assert!(decide(&rejected, next_role, action, "").is_err());
                }
            }
        }
    }

    #[test]
    fn transition_keeps_the_audit_record_and_previous_codes() {
        let req = submitted(14);
        let transition = decide(&req, ApproverRole::Manager, ApprovalAction::Approve, "fits budget").unwrap();

        assert_eq!(transition.previous, req.status);
        assert_eq!(transition.record.request_id, 14);
        assert_eq!(transition.record.step, ChainStep::ManagerReview);
        assert_eq!(transition.record.role, ApproverRole::Manager);
        assert_eq!(transition.record.action, ApprovalAction::Approve);
        assert_eq!(transition.record.notes, "fits budget");
        // notes never change the outcome
        let silent = decide(&req, ApproverRole::Manager, ApprovalAction::Approve, "").unwrap();
        assert_eq!(silent.request.status, transition.request.status);
    }

    #[test]
    fn unmapped_overall_is_an_invalid_transition() {
        let mut req = submitted(15);
        req.status.overall = Code::Unknown("WAITING_MANAGEMENT".to_string());
        let err = decide(&req, ApproverRole::Manager, ApprovalAction::Approve, "").unwrap_err();
        assert_eq!(
            err,
            DecisionError::InvalidTransition {
                request_id: 15,
                state: "WAITING_MANAGEMENT".to_string()
            }
        );
    }

    #[test]
    fn inconsistent_lanes_are_an_invalid_transition() {
        let req = request(16, OriginStatus::Submitted, HrStatus::RecruiterRejected, OverallStatus::InProgress);
        let err = decide(&req, ApproverRole::Manager, ApprovalAction::Approve, "").unwrap_err();
        assert_eq!(
            err,
            DecisionError::InvalidTransition {
                request_id: 16,
                state: "SUBMITTED/RECRUITER_REJECTED/IN_PROGRESS".to_string()
            }
        );
    }

    #[test]
    fn new_requests_start_as_draft_or_submitted() {
        let draft = initial_status(false);
        assert_eq!(draft.origin, Code::Known(OriginStatus::Draft));
        assert!(lanes_agree(&draft));

        let sent = initial_status(true);
        assert_eq!(sent, submitted(1).status);
    }

    #[test]
    fn submitting_a_draft_hands_it_to_the_manager() {
        let draft = request(17, OriginStatus::Draft, HrStatus::NotStarted, OverallStatus::InProgress);
        let submission = submit(&draft, draft.requester_id).unwrap();
        assert_eq!(submission.previous, draft.status);
        assert_eq!(
            submission.request.status,
            RequestStatus::new(OriginStatus::Submitted, HrStatus::NotStarted, OverallStatus::InProgress)
        );
        assert!(can_act(ApproverRole::Manager, &submission.request));
    }

    #[test]
    fn only_drafts_are_submitted_by_their_requester() {
        let draft = request(18, OriginStatus::Draft, HrStatus::NotStarted, OverallStatus::InProgress);
        assert_eq!(
            submit(&draft, 42).unwrap_err(),
            DecisionError::NotRequester {
                employee_id: 42,
                request_id: 18
            }
        );

        let already = submitted(19);
        assert_eq!(submit(&already, already.requester_id).unwrap_err().code(), "INVALID_TRANSITION");
    }

    #[test]
    fn produced_tuples_always_satisfy_the_overall_invariant() {
        for origin in OriginStatus::iter() {
            for hr in HrStatus::iter() {
                let req = request(16, origin, hr, OverallStatus::InProgress);
                for role in ApproverRole::iter() {
                    for action in [ApprovalAction::Approve, ApprovalAction::Reject] {
                        if let Ok(transition) = decide(&req, role, action, "") {
                            let status = transition.request.status;
                            assert_eq!(
                                status.overall,
                                Code::Known(derive_overall(&status.origin, &status.hr))
                            );
                        }
                    }
                }
            }
        }
    }
}
