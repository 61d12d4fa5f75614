use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::model::manpower_request::{ApprovalRecord, ManpowerRequest, NewRequest, document_number};
use crate::repository::{RepositoryError, RequestRepository};
use crate::workflow::transition::{Submission, Transition};

/// Vec-backed store with the same compare-and-set rules as the MySQL one.
#[derive(Default)]
pub struct InMemoryRequestRepository {
    requests: Mutex<Vec<ManpowerRequest>>,
    history: Mutex<Vec<(ApprovalRecord, u64)>>,
}

impl InMemoryRequestRepository {
    pub fn with(requests: Vec<ManpowerRequest>) -> Self {
        Self {
            requests: Mutex::new(requests),
            history: Mutex::default(),
        }
    }

    pub fn history(&self) -> Vec<(ApprovalRecord, u64)> {
        self.history.lock().unwrap().clone()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.requests.lock().unwrap().iter().any(|r| r.id == id)
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn list(&self, department_id: Option<u64>) -> Result<Vec<ManpowerRequest>, RepositoryError> {
        let requests = self.requests.lock().unwrap();
        Ok(requests
            .iter()
            .filter(|r| department_id.is_none_or(|d| r.department_id == d))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<ManpowerRequest, RepositoryError> {
        let requests = self.requests.lock().unwrap();
        requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn create(&self, request: &NewRequest) -> Result<ManpowerRequest, RepositoryError> {
        let mut requests = self.requests.lock().unwrap();
        let id = requests.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let stored = ManpowerRequest {
            id,
            document_number: document_number(request.doc_date, id),
            status: request.status.clone(),
            doc_date: request.doc_date,
            department_id: request.department_id,
            department_name: None,
            section_name: None,
            position_name: None,
            requester_id: request.requester_id,
            requester_name: None,
            required_position_name: request.required_position_name.clone(),
            created_at: now,
            updated_at: now,
        };
        requests.push(stored.clone());
        Ok(stored)
    }

    async fn submit(&self, submission: &Submission) -> Result<ManpowerRequest, RepositoryError> {
        let id = submission.request.id;
        let mut requests = self.requests.lock().unwrap();
        let stored = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound(id))?;

        if stored.status != submission.previous || stored.requester_id != submission.request.requester_id {
            return Err(RepositoryError::Conflict(id));
        }

        stored.status = submission.request.status.clone();
        Ok(stored.clone())
    }

    async fn submit_decision(
        &self,
        transition: &Transition,
        approver_id: u64,
    ) -> Result<ManpowerRequest, RepositoryError> {
        let id = transition.request.id;
        let mut requests = self.requests.lock().unwrap();
        let stored = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound(id))?;

        if stored.status != transition.previous {
            return Err(RepositoryError::Conflict(id));
        }

        stored.status = transition.request.status.clone();
        self.history
            .lock()
            .unwrap()
            .push((transition.record.clone(), approver_id));

        Ok(stored.clone())
    }

    async fn withdraw(&self, snapshot: &ManpowerRequest) -> Result<(), RepositoryError> {
        let mut requests = self.requests.lock().unwrap();
        let position = requests
            .iter()
            .position(|r| {
                r.id == snapshot.id
                    && r.requester_id == snapshot.requester_id
                    && r.status == snapshot.status
            })
            .ok_or(RepositoryError::Conflict(snapshot.id))?;
        requests.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::manpower_request::ApprovalAction;
    use crate::model::manpower_request::fixtures::submitted;
    use crate::model::role::ApproverRole;
    use crate::model::status::{Code, OriginStatus};
    use crate::model::manpower_request::fixtures::request;
    use crate::model::status::{HrStatus, OverallStatus};
    use crate::workflow::transition::{decide, initial_status, submit};

    #[actix_web::test]
    async fn second_decision_on_the_same_snapshot_conflicts() {
        let repo = InMemoryRequestRepository::with(vec![submitted(1)]);
        let snapshot = repo.get_by_id(1).await.unwrap();

        let first = decide(&snapshot, ApproverRole::Manager, ApprovalAction::Approve, "").unwrap();
        let second = decide(&snapshot, ApproverRole::Manager, ApprovalAction::Reject, "too late").unwrap();

        let stored = repo.submit_decision(&first, 7).await.unwrap();
        assert_eq!(stored.status.origin, Code::Known(OriginStatus::MgrApproved));

        let err = repo.submit_decision(&second, 8).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(1)));
        assert_eq!(repo.history().len(), 1);
        assert_eq!(repo.history()[0].1, 7);
    }

    #[actix_web::test]
    async fn withdraw_removes_only_an_unchanged_row() {
        let repo = InMemoryRequestRepository::with(vec![submitted(1), submitted(2)]);
        let stale = repo.get_by_id(2).await.unwrap();

        repo.withdraw(&repo.get_by_id(1).await.unwrap()).await.unwrap();
        assert!(!repo.contains(1));

        let moved = decide(&stale, ApproverRole::Manager, ApprovalAction::Approve, "").unwrap();
        repo.submit_decision(&moved, 7).await.unwrap();
        assert!(matches!(repo.withdraw(&stale).await, Err(RepositoryError::Conflict(2))));
        assert!(repo.contains(2));
    }

    #[actix_web::test]
    async fn created_drafts_get_ids_and_document_numbers() {
        let repo = InMemoryRequestRepository::with(vec![submitted(4)]);
        let draft = NewRequest {
            doc_date: chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            department_id: 10,
            section_id: None,
            position_id: 9,
            requester_id: 1000,
            required_position_name: "Forklift driver".to_string(),
            status: initial_status(false),
        };

        let stored = repo.create(&draft).await.unwrap();
        assert_eq!(stored.id, 5);
        assert_eq!(stored.document_number, "PQ25020005");
        assert_eq!(stored.status.origin, Code::Known(OriginStatus::Draft));
        assert!(repo.contains(5));
    }

    #[actix_web::test]
    async fn submitting_a_changed_draft_conflicts() {
        let draft = request(1, OriginStatus::Draft, HrStatus::NotStarted, OverallStatus::InProgress);
        let repo = InMemoryRequestRepository::with(vec![draft.clone()]);

        let first = submit(&draft, draft.requester_id).unwrap();
        let stored = repo.submit(&first).await.unwrap();
        assert_eq!(stored.status.origin, Code::Known(OriginStatus::Submitted));

        assert!(matches!(repo.submit(&first).await, Err(RepositoryError::Conflict(1))));
    }

    #[actix_web::test]
    async fn list_scopes_by_department() {
        let mut other = submitted(3);
        other.department_id = 20;
        let repo = InMemoryRequestRepository::with(vec![submitted(1), other]);

        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        let scoped = repo.list(Some(20)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, 3);
        assert!(matches!(repo.get_by_id(9).await, Err(RepositoryError::NotFound(9))));
    }
}
