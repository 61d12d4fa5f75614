use async_trait::async_trait;
use derive_more::Display;

use crate::model::manpower_request::{ManpowerRequest, NewRequest};
use crate::model::role::ApproverRole;
use crate::workflow::transition::{Submission, Transition};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[derive(Debug, Display)]
pub enum RepositoryError {
    #[display(fmt = "request {} not found", _0)]
    NotFound(u64),
    /// The stored status no longer matches the snapshot the caller decided on.
    #[display(fmt = "request {} was changed by someone else", _0)]
    Conflict(u64),
    #[display(fmt = "database error: {}", _0)]
    Backend(sqlx::Error),
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        RepositoryError::Backend(e)
    }
}

/// Backend store of manpower requests.
///
/// Writes are compare-and-set on the three status columns so two approvers
/// can never both act on the same step.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Newest first; `department_id` narrows to one requesting department.
    async fn list(&self, department_id: Option<u64>) -> Result<Vec<ManpowerRequest>, RepositoryError>;

    async fn get_by_id(&self, id: u64) -> Result<ManpowerRequest, RepositoryError>;

    /// Insert a request and give it its document number.
    async fn create(&self, request: &NewRequest) -> Result<ManpowerRequest, RepositoryError>;

    /// Move a draft to `SUBMITTED` if nobody changed it in between.
    async fn submit(&self, submission: &Submission) -> Result<ManpowerRequest, RepositoryError>;

    /// Persist a decision and its history entry, then return the stored row.
    async fn submit_decision(
        &self,
        transition: &Transition,
        approver_id: u64,
    ) -> Result<ManpowerRequest, RepositoryError>;

    /// Delete a request still in the state of `snapshot`.
    async fn withdraw(&self, snapshot: &ManpowerRequest) -> Result<(), RepositoryError>;
}

/// Backend-owned mapping from (department, position) to approver role.
#[async_trait]
pub trait RoleTable: Send + Sync {
    async fn lookup(
        &self,
        department_id: u64,
        position_id: u64,
    ) -> Result<Option<ApproverRole>, RepositoryError>;
}
