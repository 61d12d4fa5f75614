use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::model::manpower_request::{ManpowerRequest, NewRequest, RequestRow, document_number};
use crate::model::role::ApproverRole;
use crate::repository::{RepositoryError, RequestRepository, RoleTable};
use crate::workflow::transition::{Submission, Transition};

const SELECT_REQUESTS: &str = r#"
    SELECT
        mr.request_id,
        mr.doc_number,
        mr.doc_date,
        mr.requesting_dept_id,
        d.dept_name,
        s.section_name,
        p.pos_name,
        mr.employee_id,
        CONCAT(e.first_name, ' ', e.last_name) AS requester_name,
        mr.required_position_name,
        mr.origin_status,
        mr.hr_status,
        mr.overall_status,
        mr.created_at,
        mr.updated_at
    FROM manpower_requests mr
    LEFT JOIN departments d ON mr.requesting_dept_id = d.dept_id
    LEFT JOIN sections s ON mr.requesting_section_id = s.section_id
    LEFT JOIN positions p ON mr.requesting_pos_id = p.pos_id
    LEFT JOIN employees e ON mr.employee_id = e.employee_id
"#;

#[derive(Clone)]
pub struct MySqlRequestRepository {
    pool: MySqlPool,
}

impl MySqlRequestRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for MySqlRequestRepository {
    async fn list(&self, department_id: Option<u64>) -> Result<Vec<ManpowerRequest>, RepositoryError> {
        let mut where_sql = String::from(" WHERE 1=1");
        if department_id.is_some() {
            where_sql.push_str(" AND mr.requesting_dept_id = ?");
        }
        let sql = format!("{SELECT_REQUESTS}{where_sql} ORDER BY mr.created_at DESC");

        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        if let Some(department_id) = department_id {
            query = query.bind(department_id);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, ?department_id, "Failed to fetch manpower requests");
            RepositoryError::from(e)
        })?;

        Ok(rows.into_iter().map(ManpowerRequest::from).collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<ManpowerRequest, RepositoryError> {
        let sql = format!("{SELECT_REQUESTS} WHERE mr.request_id = ?");

        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, request_id = id, "Failed to fetch manpower request");
                RepositoryError::from(e)
            })?;

        row.map(ManpowerRequest::from)
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn create(&self, request: &NewRequest) -> Result<ManpowerRequest, RepositoryError> {
        let status = &request.status;
        let mut tx = self.pool.begin().await?;

        // doc_number is unique; hold a throwaway value until the id is known
        let inserted = sqlx::query(
            r#"
            INSERT INTO manpower_requests
                (doc_number, employee_id, doc_date, requesting_dept_id, requesting_section_id,
                 requesting_pos_id, required_position_name, origin_status, hr_status,
                 overall_status, created_at, updated_at)
            VALUES (CONCAT('TMP-', UUID()), ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(request.requester_id)
        .bind(request.doc_date)
        .bind(request.department_id)
        .bind(request.section_id)
        .bind(request.position_id)
        .bind(&request.required_position_name)
        .bind(status.origin.as_str())
        .bind(status.hr.as_str())
        .bind(status.overall.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, requester_id = request.requester_id, "Request insert failed");
            RepositoryError::from(e)
        })?;

        let id = inserted.last_insert_id();
        sqlx::query("UPDATE manpower_requests SET doc_number = ? WHERE request_id = ?")
            .bind(document_number(request.doc_date, id))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn submit(&self, submission: &Submission) -> Result<ManpowerRequest, RepositoryError> {
        let id = submission.request.id;
        let next = &submission.request.status;
        let previous = &submission.previous;

        let updated = sqlx::query(
            r#"
            UPDATE manpower_requests
            SET origin_status = ?, hr_status = ?, overall_status = ?, updated_at = NOW()
            WHERE request_id = ?
            AND employee_id = ?
            AND origin_status = ?
            AND hr_status = ?
            AND overall_status = ?
            "#,
        )
        .bind(next.origin.as_str())
        .bind(next.hr.as_str())
        .bind(next.overall.as_str())
        .bind(id)
        .bind(submission.request.requester_id)
        .bind(previous.origin.as_str())
        .bind(previous.hr.as_str())
        .bind(previous.overall.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = id, "Submit failed");
            RepositoryError::from(e)
        })?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(id));
        }

        self.get_by_id(id).await
    }

    async fn submit_decision(
        &self,
        transition: &Transition,
        approver_id: u64,
    ) -> Result<ManpowerRequest, RepositoryError> {
        let id = transition.request.id;
        let next = &transition.request.status;
        let previous = &transition.previous;
        let record = &transition.record;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE manpower_requests
            SET origin_status = ?, hr_status = ?, overall_status = ?, updated_at = NOW()
            WHERE request_id = ?
            AND origin_status = ?
            AND hr_status = ?
            AND overall_status = ?
            "#,
        )
        .bind(next.origin.as_str())
        .bind(next.hr.as_str())
        .bind(next.overall.as_str())
        .bind(id)
        .bind(previous.origin.as_str())
        .bind(previous.hr.as_str())
        .bind(previous.overall.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = id, "Decision update failed");
            RepositoryError::from(e)
        })?;

        if updated.rows_affected() == 0 {
            // dropping the transaction rolls it back
            return Err(RepositoryError::Conflict(id));
        }

        sqlx::query(
            r#"
            INSERT INTO approval_history
                (request_id, approver_id, step, action, notes, approval_time)
            VALUES (?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(id)
        .bind(approver_id)
        .bind(record.step.index())
        .bind(record.action.as_ref())
        .bind(&record.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = id, "Approval history insert failed");
            RepositoryError::from(e)
        })?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn withdraw(&self, snapshot: &ManpowerRequest) -> Result<(), RepositoryError> {
        let status = &snapshot.status;

        let result = sqlx::query(
            r#"
            DELETE FROM manpower_requests
            WHERE request_id = ?
            AND employee_id = ?
            AND origin_status = ?
            AND hr_status = ?
            AND overall_status = ?
            "#,
        )
        .bind(snapshot.id)
        .bind(snapshot.requester_id)
        .bind(status.origin.as_str())
        .bind(status.hr.as_str())
        .bind(status.overall.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = snapshot.id, "Withdraw failed");
            RepositoryError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(snapshot.id));
        }

        Ok(())
    }
}

#[async_trait]
impl RoleTable for MySqlRequestRepository {
    async fn lookup(
        &self,
        department_id: u64,
        position_id: u64,
    ) -> Result<Option<ApproverRole>, RepositoryError> {
        let code = sqlx::query_scalar::<_, String>(
            "SELECT role FROM approver_roles WHERE department_id = ? AND position_id = ?",
        )
        .bind(department_id)
        .bind(position_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code.and_then(|code| {
            let role = ApproverRole::from_code(&code);
            if role.is_none() {
                tracing::warn!(department_id, position_id, code = %code, "Unknown approver role code");
            }
            role
        }))
    }
}
