use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

use crate::model::role::ApproverRole;
use crate::model::status::{ChainStep, RequestStatus};

/// Read-only snapshot of a `manpower_requests` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ManpowerRequest {
    pub id: u64,
    pub document_number: String,
    pub status: RequestStatus,

    pub doc_date: NaiveDate,
    pub department_id: u64,
    pub department_name: Option<String>,
    pub section_name: Option<String>,
    pub position_name: Option<String>,
    /// employee who raised the request
    pub requester_id: u64,
    pub requester_name: Option<String>,
    pub required_position_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape returned by the request queries; statuses stay raw strings
/// until they go through the registry.
#[derive(Debug, sqlx::FromRow)]
pub struct RequestRow {
    pub request_id: u64,
    pub doc_number: String,
    pub doc_date: NaiveDate,
    pub requesting_dept_id: u64,
    pub dept_name: Option<String>,
    pub section_name: Option<String>,
    pub pos_name: Option<String>,
    pub employee_id: u64,
    pub requester_name: Option<String>,
    pub required_position_name: String,
    pub origin_status: String,
    pub hr_status: String,
    pub overall_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RequestRow> for ManpowerRequest {
    fn from(row: RequestRow) -> Self {
        Self {
            id: row.request_id,
            document_number: row.doc_number,
            status: RequestStatus::parse(&row.origin_status, &row.hr_status, &row.overall_status),
            doc_date: row.doc_date,
            department_id: row.requesting_dept_id,
            department_name: row.dept_name,
            section_name: row.section_name,
            position_name: row.pos_name,
            requester_id: row.employee_id,
            requester_name: row.requester_name,
            required_position_name: row.required_position_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A request about to be stored; the store assigns id and document number.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub doc_date: NaiveDate,
    pub department_id: u64,
    pub section_id: Option<u64>,
    /// position of the requester, not the one being hired for
    pub position_id: u64,
    pub requester_id: u64,
    pub required_position_name: String,
    pub status: RequestStatus,
}

/// `PQ` + year and month of the document date + the row id, e.g. `PQ25010015`.
pub fn document_number(doc_date: NaiveDate, id: u64) -> String {
    format!("PQ{}{:04}", doc_date.format("%y%m"), id)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

/// One `approval_history` entry; the store stamps approver and time.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalRecord {
    pub request_id: u64,
    pub step: ChainStep,
    pub role: ApproverRole,
    pub action: ApprovalAction,
    pub notes: String,
}

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use crate::model::status::{HrStatus, OriginStatus, OverallStatus};
    use chrono::TimeZone;

    pub fn request(id: u64, origin: OriginStatus, hr: HrStatus, overall: OverallStatus) -> ManpowerRequest {
        let at = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
        ManpowerRequest {
            id,
            document_number: format!("PQ2501{id:04}"),
            status: RequestStatus::new(origin, hr, overall),
            doc_date: at.date_naive(),
            department_id: 10,
            department_name: Some("Production".to_string()),
            section_name: None,
            position_name: Some("Operator".to_string()),
            requester_id: 1000,
            requester_name: Some("Somchai K.".to_string()),
            required_position_name: "Line operator".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn submitted(id: u64) -> ManpowerRequest {
        request(id, OriginStatus::Submitted, HrStatus::NotStarted, OverallStatus::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::status::{Code, OriginStatus};

    #[test]
    fn row_statuses_go_through_the_registry() {
        let at = Utc::now();
        let row = RequestRow {
            request_id: 15,
            doc_number: "PQ24110026".to_string(),
            doc_date: at.date_naive(),
            requesting_dept_id: 3,
            dept_name: None,
            section_name: None,
            pos_name: None,
            employee_id: 42,
            requester_name: None,
            required_position_name: "Accountant".to_string(),
            origin_status: "MGR_APPROVED".to_string(),
            hr_status: "NONE".to_string(),
            overall_status: "WAITING_MANAGEMENT".to_string(),
            created_at: at,
            updated_at: at,
        };

        let request = ManpowerRequest::from(row);
        assert_eq!(request.id, 15);
        assert_eq!(request.requester_id, 42);
        assert_eq!(request.status.origin, Code::Known(OriginStatus::MgrApproved));
        assert_eq!(request.status.overall, Code::Unknown("WAITING_MANAGEMENT".to_string()));
    }

    #[test]
    fn document_numbers_carry_the_month_and_id() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
        assert_eq!(document_number(date, 26), "PQ24110026");
        assert_eq!(document_number(date, 123456), "PQ2411123456");
    }

    #[test]
    fn actions_parse_case_insensitively() {
        assert_eq!("approve".parse::<ApprovalAction>().ok(), Some(ApprovalAction::Approve));
        assert_eq!("REJECT".parse::<ApprovalAction>().ok(), Some(ApprovalAction::Reject));
        assert!("RETURN".parse::<ApprovalAction>().is_err());
        assert_eq!(ApprovalAction::Reject.as_ref(), "REJECT");
    }
}
