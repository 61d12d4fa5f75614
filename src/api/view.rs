use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::status::chain_step;
use crate::workflow::gate::{can_submit, can_withdraw};
use crate::workflow::projector::{DisplayCell, DisplayStatus, Locale};
use crate::workflow::query::{PageMeta, ProjectedRequest};

#[derive(Debug, Serialize, ToSchema)]
pub struct CellView {
    /// stable label key, e.g. `waiting_director`
    #[schema(example = "waiting_director")]
    pub key: String,
    #[schema(example = "รอผู้อำนวยการฝ่าย")]
    pub text: String,
    #[schema(example = "pending")]
    pub badge: String,
}

impl CellView {
    fn new(cell: &DisplayCell, locale: Locale) -> Self {
        Self {
            key: cell.label.key().to_string(),
            text: cell.label.text(locale).into_owned(),
            badge: cell.badge.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DisplayView {
    pub manager: CellView,
    pub hr: CellView,
    pub executive: CellView,
}

impl DisplayView {
    pub fn new(display: &DisplayStatus, locale: Locale) -> Self {
        Self {
            manager: CellView::new(&display.manager, locale),
            hr: CellView::new(&display.hr, locale),
            executive: CellView::new(&display.executive, locale),
        }
    }
}

/// Raw status codes as stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCodes {
    #[schema(example = "MGR_APPROVED")]
    pub origin: String,
    #[schema(example = "NONE")]
    pub hr: String,
    #[schema(example = "IN_PROGRESS")]
    pub overall: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestView {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "PQ25010001")]
    pub document_number: String,
    #[schema(example = "2025-01-06", format = "date", value_type = String)]
    pub doc_date: NaiveDate,
    #[schema(example = 10)]
    pub department_id: u64,
    pub department_name: Option<String>,
    pub section_name: Option<String>,
    pub position_name: Option<String>,
    #[schema(example = 1000)]
    pub requester_id: u64,
    pub requester_name: Option<String>,
    pub required_position_name: String,
    pub status: StatusCodes,
    /// position on the approval chain, 0 (draft) to 6 (completed); absent
    /// for rejected requests or unknown codes
    #[schema(example = 2)]
    pub step: Option<u8>,
    pub display: DisplayView,
    /// the caller may approve or reject now
    pub can_act: bool,
    /// the caller may withdraw it
    pub can_withdraw: bool,
    /// the caller may send this draft to the manager
    pub can_submit: bool,
    #[schema(example = "2025-01-06T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2025-01-06T09:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl RequestView {
    pub fn new(item: &ProjectedRequest, auth: &AuthUser, locale: Locale) -> Self {
        let request = &item.request;
        Self {
            id: request.id,
            document_number: request.document_number.clone(),
            doc_date: request.doc_date,
            department_id: request.department_id,
            department_name: request.department_name.clone(),
            section_name: request.section_name.clone(),
            position_name: request.position_name.clone(),
            requester_id: request.requester_id,
            requester_name: request.requester_name.clone(),
            required_position_name: request.required_position_name.clone(),
            status: StatusCodes {
                origin: request.status.origin.as_str().to_string(),
                hr: request.status.hr.as_str().to_string(),
                overall: request.status.overall.as_str().to_string(),
            },
            step: chain_step(&request.status).map(|step| step.index()),
            display: DisplayView::new(&item.display, locale),
            can_act: item.can_act,
            can_withdraw: can_withdraw(auth.employee_id, request),
            can_submit: can_submit(auth.employee_id, request),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestListResponse {
    pub data: Vec<RequestView>,
    pub page: PageMeta,
}
