use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::manpower_request::ManpowerRequest;
use crate::model::role::ApproverRole;
use crate::workflow::gate::session_can_act;
use crate::workflow::projector::{DisplayStatus, project};

/// A request together with everything a list row needs to render it for
/// one caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRequest {
    pub request: ManpowerRequest,
    pub display: DisplayStatus,
    pub can_act: bool,
}

impl ProjectedRequest {
    pub fn new(request: ManpowerRequest, role: Option<ApproverRole>) -> Self {
        let status = &request.status;
        let display = project(&status.origin, &status.hr, &status.overall);
        let can_act = session_can_act(role, &request);
        Self {
            request,
            display,
            can_act,
        }
    }
}

pub fn project_all(requests: Vec<ManpowerRequest>, role: Option<ApproverRole>) -> Vec<ProjectedRequest> {
    requests
        .into_iter()
        .map(|request| ProjectedRequest::new(request, role))
        .collect()
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// all three columns approved
    Approved,
    /// the caller may act on it now
    Pending,
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub document_number: String,
    pub status: Option<StatusFilter>,
    pub department_id: Option<u64>,
}

impl RequestFilter {
    fn matches(&self, item: &ProjectedRequest, needle: &str) -> bool {
        if !needle.is_empty() && !item.request.document_number.to_lowercase().contains(needle) {
            return false;
        }

        if let Some(department_id) = self.department_id {
            if item.request.department_id != department_id {
                return false;
            }
        }

        match self.status {
            None => true,
            Some(StatusFilter::Approved) => item.display.is_fully_approved(),
            Some(StatusFilter::Pending) => item.can_act,
            Some(StatusFilter::Rejected) => item.display.is_rejected(),
        }
    }
}

/// Keep the items matching every set criterion, in input order.
pub fn filter(mut items: Vec<ProjectedRequest>, criteria: &RequestFilter) -> Vec<ProjectedRequest> {
    let needle = criteria.document_number.trim().to_lowercase();
    items.retain(|item| criteria.matches(item, &needle));
    items
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, ToSchema)]
pub struct PageMeta {
    #[schema(example = 1)]
    pub current_page: usize,
    #[schema(example = 3)]
    pub total_pages: usize,
    #[schema(example = 25)]
    pub total_items: usize,
    #[schema(example = 10)]
    pub items_on_page: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Cut one page out of `items`. `page` is 1-based and clamps into
/// `[1, total_pages]`; a zero page size counts as one.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);
    let current_page = page.clamp(1, total_pages.max(1));

    let start = ((current_page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);

    let items: Vec<T> = items.into_iter().skip(start).take(end - start).collect();

    Page {
        meta: PageMeta {
            current_page,
            total_pages,
            total_items,
            items_on_page: items.len(),
        },
        items,
    }
}
