use crate::api::view::{RequestListResponse, RequestView};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::manpower_request::{ApprovalAction, ManpowerRequest, NewRequest};
use crate::repository::{RepositoryError, RequestRepository};
use crate::workflow::gate::can_withdraw;
use crate::workflow::query::{ProjectedRequest, RequestFilter, StatusFilter, filter, paginate, project_all};
use crate::workflow::transition::{decide, initial_status, submit};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    /// Case-insensitive substring of the document number
    #[schema(example = "PQ2501")]
    pub document_number: Option<String>,
    /// approved, pending (actionable by the caller) or rejected
    #[schema(example = "pending")]
    pub status: Option<StatusFilter>,
    #[schema(example = 10)]
    pub department_id: Option<u64>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<usize>,
    #[schema(example = 10)]
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideRequest {
    /// APPROVE or REJECT, any case
    #[schema(example = "APPROVE")]
    pub action: String,
    #[schema(example = "Headcount confirmed in budget")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequest {
    #[schema(example = "Line operator")]
    pub required_position_name: String,
    /// defaults to today
    #[schema(example = "2025-01-06", format = "date", value_type = Option<String>)]
    pub doc_date: Option<NaiveDate>,
    #[schema(example = 3)]
    pub section_id: Option<u64>,
    /// hand the request to the manager right away instead of keeping a draft
    #[serde(default)]
    #[schema(example = false)]
    pub submit: bool,
}

/// Hide requests outside the caller's department behind a 404.
fn visible_to(auth: &AuthUser, request: ManpowerRequest) -> Result<ManpowerRequest, RepositoryError> {
    if auth.can_see(request.department_id) {
        Ok(request)
    } else {
        Err(RepositoryError::NotFound(request.id))
    }
}

/// for listing manpower requests endpoint
#[utoipa::path(
    get,
    path = "/api/requests",
    params(RequestQuery),
    responses(
        (status = 200, description = "Paginated manpower requests", body = RequestListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Manpower"
)]
pub async fn list_requests(
    auth: AuthUser,
    repo: web::Data<dyn RequestRepository>,
    config: web::Data<Config>,
    query: web::Query<RequestQuery>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();
    let requests = repo.list(auth.visible_department()).await?;

    let criteria = RequestFilter {
        document_number: query.document_number.unwrap_or_default(),
        status: query.status,
        department_id: query.department_id,
    };
    let items = filter(project_all(requests, auth.role), &criteria);
    let page = paginate(items, query.page.unwrap_or(1), config.page_size(query.per_page));

    let data = page
        .items
        .iter()
        .map(|item| RequestView::new(item, &auth, config.display_locale))
        .collect();

    Ok(HttpResponse::Ok().json(RequestListResponse {
        data,
        page: page.meta,
    }))
}

/// Raise a manpower request for the caller's own department
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body(
        content = CreateRequest,
        description = "New request",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Request created", body = RequestView),
        (status = 400, description = "Missing required position", body = Object, example = json!({
            "error": "required_position_name is required"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Manpower"
)]
pub async fn create_request(
    auth: AuthUser,
    repo: web::Data<dyn RequestRepository>,
    config: web::Data<Config>,
    payload: web::Json<CreateRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let required_position_name = payload.required_position_name.trim();
    if required_position_name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "required_position_name is required"
        })));
    }

    let new_request = NewRequest {
        doc_date: payload.doc_date.unwrap_or_else(|| Utc::now().date_naive()),
        department_id: auth.department_id,
        section_id: payload.section_id,
        position_id: auth.position_id,
        requester_id: auth.employee_id,
        required_position_name: required_position_name.to_string(),
        status: initial_status(payload.submit),
    };
    let stored = repo.create(&new_request).await?;

    tracing::info!(
        request_id = stored.id,
        document_number = %stored.document_number,
        username = %auth.username,
        submitted = payload.submit,
        "Request created"
    );

    let item = ProjectedRequest::new(stored, auth.role);
    Ok(HttpResponse::Created().json(RequestView::new(&item, &auth, config.display_locale)))
}

/// for getting one manpower request endpoint
#[utoipa::path(
    get,
    path = "/api/requests/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the manpower request")
    ),
    responses(
        (status = 200, description = "Manpower request found", body = RequestView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Request not found", body = Object, example = json!({
            "error": "request 7 not found",
            "code": "NOT_FOUND"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Manpower"
)]
pub async fn get_request(
    auth: AuthUser,
    repo: web::Data<dyn RequestRepository>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = visible_to(&auth, repo.get_by_id(path.into_inner()).await?)?;
    let item = ProjectedRequest::new(request, auth.role);

    Ok(HttpResponse::Ok().json(RequestView::new(&item, &auth, config.display_locale)))
}

/// Approve or reject the current step of a request
#[utoipa::path(
    post,
    path = "/api/requests/{request_id}/decide",
    params(
        ("request_id" = u64, Path, description = "ID of the manpower request")
    ),
    request_body(
        content = DecideRequest,
        description = "Decision payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Decision recorded", body = RequestView),
        (status = 400, description = "Unknown action", body = Object, example = json!({
            "error": "Invalid action. Allowed: APPROVE, REJECT"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the current step", body = Object, example = json!({
            "error": "manager may not act on request 7 at its current step",
            "code": "NOT_AUTHORIZED"
        })),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is closed or changed meanwhile", body = Object, example = json!({
            "error": "The request was changed by someone else, reload and try again",
            "code": "CONFLICT"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Manpower"
)]
pub async fn decide_request(
    auth: AuthUser,
    repo: web::Data<dyn RequestRepository>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    payload: web::Json<DecideRequest>,
) -> actix_web::Result<impl Responder> {
    let request_id = path.into_inner();
    let role = auth.require_role()?;

    let Ok(action) = payload.action.parse::<ApprovalAction>() else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid action. Allowed: APPROVE, REJECT"
        })));
    };
    let notes = payload.notes.as_deref().unwrap_or("").trim();

    // decide on a fresh snapshot, never on what the client last saw
    let snapshot = visible_to(&auth, repo.get_by_id(request_id).await?)?;
    let transition = decide(&snapshot, role, action, notes)?;
    let stored = repo.submit_decision(&transition, auth.employee_id).await?;

    tracing::info!(
        request_id,
        employee_id = auth.employee_id,
        username = %auth.username,
        role = role.as_ref(),
        action = action.as_ref(),
        "Decision recorded"
    );

    let item = ProjectedRequest::new(stored, auth.role);
    Ok(HttpResponse::Ok().json(RequestView::new(&item, &auth, config.display_locale)))
}

/// Send an own draft to the manager
#[utoipa::path(
    post,
    path = "/api/requests/{request_id}/submit",
    params(
        ("request_id" = u64, Path, description = "ID of the manpower request")
    ),
    responses(
        (status = 200, description = "Request submitted", body = RequestView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller did not raise the request", body = Object, example = json!({
            "error": "employee 501 did not raise request 7",
            "code": "NOT_REQUESTER"
        })),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer a draft, or changed meanwhile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Manpower"
)]
pub async fn submit_request(
    auth: AuthUser,
    repo: web::Data<dyn RequestRepository>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request_id = path.into_inner();
    let snapshot = visible_to(&auth, repo.get_by_id(request_id).await?)?;
    let submission = submit(&snapshot, auth.employee_id)?;
    let stored = repo.submit(&submission).await?;

    tracing::info!(request_id, username = %auth.username, "Request submitted");

    let item = ProjectedRequest::new(stored, auth.role);
    Ok(HttpResponse::Ok().json(RequestView::new(&item, &auth, config.display_locale)))
}

/// Withdraw an own request nobody has reviewed yet
#[utoipa::path(
    delete,
    path = "/api/requests/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the manpower request")
    ),
    responses(
        (status = 200, description = "Request withdrawn", body = Object, example = json!({
            "message": "Request withdrawn"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the requester, or already under review"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request changed meanwhile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Manpower"
)]
pub async fn withdraw_request(
    auth: AuthUser,
    repo: web::Data<dyn RequestRepository>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request_id = path.into_inner();
    let snapshot = visible_to(&auth, repo.get_by_id(request_id).await?)?;

    if !can_withdraw(auth.employee_id, &snapshot) {
        return Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only the requester may withdraw a request before review",
            "code": "NOT_AUTHORIZED"
        })));
    }

    repo.withdraw(&snapshot).await?;
    tracing::info!(request_id, employee_id = auth.employee_id, "Request withdrawn");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request withdrawn"
    })))
}
