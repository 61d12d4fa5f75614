use crate::auth::auth::AuthUser;
use crate::repository::RequestRepository;
use crate::workflow::dashboard::overview;
use crate::workflow::query::project_all;
use actix_web::{HttpResponse, Responder, web};

/// Dashboard counters over the requests visible to the caller
#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    responses(
        (status = 200, description = "Dashboard overview", body = Overview),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_overview(
    auth: AuthUser,
    repo: web::Data<dyn RequestRepository>,
) -> actix_web::Result<impl Responder> {
    let requests = repo.list(auth.visible_department()).await?;
    let items = project_all(requests, auth.role);

    Ok(HttpResponse::Ok().json(overview(&items)))
}
