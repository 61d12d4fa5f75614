use crate::api::manpower_request::{CreateRequest, DecideRequest, RequestQuery};
use crate::api::view::{CellView, DisplayView, RequestListResponse, RequestView, StatusCodes};
use crate::workflow::dashboard::{ApprovalPie, DepartmentSeries, Overview, Totals};
use crate::workflow::query::{PageMeta, StatusFilter};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Manpower Request Approval API",
        version = "1.0.0",
        description = r#"
## Manpower Request Approval

Requests for new headcount travel a fixed approval chain:

**Manager → Director → HR Recruiter → HR Manager → HR Director**

### 🔹 Key Features
- **Requests**
  - Create as a draft or submitted straight to the manager; submit a draft later
  - List with document number, status and department filters, paginated
  - Three display columns (manager / HR / executive) derived from the raw status codes
- **Decisions**
  - Approve or reject the step you own; any rejection is final
  - Writes are compare-and-set, a stale decision returns 409
- **Dashboard**
  - Totals, approval pie and per-department series

### 🔐 Security
Every endpoint requires a **JWT Bearer** access token. The approver role is
resolved from the caller's department and position.

Paths are served under the `API_PREFIX` the server runs with (default `/api`).
"#,
    ),
    paths(
        crate::api::manpower_request::list_requests,
        crate::api::manpower_request::create_request,
        crate::api::manpower_request::get_request,
        crate::api::manpower_request::submit_request,
        crate::api::manpower_request::decide_request,
        crate::api::manpower_request::withdraw_request,

        crate::api::dashboard::dashboard_overview
    ),
    components(
        schemas(
            RequestQuery,
            CreateRequest,
            DecideRequest,
            StatusFilter,
            RequestView,
            RequestListResponse,
            StatusCodes,
            DisplayView,
            CellView,
            PageMeta,
            Overview,
            Totals,
            ApprovalPie,
            DepartmentSeries
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Manpower", description = "Manpower request approval APIs"),
        (name = "Dashboard", description = "Approval dashboard APIs"),
    )
)]
pub struct ApiDoc;

const DOCUMENTED_PREFIX: &str = "/api";

/// The document as served, with paths moved under `prefix`.
pub fn api_doc(prefix: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    ApiPrefix(prefix).modify(&mut doc);
    doc
}

/// Handlers document their paths under `/api`; re-root them at runtime.
struct ApiPrefix<'a>(&'a str);

impl Modify for ApiPrefix<'_> {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let prefix = self.0.trim_end_matches('/');
        if prefix == DOCUMENTED_PREFIX {
            return;
        }
        let paths = std::mem::take(&mut openapi.paths.paths);
        openapi.paths.paths = paths
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOCUMENTED_PREFIX) {
                Some(rest) => (format!("{prefix}{rest}"), item),
                None => (path, item),
            })
            .collect();
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
