use crate::model::role::ApproverRole;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Authenticated session, put in the request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub employee_id: u64,
    pub department_id: u64,
    pub position_id: u64,

    /// None for employees outside the approval chain
    pub role: Option<ApproverRole>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

impl AuthUser {
    pub fn require_role(&self) -> actix_web::Result<ApproverRole> {
        self.role
            .ok_or_else(|| actix_web::error::ErrorForbidden("Approver role required"))
    }

    /// Department the caller is limited to; HR approvers see all of them.
    pub fn visible_department(&self) -> Option<u64> {
        match self.role {
            Some(role) if role.is_hr() => None,
            _ => Some(self.department_id),
        }
    }

    pub fn can_see(&self, department_id: u64) -> bool {
        self.visible_department()
            .is_none_or(|visible| visible == department_id)
    }
}
