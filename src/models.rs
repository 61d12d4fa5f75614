use serde::{Deserialize, Serialize};

/// Claims carried by the bearer tokens of the identity service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub employee_id: u64,
    pub department_id: u64,
    pub position_id: u64,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
