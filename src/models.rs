use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Body of `POST /auth/register`.
#[derive(Deserialize)]
pub struct RegisterReq {
    pub email: String,
    pub password: String,
    pub role_id: u8,
    /// Links the account to an existing employee profile, if any
    pub employee_id: Option<u64>,
}

/// Body of `POST /auth/login`.
#[derive(Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// Row shape shared by the credential lookups in the auth handlers.
#[derive(FromRow)]
pub struct UserSql {
    pub id: u64, // BIGINT UNSIGNED
    pub email: String,
    pub password: String,
    pub role_id: u8,
    pub employee_id: Option<u64>,
}

/// JWT payload. One shape for all three token kinds; `token_type` keeps a
/// refresh or reset token from ever being accepted where an access token
/// is expected.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String, // email
    pub role: u8,    // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this account is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
    Reset,
}
