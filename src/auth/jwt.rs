use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error,
};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn issue(
    user_id: u64,
    email: String,
    role: u8,
    employee_id: Option<u64>,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        user_id,
        sub: email,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn generate_access_token(
    user_id: u64,
    email: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    issue(user_id, email, role, employee_id, TokenType::Access, secret, ttl).map(|(t, _)| t)
}

/// Refresh tokens are persisted by jti, so the claims come back with the
/// token.
pub fn generate_refresh_token(
    user_id: u64,
    email: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(user_id, email, role, employee_id, TokenType::Refresh, secret, ttl)
}

/// Single-use password-reset tokens; same persistence scheme as refresh
/// tokens, short TTL.
pub fn generate_reset_token(
    user_id: u64,
    email: String,
    role: u8,
    employee_id: Option<u64>,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(user_id, email, role, employee_id, TokenType::Reset, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn access_token_round_trips() {
        let token =
            generate_access_token(42, "kay@workdesk.io".into(), 2, Some(7), SECRET, 900).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "kay@workdesk.io");
        assert_eq!(claims.role, 2);
        assert_eq!(claims.employee_id, Some(7));
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_and_reset_keep_their_type_tag() {
        let (refresh, rc) =
            generate_refresh_token(1, "a@b.c".into(), 4, None, SECRET, 3600).unwrap();
        let (reset, sc) = generate_reset_token(1, "a@b.c".into(), 4, None, SECRET, 600).unwrap();

        assert_eq!(rc.token_type, TokenType::Refresh);
        assert_eq!(sc.token_type, TokenType::Reset);
        assert_ne!(rc.jti, sc.jti);

        assert_eq!(verify_token(&refresh, SECRET).unwrap().token_type, TokenType::Refresh);
        assert_eq!(verify_token(&reset, SECRET).unwrap().token_type, TokenType::Reset);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(1, "a@b.c".into(), 1, None, SECRET, 900).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // craft claims already past the default validation leeway
        let claims = Claims {
            user_id: 1,
            sub: "a@b.c".into(),
            role: 1,
            exp: now() - 3600,
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
            employee_id: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }
}
