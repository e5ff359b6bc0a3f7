use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Identity attached to every request that passed the auth gate.
///
/// `auth_middleware` verifies the bearer token once and stores this in the
/// request extensions; handlers receive it through the extractor below, so
/// the token is never decoded twice on the same request.
#[derive(Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,

    /// Present only if this account is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Not authenticated")),
        )
    }
}

impl AuthUser {
    pub fn require_ceo(&self) -> actix_web::Result<()> {
        if self.role == Role::Ceo {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("CEO only"))
        }
    }

    pub fn require_hr_or_ceo(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Ceo | Role::Hr) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/CEO only"))
        }
    }

    pub fn require_lead_or_above(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Ceo | Role::Hr | Role::TeamLeader) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Team lead or above only"))
        }
    }

    /// Returns true if the user holds the plain employee role
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Role) -> AuthUser {
        AuthUser {
            user_id: 7,
            email: "gate@workdesk.io".into(),
            role,
            employee_id: Some(3),
        }
    }

    #[test]
    fn hr_gate_admits_hr_and_ceo_only() {
        assert!(user_with(Role::Ceo).require_hr_or_ceo().is_ok());
        assert!(user_with(Role::Hr).require_hr_or_ceo().is_ok());
        assert!(user_with(Role::TeamLeader).require_hr_or_ceo().is_err());
        assert!(user_with(Role::Employee).require_hr_or_ceo().is_err());
    }

    #[test]
    fn lead_gate_stops_at_team_leader() {
        assert!(user_with(Role::TeamLeader).require_lead_or_above().is_ok());
        assert!(user_with(Role::Employee).require_lead_or_above().is_err());
    }

    #[test]
    fn ceo_gate_admits_nobody_else() {
        assert!(user_with(Role::Ceo).require_ceo().is_ok());
        assert!(user_with(Role::Hr).require_ceo().is_err());
    }
}
