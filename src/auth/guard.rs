use crate::model::role::Role;

pub const LOGIN_PATH: &str = "/login";

/// Route guard for the dashboard shell: given the caller's role (if any)
/// and the path they are on, return the path they must be redirected to,
/// or `None` when the current path is acceptable.
///
/// Anyone without a valid session belongs on the login page; anyone with
/// one belongs under their role's landing prefix. The login page and the
/// root both bounce an authenticated user to their landing page.
pub fn resolve_redirect(role: Option<Role>, current_path: &str) -> Option<&'static str> {
    let role = match role {
        Some(r) => r,
        None => {
            return if current_path == LOGIN_PATH {
                None
            } else {
                Some(LOGIN_PATH)
            };
        }
    };

    let landing = role.landing_path();
    let under_landing =
        current_path == landing || current_path.starts_with(&format!("{}/", landing));

    if under_landing { None } else { Some(landing) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_visitors_are_sent_to_login() {
        assert_eq!(resolve_redirect(None, "/hr"), Some("/login"));
        assert_eq!(resolve_redirect(None, "/"), Some("/login"));
        assert_eq!(resolve_redirect(None, "/employee/profile"), Some("/login"));
    }

    #[test]
    fn login_page_is_acceptable_without_a_session() {
        assert_eq!(resolve_redirect(None, "/login"), None);
    }

    #[test]
    fn hr_on_the_login_page_lands_on_hr() {
        assert_eq!(resolve_redirect(Some(Role::Hr), "/login"), Some("/hr"));
    }

    #[test]
    fn authenticated_root_bounces_to_the_landing_page() {
        assert_eq!(resolve_redirect(Some(Role::Ceo), "/"), Some("/ceo"));
        assert_eq!(
            resolve_redirect(Some(Role::TeamLeader), "/"),
            Some("/team-leader")
        );
    }

    #[test]
    fn paths_under_the_landing_prefix_are_acceptable() {
        assert_eq!(resolve_redirect(Some(Role::Hr), "/hr"), None);
        assert_eq!(resolve_redirect(Some(Role::Hr), "/hr/leave"), None);
        assert_eq!(
            resolve_redirect(Some(Role::Employee), "/employee/attendance"),
            None
        );
    }

    #[test]
    fn foreign_areas_redirect_to_own_landing() {
        assert_eq!(resolve_redirect(Some(Role::Employee), "/hr"), Some("/employee"));
        assert_eq!(resolve_redirect(Some(Role::Hr), "/ceo"), Some("/hr"));
    }

    #[test]
    fn prefix_matching_respects_path_segments() {
        // "/hrx" is not inside "/hr"
        assert_eq!(resolve_redirect(Some(Role::Hr), "/hrx"), Some("/hr"));
    }
}
