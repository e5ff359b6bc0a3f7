#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Ceo = 1,
    Hr = 2,
    TeamLeader = 3,
    Employee = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Ceo),
            2 => Some(Role::Hr),
            3 => Some(Role::TeamLeader),
            4 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Landing page each role is sent to after sign-in (and whenever the
    /// guard finds them somewhere they should not be).
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Ceo => "/ceo",
            Role::Hr => "/hr",
            Role::TeamLeader => "/team-leader",
            Role::Employee => "/employee",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for id in 1u8..=4 {
            let role = Role::from_id(id).unwrap();
            assert_eq!(role as u8, id);
        }
        assert!(Role::from_id(0).is_none());
        assert!(Role::from_id(5).is_none());
    }

    #[test]
    fn every_role_has_a_landing_page() {
        assert_eq!(Role::Ceo.landing_path(), "/ceo");
        assert_eq!(Role::Hr.landing_path(), "/hr");
        assert_eq!(Role::TeamLeader.landing_path(), "/team-leader");
        assert_eq!(Role::Employee.landing_path(), "/employee");
    }
}
