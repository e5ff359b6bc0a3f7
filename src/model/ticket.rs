use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Ticket {
    pub id: u64,
    pub opened_by: u64,
    pub subject: String,
    pub body: String,
    #[schema(example = "normal")]
    pub priority: String,
    #[schema(example = "open")]
    pub status: String,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// closed is terminal; resolved tickets can be reopened or closed for
    /// good, in-progress ones can fall back to open.
    pub fn can_move_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, InProgress)
                | (Open, Closed)
                | (InProgress, Resolved)
                | (InProgress, Open)
                | (Resolved, Closed)
                | (Resolved, Open)
        )
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

#[cfg(test)]
mod tests {
    use super::TicketStatus::*;
    use super::*;
    use std::str::FromStr;

    #[test]
    fn lifecycle_edges() {
        assert!(Open.can_move_to(InProgress));
        assert!(Open.can_move_to(Closed));
        assert!(InProgress.can_move_to(Resolved));
        assert!(InProgress.can_move_to(Open));
        assert!(Resolved.can_move_to(Closed));
        assert!(Resolved.can_move_to(Open));
    }

    #[test]
    fn closed_is_terminal() {
        for next in [Open, InProgress, Resolved, Closed] {
            assert!(!Closed.can_move_to(next));
        }
    }

    #[test]
    fn no_shortcuts_past_triage() {
        assert!(!Open.can_move_to(Resolved));
        assert!(!InProgress.can_move_to(Closed));
    }

    #[test]
    fn priority_strings_round_trip() {
        assert_eq!(TicketPriority::Urgent.to_string(), "urgent");
        assert_eq!(TicketPriority::from_str("normal").unwrap(), TicketPriority::Normal);
        assert!(TicketPriority::from_str("asap").is_err());
    }
}
