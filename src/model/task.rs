use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Task {
    pub id: u64,
    pub project_id: u64,
    pub title: String,
    #[schema(nullable = true)]
    pub description: Option<String>,
    #[schema(nullable = true)]
    pub assignee_employee_id: Option<u64>,
    #[schema(example = "todo")]
    pub status: String,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub due_date: Option<NaiveDate>,
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Boards move tasks one column at a time; a finished task goes back
    /// through in_progress rather than jumping straight to todo.
    pub fn can_move_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Todo, InProgress) | (InProgress, Done) | (InProgress, Todo) | (Done, InProgress)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStatus::*;
    use super::*;
    use std::str::FromStr;

    #[test]
    fn adjacent_moves_are_allowed() {
        assert!(Todo.can_move_to(InProgress));
        assert!(InProgress.can_move_to(Done));
        assert!(InProgress.can_move_to(Todo));
        assert!(Done.can_move_to(InProgress));
    }

    #[test]
    fn skipping_and_self_moves_are_rejected() {
        assert!(!Todo.can_move_to(Done));
        assert!(!Done.can_move_to(Todo));
        assert!(!Todo.can_move_to(Todo));
        assert!(!InProgress.can_move_to(InProgress));
        assert!(!Done.can_move_to(Done));
    }

    #[test]
    fn status_strings_match_the_schema() {
        assert_eq!(InProgress.to_string(), "in_progress");
        assert_eq!(TaskStatus::from_str("todo").unwrap(), Todo);
        assert_eq!(TaskStatus::from_str("done").unwrap(), Done);
        assert!(TaskStatus::from_str("archived").is_err());
    }
}
