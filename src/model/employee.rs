use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "employee_code": "WD-0007",
        "first_name": "Amira",
        "last_name": "Haddad",
        "email": "amira.haddad@workdesk.io",
        "phone": "+31612345678",
        "department_id": 2,
        "job_title_id": 4,
        "hire_date": "2025-02-17",
        "status": "active"
    })
)]
pub struct Employee {
    pub id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(nullable = true)]
    pub phone: Option<String>,
    pub department_id: u64,
    pub job_title_id: u64,
    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,
    pub status: String,
}
