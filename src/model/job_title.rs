use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct JobTitle {
    #[schema(example = 4)]
    pub id: u64,
    #[schema(example = "Backend Engineer")]
    pub title: String,
}
