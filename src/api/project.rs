use crate::{
    auth::auth::AuthUser,
    model::project::{Project, ProjectStatus},
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

/// Columns a partial project update may touch.
const PROJECT_UPDATE_COLUMNS: &[&str] = &[
    "name",
    "description",
    "lead_employee_id",
    "status",
    "start_date",
    "end_date",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateProject {
    #[schema(example = "Warehouse rollout")]
    pub name: String,
    #[schema(example = "Phase one of the scanner rollout", nullable = true)]
    pub description: Option<String>,
    #[schema(example = 7, nullable = true)]
    pub lead_employee_id: Option<u64>,
    #[schema(example = "planned")]
    pub status: Option<ProjectStatus>,
    #[schema(example = "2026-04-01", format = "date", value_type = String, nullable = true)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-09-30", format = "date", value_type = String, nullable = true)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ProjectFilter {
    #[schema(example = "active")]
    /// Filter by project status
    pub status: Option<String>,
    #[schema(example = "rollout")]
    /// Search by project name
    pub search: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "name": "Warehouse rollout",
            "description": "Phase one of the scanner rollout",
            "lead_employee_id": 7,
            "status": "active",
            "start_date": "2026-04-01",
            "end_date": "2026-09-30"
        }
    ],
    "page": 1,
    "per_page": 10,
    "total": 1
}))]
pub struct ProjectListResponse {
    pub data: Vec<Project>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Create Project
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProject,
    responses(
        (status = 200, description = "Project created", body = Object, example = json!({
            "message": "Project created",
            "id": 1
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn create_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateProject>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_ceo()?;

    let status = payload.status.unwrap_or(ProjectStatus::Planned);

    let result = sqlx::query(
        r#"
        INSERT INTO projects
            (name, description, lead_employee_id, status, start_date, end_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.lead_employee_id)
    .bind(status.to_string())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create project");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Project created",
        "id": result.last_insert_id()
    })))
}

/// Paginated project list
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(ProjectFilter),
    responses(
        (status = 200, description = "Paginated project list", body = ProjectListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn list_projects(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ProjectFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<String> = Vec::new();

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(status.to_string());
    }

    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(" AND name LIKE ?");
        args.push(format!("%{}%", search));
    }

    let count_sql = format!("SELECT COUNT(*) FROM projects{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = count_q.bind(arg);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count projects");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, name, description, lead_employee_id, status, start_date, end_date
        FROM projects
        {}
        ORDER BY id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Project>(&data_sql);
    for arg in args {
        data_q = data_q.bind(arg);
    }

    let projects = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch project list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(ProjectListResponse {
        data: projects,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Get Project by ID
#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found", body = Object, example = json!({
            "message": "Project not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn get_project(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let project_id = path.into_inner();

    let project = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, name, description, lead_employee_id, status, start_date, end_date
        FROM projects
        WHERE id = ?
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, project_id, "Failed to fetch project");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match project {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Project not found"
        }))),
    }
}

/// Update Project
#[utoipa::path(
    put,
    path = "/api/v1/projects/{project_id}",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Project updated", body = Object, example = json!({
            "message": "Project updated"
        })),
        (status = 400, description = "Unknown or missing fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn update_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_ceo()?;

    let project_id = path.into_inner();

    let update = build_update_sql("projects", &body, PROJECT_UPDATE_COLUMNS, "id", project_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, project_id, "Failed to update project");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Project not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Project updated"
    })))
}

/// Delete Project
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Project"
)]
pub async fn delete_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_ceo()?;

    let project_id = path.into_inner();

    let result = sqlx::query(r#"DELETE FROM projects WHERE id = ?"#)
        .bind(project_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, project_id, "Failed to delete project");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Project not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
