use crate::auth::auth::AuthUser;
use crate::model::task::{Task, TaskStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateTask {
    #[schema(example = 1)]
    pub project_id: u64,
    #[schema(example = "Wire up the scanner API")]
    pub title: String,
    #[schema(example = "Endpoint plus retries", nullable = true)]
    pub description: Option<String>,
    #[schema(example = 7, nullable = true)]
    pub assignee_employee_id: Option<u64>,
    #[schema(example = "2026-04-15", format = "date", value_type = String, nullable = true)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignTask {
    /// Employee to hand the task to; null clears the assignment
    #[schema(example = 7, nullable = true)]
    pub assignee_employee_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct MoveTask {
    #[schema(example = "in_progress")]
    pub status: TaskStatus,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TaskFilter {
    #[schema(example = 1)]
    /// Filter by project
    pub project_id: Option<u64>,
    #[schema(example = 7)]
    /// Filter by assignee
    pub assignee_employee_id: Option<u64>,
    #[schema(example = "todo")]
    /// Filter by status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, ToSchema)]
pub struct TaskListResponse {
    pub data: Vec<Task>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 4)]
    pub total: i64,
}

async fn fetch_task(pool: &MySqlPool, task_id: u64) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, project_id, title, description, assignee_employee_id, status, due_date
        FROM tasks
        WHERE id = ?
        "#,
    )
    .bind(task_id)
    .fetch_optional(pool)
    .await
}

/// Create Task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTask,
    responses(
        (status = 200, description = "Task created", body = Object, example = json!({
            "message": "Task created",
            "id": 11
        })),
        (status = 400, description = "Unknown project"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Task"
)]
pub async fn create_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTask>,
) -> actix_web::Result<impl Responder> {
    auth.require_lead_or_above()?;

    let result = sqlx::query(
        r#"
        INSERT INTO tasks
            (project_id, title, description, assignee_employee_id, due_date)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.project_id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.assignee_employee_id)
    .bind(payload.due_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Ok().json(json!({
            "message": "Task created",
            "id": res.last_insert_id()
        }))),
        Err(e) => {
            // FK failures (bad project/assignee) also land on 23000
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Unknown project or assignee"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to create task");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Paginated task list
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(TaskFilter),
    responses(
        (status = 200, description = "Paginated task list", body = TaskListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Task"
)]
pub async fn list_tasks(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TaskFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(project_id) = query.project_id {
        where_sql.push_str(" AND project_id = ?");
        args.push(FilterValue::U64(project_id));
    }

    if let Some(assignee) = query.assignee_employee_id {
        where_sql.push_str(" AND assignee_employee_id = ?");
        args.push(FilterValue::U64(assignee));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM tasks{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count tasks");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, project_id, title, description, assignee_employee_id, status, due_date
        FROM tasks
        {}
        ORDER BY id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Task>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let tasks = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch task list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(TaskListResponse {
        data: tasks,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Get Task by ID
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}",
    params(
        ("task_id", Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found", body = Object, example = json!({
            "message": "Task not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Task"
)]
pub async fn get_task(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();

    let task = fetch_task(pool.get_ref(), task_id).await.map_err(|e| {
        tracing::error!(error = %e, task_id, "Failed to fetch task");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match task {
        Some(t) => Ok(HttpResponse::Ok().json(t)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Task not found"
        }))),
    }
}

/// Assign (or unassign) a task
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{task_id}/assign",
    params(
        ("task_id", Path, description = "Task ID")
    ),
    request_body = AssignTask,
    responses(
        (status = 200, description = "Assignment updated", body = Object, example = json!({
            "message": "Task assigned"
        })),
        (status = 400, description = "Unknown assignee"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Task"
)]
pub async fn assign_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AssignTask>,
) -> actix_web::Result<impl Responder> {
    auth.require_lead_or_above()?;

    let task_id = path.into_inner();

    let result = sqlx::query(r#"UPDATE tasks SET assignee_employee_id = ? WHERE id = ?"#)
        .bind(payload.assignee_employee_id)
        .bind(task_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Task not found"
                })));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Task assigned"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Unknown assignee"
                    })));
                }
            }

            tracing::error!(error = %e, task_id, "Failed to assign task");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Move a task across the board, one column at a time
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{task_id}/status",
    params(
        ("task_id", Path, description = "Task ID")
    ),
    request_body = MoveTask,
    responses(
        (status = 200, description = "Status updated", body = Object, example = json!({
            "message": "Task moved",
            "status": "in_progress"
        })),
        (status = 400, description = "Transition not allowed", body = Object, example = json!({
            "message": "Cannot move task from todo to done"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Task not found"),
        (status = 409, description = "Task changed underneath"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Task"
)]
pub async fn task_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<MoveTask>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();

    let task = fetch_task(pool.get_ref(), task_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, task_id, "Failed to fetch task");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Task not found"))?;

    // plain employees may only move tasks assigned to them
    if auth.is_employee()
        && (auth.employee_id.is_none() || task.assignee_employee_id != auth.employee_id)
    {
        return Err(actix_web::error::ErrorForbidden("Not your task"));
    }

    let current = TaskStatus::from_str(&task.status).map_err(|_| {
        tracing::error!(task_id, status = %task.status, "Task row holds an unknown status");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let next = payload.status;
    if !current.can_move_to(next) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("Cannot move task from {} to {}", current, next)
        })));
    }

    // re-checking the old status keeps a stale board from double-moving
    let result = sqlx::query(r#"UPDATE tasks SET status = ? WHERE id = ? AND status = ?"#)
        .bind(next.to_string())
        .bind(task_id)
        .bind(&task.status)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, task_id, "Failed to move task");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Task changed underneath, reload"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task moved",
        "status": next.to_string()
    })))
}
