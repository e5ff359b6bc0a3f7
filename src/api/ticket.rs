use crate::auth::auth::AuthUser;
use crate::model::role::Role;
use crate::model::ticket::{Ticket, TicketPriority, TicketStatus};
use crate::utils::event_hub::{ChangeOp, EventHub};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateTicket {
    #[schema(example = "Badge reader offline")]
    pub subject: String,
    #[schema(example = "The reader at the east entrance stopped accepting badges this morning.")]
    pub body: String,
    #[schema(example = "high")]
    pub priority: Option<TicketPriority>,
}

#[derive(Deserialize, ToSchema)]
pub struct MoveTicket {
    #[schema(example = "in_progress")]
    pub status: TicketStatus,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TicketFilter {
    #[schema(example = "open")]
    /// Filter by status
    pub status: Option<String>,
    #[schema(example = "high")]
    /// Filter by priority
    pub priority: Option<String>,
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
pub struct TicketListResponse {
    pub data: Vec<Ticket>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

/// Open a support ticket
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicket,
    responses(
        (status = 200, description = "Ticket opened", body = Object, example = json!({
            "message": "Ticket opened",
            "id": 3
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Ticket"
)]
pub async fn create_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    hub: web::Data<EventHub>,
    payload: web::Json<CreateTicket>,
) -> actix_web::Result<impl Responder> {
    if payload.subject.trim().is_empty() || payload.body.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Subject and body are required"
        })));
    }

    let priority = payload.priority.unwrap_or(TicketPriority::Normal);

    let result = sqlx::query(
        r#"
        INSERT INTO tickets (opened_by, subject, body, priority)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.subject.trim())
    .bind(payload.body.trim())
    .bind(priority.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to open ticket");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let ticket_id = result.last_insert_id();
    hub.publish_change("tickets", ChangeOp::Insert, ticket_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Ticket opened",
        "id": ticket_id
    })))
}

/// Paginated ticket list; non-HR callers see only their own tickets
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    params(TicketFilter),
    responses(
        (status = 200, description = "Paginated ticket list", body = TicketListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Ticket"
)]
pub async fn list_tickets(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TicketFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if !matches!(auth.role, Role::Ceo | Role::Hr) {
        where_sql.push_str(" AND opened_by = ?");
        args.push(FilterValue::U64(auth.user_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    if let Some(priority) = query.priority.as_deref() {
        where_sql.push_str(" AND priority = ?");
        args.push(FilterValue::Str(priority));
    }

    let count_sql = format!("SELECT COUNT(*) FROM tickets{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count tickets");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, opened_by, subject, body, priority, status, created_at, updated_at
        FROM tickets
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Ticket>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let tickets = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch ticket list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(TicketListResponse {
        data: tickets,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Fetch one ticket (HR/CEO, or its opener)
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{ticket_id}",
    params(
        ("ticket_id", Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket found", body = Ticket),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found", body = Object, example = json!({
            "message": "Ticket not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Ticket"
)]
pub async fn get_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ticket_id = path.into_inner();

    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        SELECT id, opened_by, subject, body, priority, status, created_at, updated_at
        FROM tickets
        WHERE id = ?
        "#,
    )
    .bind(ticket_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Failed to fetch ticket");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match ticket {
        Some(t) => {
            // openers see their own; existence is not leaked to anyone else
            let is_hr = matches!(auth.role, Role::Ceo | Role::Hr);
            if !is_hr && t.opened_by != auth.user_id {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Ticket not found"
                })));
            }
            Ok(HttpResponse::Ok().json(t))
        }
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Ticket not found"
        }))),
    }
}

/// Move a ticket through its lifecycle (HR/CEO)
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{ticket_id}/status",
    params(
        ("ticket_id", Path, description = "Ticket ID")
    ),
    request_body = MoveTicket,
    responses(
        (status = 200, description = "Status updated", body = Object, example = json!({
            "message": "Ticket moved",
            "status": "in_progress"
        })),
        (status = 400, description = "Transition not allowed", body = Object, example = json!({
            "message": "Cannot move ticket from closed to open"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket changed underneath"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Ticket"
)]
pub async fn ticket_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    hub: web::Data<EventHub>,
    path: web::Path<u64>,
    payload: web::Json<MoveTicket>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_ceo()?;

    let ticket_id = path.into_inner();

    let current_status =
        sqlx::query_scalar::<_, String>(r#"SELECT status FROM tickets WHERE id = ?"#)
            .bind(ticket_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, ticket_id, "Failed to fetch ticket status");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?
            .ok_or_else(|| actix_web::error::ErrorNotFound("Ticket not found"))?;

    let current = TicketStatus::from_str(&current_status).map_err(|_| {
        tracing::error!(ticket_id, status = %current_status, "Ticket row holds an unknown status");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let next = payload.status;
    if !current.can_move_to(next) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("Cannot move ticket from {} to {}", current, next)
        })));
    }

    let result = sqlx::query(r#"UPDATE tickets SET status = ? WHERE id = ? AND status = ?"#)
        .bind(next.to_string())
        .bind(ticket_id)
        .bind(&current_status)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, ticket_id, "Failed to move ticket");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Ticket changed underneath, reload"
        })));
    }

    hub.publish_change("tickets", ChangeOp::Update, ticket_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Ticket moved",
        "status": next.to_string()
    })))
}
