use crate::auth::auth::AuthUser;
use crate::model::{department::Department, job_title::JobTitle};
use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;

/// Department lookup list (dashboard dropdowns)
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [Department]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Org"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let departments =
        sqlx::query_as::<_, Department>(r#"SELECT id, name FROM departments ORDER BY name"#)
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch departments");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Job title lookup list (dashboard dropdowns)
#[utoipa::path(
    get,
    path = "/api/v1/job-titles",
    responses(
        (status = 200, description = "All job titles", body = [JobTitle]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Org"
)]
pub async fn list_job_titles(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let titles = sqlx::query_as::<_, JobTitle>(r#"SELECT id, title FROM job_titles ORDER BY title"#)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch job titles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(titles))
}
