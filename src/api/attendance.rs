use crate::auth::auth::AuthUser;
use crate::model::attendance::{
    self, AttendanceRecord, PunchAction, STATUS_PRESENT, format_hms,
};
use crate::utils::event_hub::{ChangeOp, EventHub};
use crate::utils::punch_gate::PunchGate;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// True while a session is open (punched in, not yet out)
    #[schema(example = true)]
    pub live: bool,
    #[schema(example = "2026-03-02T09:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub punch_in: Option<DateTime<Utc>>,
    #[schema(example = json!(null), value_type = String, format = "date-time", nullable = true)]
    pub punch_out: Option<DateTime<Utc>>,
    #[schema(example = 0)]
    pub accumulated_seconds: i64,
    #[schema(example = 14400)]
    pub current_total_seconds: i64,
    #[schema(example = "04:00:00")]
    pub current_total_hms: String,
}

impl TodayResponse {
    /// No row yet is a normal zeroed state, not an error.
    fn from_row(row: Option<AttendanceRecord>, today: NaiveDate, now: DateTime<Utc>) -> Self {
        match row {
            Some(rec) => {
                let total = rec.total_seconds(now);
                Self {
                    date: rec.date,
                    live: rec.is_open(),
                    punch_in: rec.punch_in,
                    punch_out: rec.punch_out,
                    accumulated_seconds: rec.accumulated_seconds,
                    current_total_seconds: total,
                    current_total_hms: format_hms(total),
                }
            }
            None => Self {
                date: today,
                live: false,
                punch_in: None,
                punch_out: None,
                accumulated_seconds: 0,
                current_total_seconds: 0,
                current_total_hms: format_hms(0),
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PunchResponse {
    /// "opened" when the toggle started or resumed a session, "closed"
    /// when it ended one
    #[schema(example = "opened")]
    pub action: String,
    pub live: bool,
    #[schema(example = "2026-03-02T13:30:00Z", value_type = String, format = "date-time", nullable = true)]
    pub punch_in: Option<DateTime<Utc>>,
    #[schema(example = json!(null), value_type = String, format = "date-time", nullable = true)]
    pub punch_out: Option<DateTime<Utc>>,
    #[schema(example = 14400)]
    pub accumulated_seconds: i64,
    #[schema(example = 14400)]
    pub current_total_seconds: i64,
    #[schema(example = "04:00:00")]
    pub current_total_hms: String,
}

async fn fetch_today(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, punch_in, punch_out, accumulated_seconds, status
        FROM attendance
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// Current day's attendance state for the signed-in employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Today's record, zeroed when none exists yet", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = Utc::now();
    let today = now.date_naive();

    let row = fetch_today(pool.get_ref(), employee_id, today)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to load today's attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(TodayResponse::from_row(row, today, now)))
}

/// Punch toggle: opens a session, closes the open one, or reopens a
/// closed day. Exactly one database write per call.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/punch",
    responses(
        (status = 200, description = "Toggle applied", body = PunchResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "A punch is already in flight", body = Object, example = json!({
            "message": "A punch is already in progress"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn punch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    hub: web::Data<EventHub>,
    gate: web::Data<PunchGate>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    // a second toggle while one is mid-flight is refused, not queued
    let _permit = match gate.acquire(employee_id) {
        Some(permit) => permit,
        None => {
            return Ok(HttpResponse::Conflict().json(serde_json::json!({
                "message": "A punch is already in progress"
            })));
        }
    };

    let now = Utc::now();
    let today = now.date_naive();

    let row = fetch_today(pool.get_ref(), employee_id, today)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to load today's attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match attendance::next_action(row.as_ref(), now) {
        PunchAction::Start => {
            let result = sqlx::query(
                r#"
                INSERT INTO attendance (employee_id, date, punch_in, accumulated_seconds, status)
                VALUES (?, ?, ?, 0, ?)
                "#,
            )
            .bind(employee_id)
            .bind(today)
            .bind(now)
            .bind(STATUS_PRESENT)
            .execute(pool.get_ref())
            .await;

            match result {
                Ok(res) => {
                    hub.publish_change("attendance", ChangeOp::Insert, res.last_insert_id());
                    Ok(HttpResponse::Ok().json(PunchResponse {
                        action: "opened".to_string(),
                        live: true,
                        punch_in: Some(now),
                        punch_out: None,
                        accumulated_seconds: 0,
                        current_total_seconds: 0,
                        current_total_hms: format_hms(0),
                    }))
                }
                Err(e) => {
                    // two racing first punches of the day hit the unique key
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.code().as_deref() == Some("23000") {
                            return Ok(HttpResponse::Conflict().json(serde_json::json!({
                                "message": "Attendance already recorded for today, retry"
                            })));
                        }
                    }

                    tracing::error!(error = %e, employee_id, "Punch-in failed");
                    Err(actix_web::error::ErrorInternalServerError(
                        "Internal Server Error",
                    ))
                }
            }
        }

        PunchAction::Reopen => {
            // row is Some here: Reopen is only derived from an existing record
            let rec = row.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            sqlx::query(
                r#"
                UPDATE attendance
                SET punch_in = ?, punch_out = NULL
                WHERE id = ?
                "#,
            )
            .bind(now)
            .bind(rec.id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id, "Punch reopen failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            hub.publish_change("attendance", ChangeOp::Update, rec.id);

            Ok(HttpResponse::Ok().json(PunchResponse {
                action: "opened".to_string(),
                live: true,
                punch_in: Some(now),
                punch_out: None,
                accumulated_seconds: rec.accumulated_seconds,
                current_total_seconds: rec.accumulated_seconds,
                current_total_hms: format_hms(rec.accumulated_seconds),
            }))
        }

        PunchAction::Close { session_seconds } => {
            let rec = row.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            let result = sqlx::query(
                r#"
                UPDATE attendance
                SET accumulated_seconds = accumulated_seconds + ?, punch_out = ?
                WHERE id = ? AND punch_out IS NULL
                "#,
            )
            .bind(session_seconds)
            .bind(now)
            .bind(rec.id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id, "Punch-out failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            // the punch_out IS NULL clause keeps a lost race from closing twice
            if result.rows_affected() == 0 {
                return Ok(HttpResponse::Conflict().json(serde_json::json!({
                    "message": "Session already closed, reload"
                })));
            }

            hub.publish_change("attendance", ChangeOp::Update, rec.id);

            let total = rec.accumulated_seconds + session_seconds;
            Ok(HttpResponse::Ok().json(PunchResponse {
                action: "closed".to_string(),
                live: false,
                punch_in: rec.punch_in,
                punch_out: Some(now),
                accumulated_seconds: total,
                current_total_seconds: total,
                current_total_hms: format_hms(total),
            }))
        }
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    #[schema(example = 7)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    /// Records on or after this date
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-03-31", value_type = String, format = "date")]
    /// Records on or before this date
    pub to: Option<NaiveDate>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Paginated attendance table for the HR dashboard
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_ceo()?;

    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND date <= ?");
        args.push(FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count attendance records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, punch_in, punch_out, accumulated_seconds, status
        FROM attendance
        {}
        ORDER BY date DESC, employee_id ASC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    /// First day of the span (defaults to the 1st of the current month)
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-03-31", value_type = String, format = "date")]
    /// Last day of the span (defaults to today)
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(example = "2026-03-31", value_type = String, format = "date")]
    pub to: NaiveDate,
    #[schema(example = 18)]
    pub days_present: u32,
    #[schema(example = 518400)]
    pub total_seconds: i64,
    #[schema(example = "144:00:00")]
    pub total_hms: String,
}

/// Attendance totals over a date span, re-derived per request
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Totals for the signed-in employee", body = SummaryResponse),
        (status = 400, description = "Bad date span"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = Utc::now();
    let today = now.date_naive();

    let to = query.to.unwrap_or(today);
    let from = query.from.unwrap_or_else(|| to.with_day(1).unwrap_or(to));

    if from > to {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "from cannot be after to"
        })));
    }

    let rows = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, punch_in, punch_out, accumulated_seconds, status
        FROM attendance
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        "#,
    )
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch attendance summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // live elapsed time counts only for today's open row; a stale open
    // row from an earlier day contributes its accumulated seconds alone
    let total_seconds: i64 = rows
        .iter()
        .map(|rec| {
            if rec.date == today {
                rec.total_seconds(now)
            } else {
                rec.accumulated_seconds
            }
        })
        .sum();

    Ok(HttpResponse::Ok().json(SummaryResponse {
        from,
        to,
        days_present: rows.len() as u32,
        total_seconds,
        total_hms: format_hms(total_seconds),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn missing_row_renders_a_zeroed_closed_day() {
        let resp = TodayResponse::from_row(None, day(), at(9, 0));
        assert!(!resp.live);
        assert_eq!(resp.current_total_seconds, 0);
        assert_eq!(resp.current_total_hms, "00:00:00");
        assert!(resp.punch_in.is_none());
    }

    #[test]
    fn open_row_renders_live_with_running_total() {
        let rec = AttendanceRecord {
            id: 1,
            employee_id: 7,
            date: day(),
            punch_in: Some(at(13, 30)),
            punch_out: None,
            accumulated_seconds: 14400,
            status: STATUS_PRESENT.to_string(),
        };
        let resp = TodayResponse::from_row(Some(rec), day(), at(14, 0));
        assert!(resp.live);
        assert_eq!(resp.current_total_seconds, 16200);
        assert_eq!(resp.current_total_hms, "04:30:00");
    }

    #[test]
    fn closed_row_renders_fixed_total() {
        let rec = AttendanceRecord {
            id: 1,
            employee_id: 7,
            date: day(),
            punch_in: Some(at(9, 0)),
            punch_out: Some(at(13, 0)),
            accumulated_seconds: 14400,
            status: STATUS_PRESENT.to_string(),
        };
        let resp = TodayResponse::from_row(Some(rec), day(), at(18, 0));
        assert!(!resp.live);
        assert_eq!(resp.current_total_seconds, 14400);
    }
}
