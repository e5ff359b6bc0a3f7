use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value enum
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// SQL update container
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Build a dynamic UPDATE from a partial JSON payload. Only keys named in
/// `allowed` may appear; payload keys never reach the SQL text unchecked.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ErrorBadRequest(format!("Unknown field: {}", key)));
        }
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// Execute the update
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EMPLOYEE_COLS: &[&str] = &["first_name", "status", "hire_date"];

    #[test]
    fn builds_set_clause_and_trailing_id_bind() {
        let payload = json!({ "first_name": "Amira", "status": "active" });
        let update =
            build_update_sql("employees", &payload, EMPLOYEE_COLS, "id", 7).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employees SET first_name = ?, status = ? WHERE id = ?"
        );
        assert_eq!(update.values.len(), 3);
        assert_eq!(update.values[2], SqlValue::I64(7));
    }

    #[test]
    fn date_strings_bind_as_dates() {
        let payload = json!({ "hire_date": "2025-02-17" });
        let update =
            build_update_sql("employees", &payload, EMPLOYEE_COLS, "id", 1).unwrap();

        assert_eq!(
            update.values[0],
            SqlValue::Date(NaiveDate::from_ymd_opt(2025, 2, 17).unwrap())
        );
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let payload = json!({ "password": "oops" });
        assert!(build_update_sql("employees", &payload, EMPLOYEE_COLS, "id", 1).is_err());
    }

    #[test]
    fn hostile_keys_never_reach_the_sql() {
        let payload = json!({ "status = 'x' WHERE 1=1; --": "y" });
        assert!(build_update_sql("employees", &payload, EMPLOYEE_COLS, "id", 1).is_err());
    }

    #[test]
    fn empty_and_non_object_payloads_are_rejected() {
        assert!(build_update_sql("employees", &json!({}), EMPLOYEE_COLS, "id", 1).is_err());
        assert!(build_update_sql("employees", &json!([1, 2]), EMPLOYEE_COLS, "id", 1).is_err());
    }

    #[test]
    fn nested_values_are_rejected() {
        let payload = json!({ "status": { "nested": true } });
        assert!(build_update_sql("employees", &payload, EMPLOYEE_COLS, "id", 1).is_err());
    }

    #[test]
    fn null_clears_a_column() {
        let payload = json!({ "status": null });
        let update =
            build_update_sql("employees", &payload, EMPLOYEE_COLS, "id", 3).unwrap();
        assert_eq!(update.values[0], SqlValue::Null);
    }
}
