use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::stored_object::StoredObject;
use actix_web::{HttpResponse, Responder, web};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::fs;
use std::path::PathBuf;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Target bucket: lowercase letters, digits, `-` and `_`
    #[schema(example = "avatars")]
    pub bucket: String,
    #[schema(example = "portrait.png")]
    pub file_name: String,
    #[schema(example = "image/png", nullable = true)]
    pub content_type: Option<String>,
    /// File bytes, standard base64
    #[schema(example = "iVBORw0KGgoAAAANSUhEUg==")]
    pub content_base64: String,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "avatars")]
    pub bucket: String,
    #[schema(example = "3d1f0e9a-5c2b-4f6d-9a33-8a51f0d6e2c1")]
    pub object_key: String,
    #[schema(example = "http://localhost:8080/files/avatars/3d1f0e9a-5c2b-4f6d-9a33-8a51f0d6e2c1")]
    pub public_url: String,
    #[schema(example = 20)]
    pub byte_size: u64,
}

fn valid_bucket(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

fn object_url(public_base_url: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/files/{}/{}",
        public_base_url.trim_end_matches('/'),
        bucket,
        key
    )
}

/// Upload an object into a bucket
#[utoipa::path(
    post,
    path = "/api/v1/files",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Object stored", body = UploadResponse),
        (status = 400, description = "Bad bucket name, bad base64, or size over the limit"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Storage"
)]
pub async fn upload(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<UploadRequest>,
) -> actix_web::Result<impl Responder> {
    if !valid_bucket(&payload.bucket) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Bucket must be 1-64 chars of lowercase letters, digits, - or _"
        })));
    }

    if payload.file_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "file_name is required"
        })));
    }

    let bytes = match STANDARD.decode(payload.content_base64.as_bytes()) {
        Ok(b) => b,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "content_base64 is not valid base64"
            })));
        }
    };

    if bytes.len() > config.max_upload_bytes {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("File exceeds the {} byte upload limit", config.max_upload_bytes)
        })));
    }

    let object_key = Uuid::new_v4().to_string();
    let byte_size = bytes.len() as u64;
    let content_type = payload
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let dir = PathBuf::from(&config.storage_root).join(&payload.bucket);
    let file_path = dir.join(&object_key);

    // filesystem writes run off the async workers
    web::block(move || {
        fs::create_dir_all(&dir)?;
        fs::write(&file_path, &bytes)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Blocking write was cancelled");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?
    .map_err(|e| {
        tracing::error!(error = %e, bucket = %payload.bucket, "Failed to write object");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query(
        r#"
        INSERT INTO stored_objects
            (bucket, object_key, file_name, content_type, byte_size, owner_user_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.bucket)
    .bind(&object_key)
    .bind(payload.file_name.trim())
    .bind(&content_type)
    .bind(byte_size)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, object_key = %object_key, "Failed to record object metadata");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let public_url = object_url(&config.public_base_url, &payload.bucket, &object_key);

    Ok(HttpResponse::Ok().json(UploadResponse {
        bucket: payload.bucket.clone(),
        object_key,
        public_url,
        byte_size,
    }))
}

/// Serve stored bytes; public, like a BaaS public bucket
#[utoipa::path(
    get,
    path = "/files/{bucket}/{key}",
    params(
        ("bucket", Path, description = "Bucket name"),
        ("key", Path, description = "Object key from the upload response")
    ),
    responses(
        (status = 200, description = "Object bytes with the stored content type"),
        (status = 404, description = "No such object"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Storage"
)]
pub async fn serve(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<(String, String)>,
) -> actix_web::Result<impl Responder> {
    let (bucket, key) = path.into_inner();

    // only keys recorded at upload time are ever read back; no path is
    // assembled from raw client input alone
    let object = sqlx::query_as::<_, StoredObject>(
        r#"
        SELECT id, bucket, object_key, file_name, content_type, byte_size, owner_user_id, created_at
        FROM stored_objects
        WHERE bucket = ? AND object_key = ?
        "#,
    )
    .bind(&bucket)
    .bind(&key)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, bucket = %bucket, key = %key, "Failed to look up object");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let object = match object {
        Some(o) => o,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "No such object"
            })));
        }
    };

    let full_path = PathBuf::from(&config.storage_root)
        .join(&object.bucket)
        .join(&object.object_key);

    let bytes = web::block(move || fs::read(full_path))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Blocking read was cancelled");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, key = %object.object_key, "Object file missing on disk");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok()
        .content_type(object.content_type.as_str())
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_names_are_constrained() {
        assert!(valid_bucket("avatars"));
        assert!(valid_bucket("report-2026_q1"));
        assert!(!valid_bucket(""));
        assert!(!valid_bucket("Mixed"));
        assert!(!valid_bucket("space bucket"));
        assert!(!valid_bucket("../escape"));
        assert!(!valid_bucket(&"a".repeat(65)));
    }

    #[test]
    fn public_url_joins_without_double_slashes() {
        assert_eq!(
            object_url("http://localhost:8080/", "avatars", "abc"),
            "http://localhost:8080/files/avatars/abc"
        );
        assert_eq!(
            object_url("https://cdn.example.com", "docs", "xyz"),
            "https://cdn.example.com/files/docs/xyz"
        );
    }
}
