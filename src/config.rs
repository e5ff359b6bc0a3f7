use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,
    pub reset_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Object storage
    pub storage_root: String,
    pub public_base_url: String,
    pub max_upload_bytes: usize,

    // Yearly leave allowances (days)
    pub leave_annual_days: i64,
    pub leave_sick_days: i64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: &str) -> T
where
    T::Err: std::fmt::Debug,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|e| panic!("{} is not valid: {:?}", key, e))
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env_or("ACCESS_TOKEN_TTL", "900"), // 15 min
            refresh_token_ttl: env_or("REFRESH_TOKEN_TTL", "604800"), // 7 days
            reset_token_ttl: env_or("RESET_TOKEN_TTL", "1800"), // 30 min

            rate_login_per_min: env_or("RATE_LOGIN_PER_MIN", "60"),
            rate_register_per_min: env_or("RATE_REGISTER_PER_MIN", "30"),
            rate_refresh_per_min: env_or("RATE_REFRESH_PER_MIN", "30"),
            rate_protected_per_min: env_or("RATE_PROTECTED_PER_MIN", "1000"),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", "10485760"), // 10 MiB

            leave_annual_days: env_or("LEAVE_ANNUAL_DAYS", "20"),
            leave_sick_days: env_or("LEAVE_SICK_DAYS", "10"),
        }
    }
}
