use std::env;

/// Environment-driven server configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub upload_dir: String,
    pub upload_base_url: String,
    pub seed_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://usof.db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            upload_base_url: env::var("UPLOAD_BASE_URL").unwrap_or_else(|_| "/uploads".to_string()),
            seed_on_startup: env::var("SEED_ON_STARTUP")
                .map(|raw| raw == "1" || raw.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
        }
    }
}
