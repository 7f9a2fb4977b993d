/// Centralized environment configuration.
/// All env vars and defaults are defined here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. Required.
    pub database_url: String,

    /// Socket address the HTTP server binds to.
    /// Default: 0.0.0.0:3000
    pub bind_addr: String,

    /// Page size used when a list request does not pass `page_size`.
    /// Default: 20
    pub default_page_size: i64,

    /// Upper bound for `page_size`; larger requests are clamped.
    /// Default: 100
    pub max_page_size: i64,
}

impl Config {
    /// Build config from environment variables.
    /// Returns an error if required vars are missing or numbers do not parse.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env")?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let default_page_size = std::env::var("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<i64>()
            .map_err(|_| "DEFAULT_PAGE_SIZE must be a positive integer")?;

        let max_page_size = std::env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<i64>()
            .map_err(|_| "MAX_PAGE_SIZE must be a positive integer")?;

        if default_page_size < 1 || max_page_size < default_page_size {
            return Err("page sizes must satisfy 1 <= DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE".to_string());
        }

        Ok(Self {
            database_url,
            bind_addr,
            default_page_size,
            max_page_size,
        })
    }

    /// Config for tests. Uses in-memory database URL and small pages.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}
