/// Maximum number of items returned by the friend activity feed.
pub const FEED_LIMIT: i64 = 10;

/// Number of entries listed under "top rated" in entry stats.
pub const TOP_RATED_LIMIT: usize = 6;

pub const PROFILE_SEARCH_LIMIT: i64 = 20;

pub const PROFILE_CACHE_TTL: usize = 3600;

/// Role the identity provider puts in tokens of signed-in users.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

pub struct Env {
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
}

fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = optional_var("DATABASE_URL");
        if database_url.is_none() {
            log::warn!("DATABASE_URL is not set, data store will be unavailable");
        }

        let redis_url = optional_var("REDIS_URL");
        if redis_url.is_none() {
            log::warn!("REDIS_URL is not set, profile cache disabled");
        }

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");

        Env { jwt_secret, database_url, redis_url, frontend_url, ip, port, workers }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
