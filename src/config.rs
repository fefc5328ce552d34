use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub razorpay: RazorpayConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// "development" exposes internal error messages in responses.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Empty means any origin is accepted.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub max_login_attempts: i32,
    pub lock_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: 5,
            lock_minutes: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_razorpay_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_size: usize, // bytes
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub api_window_secs: u64,
    pub api_max_requests: u32,
    pub auth_window_secs: u64,
    pub auth_max_requests: u32,
    pub donation_window_secs: u64,
    pub donation_max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_window_secs: 15 * 60,
            api_max_requests: 100,
            auth_window_secs: 15 * 60,
            auth_max_requests: 10,
            donation_window_secs: 60,
            donation_max_requests: 5,
        }
    }
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_razorpay_api_base() -> String {
    "https://api.razorpay.com/v1".to_string()
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // A missing file is fine: everything can come from the environment.
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| anyhow::anyhow!("failed to parse {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL is not set and {config_path} was not found")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 5000u16),
                        environment: get_env("APP_ENV").unwrap_or_else(default_environment),
                        allowed_origins: get_env("ALLOWED_ORIGINS")
                            .map(|v| split_origins(&v))
                            .unwrap_or_default(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 86_400i64),
                    },
                    auth: AuthConfig::default(),
                    razorpay: RazorpayConfig {
                        key_id: get_env("RAZORPAY_KEY_ID").unwrap_or_default(),
                        key_secret: get_env("RAZORPAY_KEY_SECRET").unwrap_or_default(),
                        webhook_secret: get_env("RAZORPAY_WEBHOOK_SECRET").unwrap_or_default(),
                        currency: default_currency(),
                        api_base: get_env("RAZORPAY_API_BASE")
                            .unwrap_or_else(default_razorpay_api_base),
                    },
                    upload: UploadConfig::default(),
                    rate_limit: RateLimitConfig::default(),
                }
            }
            Err(e) => {
                return Err(anyhow::anyhow!("cannot read config file {config_path}: {e}"));
            }
        };

        // Environment variables win even when the file exists.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("APP_ENV") {
            config.server.environment = v;
        }
        if let Ok(v) = env::var("ALLOWED_ORIGINS") {
            config.server.allowed_origins = split_origins(&v);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("BCRYPT_COST")
            && let Ok(n) = v.parse()
        {
            config.auth.bcrypt_cost = n;
        }
        if let Ok(v) = env::var("RAZORPAY_KEY_ID") {
            config.razorpay.key_id = v;
        }
        if let Ok(v) = env::var("RAZORPAY_KEY_SECRET") {
            config.razorpay.key_secret = v;
        }
        if let Ok(v) = env::var("RAZORPAY_WEBHOOK_SECRET") {
            config.razorpay.webhook_secret = v;
        }
        if let Ok(v) = env::var("RAZORPAY_API_BASE") {
            config.razorpay.api_base = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_FILES")
            && let Ok(n) = v.parse()
        {
            config.upload.max_files = n;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_SIZE")
            && let Ok(n) = v.parse()
        {
            config.upload.max_file_size = n;
        }
        if let Ok(v) = env::var("RATE_LIMIT_ENABLED")
            && let Ok(b) = v.parse()
        {
            config.rate_limit.enabled = b;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_fills_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 5000

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [jwt]
            secret = "s"
            expires_in = 86400

            [razorpay]
            key_id = "rzp_test_key"
            key_secret = "secret"
            webhook_secret = "whsec"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.environment, "production");
        assert!(!config.server.is_development());
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.auth.max_login_attempts, 5);
        assert_eq!(config.auth.lock_minutes, 30);
        assert_eq!(config.upload.max_files, 10);
        assert_eq!(config.upload.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.razorpay.currency, "INR");
        assert_eq!(config.rate_limit.donation_max_requests, 5);
    }

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins("http://localhost:5173, https://example.org,,"),
            vec!["http://localhost:5173", "https://example.org"]
        );
    }
}
