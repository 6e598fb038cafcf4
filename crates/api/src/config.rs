use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Credentials accepted by the login endpoint.
    pub auth: AuthConfig,
    /// Per-kind sampling cadence.
    pub sampling: SamplingConfig,
    /// Seconds between a consumer session's full snapshot refetches.
    pub refetch_interval_secs: u64,
}

/// The single configured consumer account (the original system has exactly
/// one device operator account).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

/// Sampling period per sensor kind. Kinds differ in acquisition cost, so
/// each gets its own timer.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    pub cpu_temp_interval: Duration,
    pub cpu_load_interval: Duration,
    pub memory_interval: Duration,
}

/// Default CPU temperature sampling period.
const DEFAULT_CPU_TEMP_INTERVAL_SECS: u64 = 5;
/// Default CPU load sampling period (`top`-style acquisition is slower).
const DEFAULT_CPU_LOAD_INTERVAL_SECS: u64 = 10;
/// Default memory sampling period.
const DEFAULT_MEMORY_INTERVAL_SECS: u64 = 15;
/// Default consumer-session refetch period.
const DEFAULT_REFETCH_INTERVAL_SECS: u64 = 60;

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Required | Default                 |
    /// |---------------------------|----------|-------------------------|
    /// | `HOST`                    | no       | `0.0.0.0`               |
    /// | `PORT`                    | no       | `3000`                  |
    /// | `CORS_ORIGINS`            | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | no       | `30`                    |
    /// | `JWT_SECRET`              | **yes**  | --                      |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | no       | `60`                    |
    /// | `API_USERNAME`            | **yes**  | --                      |
    /// | `API_PASSWORD`            | **yes**  | --                      |
    /// | `CPU_TEMP_INTERVAL_SECS`  | no       | `5`                     |
    /// | `CPU_LOAD_INTERVAL_SECS`  | no       | `10`                    |
    /// | `MEMORY_INTERVAL_SECS`    | no       | `15`                    |
    /// | `REFETCH_INTERVAL_SECS`   | no       | `60`                    |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a value fails to parse --
    /// misconfiguration should fail fast at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_u64("REQUEST_TIMEOUT_SECS", 30);

        let jwt = JwtConfig::from_env();

        let auth = AuthConfig {
            username: std::env::var("API_USERNAME")
                .expect("API_USERNAME must be set in the environment"),
            password: std::env::var("API_PASSWORD")
                .expect("API_PASSWORD must be set in the environment"),
        };

        let sampling = SamplingConfig {
            cpu_temp_interval: Duration::from_secs(env_u64(
                "CPU_TEMP_INTERVAL_SECS",
                DEFAULT_CPU_TEMP_INTERVAL_SECS,
            )),
            cpu_load_interval: Duration::from_secs(env_u64(
                "CPU_LOAD_INTERVAL_SECS",
                DEFAULT_CPU_LOAD_INTERVAL_SECS,
            )),
            memory_interval: Duration::from_secs(env_u64(
                "MEMORY_INTERVAL_SECS",
                DEFAULT_MEMORY_INTERVAL_SECS,
            )),
        };

        let refetch_interval_secs =
            env_u64("REFETCH_INTERVAL_SECS", DEFAULT_REFETCH_INTERVAL_SECS);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            auth,
            sampling,
            refetch_interval_secs,
        }
    }
}

/// Read a u64 env var with a default.
fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .map(|v| v.parse().unwrap_or_else(|_| panic!("{name} must be a valid u64")))
        .unwrap_or(default)
}
