//! Server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Signing secret used when `JWT_SECRET` is unset. Only fit for development.
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// HS256 secret for session tokens.
    pub jwt_secret: String,
    /// Directory holding note attachments.
    pub upload_dir: PathBuf,
    /// Bound of the request log queue.
    pub request_log_queue_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 8080)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `JWT_SECRET`: Token signing secret (default: insecure development value)
    /// - `UPLOAD_DIR`: Attachment directory (default: "./uploads")
    /// - `REQUEST_LOG_QUEUE_CAPACITY`: Pending request log records (default: 1024)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_var(&lookup, "PORT", 8080u16)?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./uploads"));

        let request_log_queue_capacity = parse_var(&lookup, "REQUEST_LOG_QUEUE_CAPACITY", 1024usize)?;
        if request_log_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_LOG_QUEUE_CAPACITY".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            jwt_secret,
            upload_dir,
            request_log_queue_capacity,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Whether the token secret is still the development default.
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &"<redacted>")
            .field("upload_dir", &self.upload_dir)
            .field("request_log_queue_capacity", &self.request_log_queue_capacity)
            .finish()
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("cannot parse {:?}", raw),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cors_allowed_origins, "*");
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.request_log_queue_capacity, 1024);
        assert!(config.uses_default_jwt_secret());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("UPLOAD_DIR", "/var/lib/notes"),
            ("REQUEST_LOG_QUEUE_CAPACITY", "16"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(!config.uses_default_jwt_secret());
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/notes"));
        assert_eq!(config.request_log_queue_capacity, 16);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "PORT"));

        assert!(load(&[("REQUEST_LOG_QUEUE_CAPACITY", "0")]).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = load(&[("JWT_SECRET", "hunter2")]).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
