//! Server configuration module

use serde::{Deserialize, Serialize};

use super::{non_empty, parse_or};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    pub workers: usize,

    /// Comma separated list of allowed CORS origins, `*` allows any
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0,
            allowed_origins: vec![String::from("*")],
        }
    }
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: non_empty(lookup, "SERVER_HOST").unwrap_or(defaults.host),
            port: parse_or(lookup, "SERVER_PORT", defaults.port),
            workers: parse_or(lookup, "SERVER_WORKERS", defaults.workers),
            allowed_origins: non_empty(lookup, "CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
        }
    }

    /// Get the socket address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_are_split() {
        let lookup = |key: &str| match key {
            "CORS_ALLOWED_ORIGINS" => Some("https://a.example, https://b.example".to_string()),
            "SERVER_PORT" => Some("9000".to_string()),
            _ => None,
        };
        let config = ServerConfig::from_lookup(&lookup);
        assert_eq!(config.allowed_origins.len(), 2);
        assert!(!config.allows_any_origin());
        assert_eq!(config.address(), "0.0.0.0:9000");
    }
}
