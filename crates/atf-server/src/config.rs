//! Application configuration.
//!
//! Assembled from the environment once at startup (a `.env` file is loaded
//! first for local development) and passed into the components explicitly.
//! Nothing here mutates after startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use atf_gateway::GatewayConfig;
use atf_token::{KmsConfig, TokenConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Development mode embeds error detail in the service-unavailable page.
    #[serde(default)]
    pub development: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn env_var(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{name} must be set"))
}

fn env_var_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Reads the configuration from the environment.
    pub fn from_env() -> Result<Self, String> {
        let mut server = ServerConfig::default();
        if let Some(host) = env_var_opt("HOST") {
            server.host = host;
        }
        if let Some(port) = env_var_opt("PORT") {
            server.port = port
                .parse()
                .map_err(|_| format!("PORT must be a port number, got '{port}'"))?;
        }

        let kms = match (env_var_opt("KMS_KEY_ID"), env_var_opt("AWS_ENDPOINT")) {
            (Some(key_id), Some(endpoint)) => Some(KmsConfig { endpoint, key_id }),
            (None, None) => None,
            _ => {
                return Err("KMS_KEY_ID and AWS_ENDPOINT must be set together".into());
            }
        };

        let mut token = TokenConfig {
            jwt_secret: env_var("JWT_SECRET")?,
            generate_token_url: env_var("GENERATE_TOKEN_URL")?,
            kms,
            ..TokenConfig::default()
        };

        let mut gateway = GatewayConfig {
            read_base_url: env_var("API_BASE_URL_READ")?,
            write_base_url: env_var("API_BASE_URL_WRITE")?,
            table_name: env_var("DYNAMODB_ATF_TABLE_NAME")?,
            ..GatewayConfig::default()
        };

        if let Some(timeout) = env_var_opt("REQUEST_TIMEOUT_MS") {
            let timeout_ms: u64 = timeout
                .parse()
                .map_err(|_| format!("REQUEST_TIMEOUT_MS must be milliseconds, got '{timeout}'"))?;
            token.request_timeout_ms = timeout_ms;
            gateway.request_timeout_ms = timeout_ms;
        }

        let mut logging = LoggingConfig::default();
        if let Some(level) = env_var_opt("LOG_LEVEL") {
            logging.level = level;
        }

        let development = env_var_opt("APP_ENV").as_deref() == Some("development");

        Ok(Self {
            server,
            token,
            gateway,
            logging,
            development,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let level = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&level.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.token.validate()?;
        self.gateway.validate()?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            token: TokenConfig {
                jwt_secret: "secret".to_string(),
                generate_token_url: "http://issuer.local/generate-token".to_string(),
                ..TokenConfig::default()
            },
            gateway: GatewayConfig {
                read_base_url: "http://api.local".to_string(),
                write_base_url: "http://api.local".to_string(),
                table_name: "atf".to_string(),
                ..GatewayConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn default_config_with_endpoints_validates() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn rejects_zero_port_and_bad_log_level() {
        let mut cfg = valid_config();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = valid_config();
        cfg.logging.level = "verbose".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn surfaces_component_validation_failures() {
        let mut cfg = valid_config();
        cfg.gateway.table_name.clear();
        assert!(cfg.validate().unwrap_err().contains("table_name"));
    }

    #[test]
    fn addr_combines_host_and_port() {
        let mut cfg = valid_config();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 8080;
        assert_eq!(cfg.addr().to_string(), "127.0.0.1:8080");
    }
}
