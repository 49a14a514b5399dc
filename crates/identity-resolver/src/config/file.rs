//! TOML configuration file loading

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::builder::ConfigBuilder;
use crate::Result;

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./identity-resolver.toml",
    "~/.config/identity-resolver/config.toml",
    "/etc/identity-resolver/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    apply_file_config(builder, file_config)
}

fn apply_file_config(mut builder: ConfigBuilder, config: FileConfig) -> Result<ConfigBuilder> {
    if let Some(auth) = config.auth {
        if let Some(enabled) = auth.enabled {
            builder = builder.auth_enabled(enabled);
        }

        if let Some(claim) = auth.user_roles_claim {
            builder = builder.user_roles_claim(claim);
        }
    }

    if let Some(jwt) = config.jwt {
        if let Some(issuer) = jwt.issuer {
            let url = Url::parse(&issuer)
                .map_err(|e| crate::Error::Config(format!("Invalid JWT issuer: {e}")))?;
            builder = builder.jwt_issuer(url);
        }

        if let Some(audience) = jwt.audience {
            builder = builder.jwt_audience(audience);
        }

        if let Some(uri) = jwt.jwks_uri {
            let url = Url::parse(&uri)
                .map_err(|e| crate::Error::Config(format!("Invalid JWKS URI: {e}")))?;
            builder = builder.jwks_uri(url);
        }

        if let Some(secret) = jwt.hs_secret {
            builder = builder.hs_secret(secret);
        }

        if let Some(secs) = jwt.clock_skew_secs {
            builder = builder.clock_skew(Duration::from_secs(secs));
        }

        if let Some(secs) = jwt.jwks_cache_ttl_secs {
            builder = builder.jwks_cache_ttl(Duration::from_secs(secs));
        }
    }

    if let Some(transport) = config.transport {
        if let Some(host_str) = transport.http_host
            && let Ok(host) = host_str.parse::<IpAddr>()
        {
            builder = builder.http_host(host);
        }

        if let Some(port) = transport.http_port {
            builder = builder.http_port(port);
        }

        if let Some(origin) = transport.cors_origin {
            builder = builder.cors_origin(Some(origin));
        }

        if let Some(secs) = transport.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
    }

    if let Some(obs) = config.observability {
        if let Some(level) = obs.log_level {
            builder = builder.log_level(level);
        }

        if let Some(json) = obs.json_logs {
            builder = builder.json_logs(json);
        }
    }

    Ok(builder)
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    auth: Option<AuthFileConfig>,
    jwt: Option<JwtFileConfig>,
    transport: Option<TransportFileConfig>,
    observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Deserialize)]
struct AuthFileConfig {
    enabled: Option<bool>,
    user_roles_claim: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwtFileConfig {
    issuer: Option<String>,
    audience: Option<Vec<String>>,
    jwks_uri: Option<String>,
    hs_secret: Option<String>,
    clock_skew_secs: Option<u64>,
    jwks_cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TransportFileConfig {
    http_host: Option<String>,
    http_port: Option<u16>,
    cors_origin: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ObservabilityConfig {
    log_level: Option<String>,
    json_logs: Option<bool>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[auth]
enabled = true
user_roles_claim = "cognito:groups"

[jwt]
issuer = "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_abc"
audience = ["client-id"]
clock_skew_secs = 30
jwks_cache_ttl_secs = 600

[transport]
http_host = "0.0.0.0"
http_port = 5001
cors_origin = "https://console.example.com"
request_timeout_secs = 10

[observability]
log_level = "debug"
json_logs = true
"#;

        let file = create_temp_config(toml_content);
        let config = load_from_file(file.path(), ConfigBuilder::new())
            .unwrap()
            .build()
            .unwrap();

        assert!(config.auth_enabled());
        assert_eq!(config.identity.user_roles_claim, "cognito:groups");
        assert_eq!(config.jwt.audience, vec!["client-id"]);
        assert_eq!(config.jwt.clock_skew, Duration::from_secs(30));
        assert_eq!(config.jwt.jwks_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.transport.http_port, 5001);
        assert_eq!(config.transport.request_timeout, Duration::from_secs(10));
        assert_eq!(config.telemetry.log_level, "debug");
        assert!(config.telemetry.json_logs);
    }

    #[test]
    fn test_parse_minimal_config() {
        let file = create_temp_config("[auth]\nenabled = false\n");
        let config = load_from_file(file.path(), ConfigBuilder::new())
            .unwrap()
            .build()
            .unwrap();

        assert!(!config.auth_enabled());
        assert_eq!(config.transport.http_port, 8080);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.auth.is_none());
        assert!(config.jwt.is_none());
        assert!(config.transport.is_none());
        assert!(config.observability.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let file = create_temp_config("[auth\nenabled = ");
        let result = load_from_file(file.path(), ConfigBuilder::new());
        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_invalid_jwks_uri() {
        let file = create_temp_config("[jwt]\njwks_uri = \"::not a url\"\n");
        let result = load_from_file(file.path(), ConfigBuilder::new());
        assert!(result.unwrap_err().to_string().contains("Invalid JWKS URI"));
    }

    #[test]
    fn test_missing_file() {
        let result = load_from_file(Path::new("/nonexistent/identity.toml"), ConfigBuilder::new());
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }
}
