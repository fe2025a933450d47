use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use halo_api::token::DEFAULT_TOKEN_TTL_MINUTES;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-very-secret-and-secure-key",
];

/// One week.
const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HALO_JWT_SECRET is unset or still a placeholder")]
    InsecureSecret,

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub token_ttl_minutes: i64,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = get("HALO_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::InsecureSecret);
        }

        let db_path = get("HALO_DB_PATH").unwrap_or_else(|| "halo.db".into()).into();
        let host = get("HALO_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = get("HALO_PORT").unwrap_or_else(|| "2242".into());
        let addr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: "HALO_HOST/HALO_PORT",
                value: format!("{}:{}", host, port),
            })?;

        let token_ttl_minutes = match get("HALO_TOKEN_TTL_MINUTES") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|m| (1..=MAX_TOKEN_TTL_MINUTES).contains(m))
                .ok_or(ConfigError::Invalid {
                    name: "HALO_TOKEN_TTL_MINUTES",
                    value: v,
                })?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let seed_demo = match get("HALO_SEED_DEMO").as_deref() {
            None | Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "HALO_SEED_DEMO",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            token_ttl_minutes,
            seed_demo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = load(&[("HALO_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.addr.port(), 2242);
        assert_eq!(cfg.db_path, PathBuf::from("halo.db"));
        assert_eq!(cfg.token_ttl_minutes, 60);
        assert!(cfg.seed_demo);
    }

    #[test]
    fn missing_or_placeholder_secret_is_fatal() {
        assert!(matches!(load(&[]), Err(ConfigError::InsecureSecret)));
        assert!(matches!(
            load(&[("HALO_JWT_SECRET", "dev-secret-change-me")]),
            Err(ConfigError::InsecureSecret)
        ));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("HALO_JWT_SECRET", "s"), ("HALO_PORT", "http")]).is_err());
        assert!(load(&[("HALO_JWT_SECRET", "s"), ("HALO_TOKEN_TTL_MINUTES", "0")]).is_err());
        assert!(load(&[("HALO_JWT_SECRET", "s"), ("HALO_SEED_DEMO", "maybe")]).is_err());
    }

    #[test]
    fn token_ttl_is_bounded() {
        let ttl = |v: &str| load(&[("HALO_JWT_SECRET", "s"), ("HALO_TOKEN_TTL_MINUTES", v)]);
        assert_eq!(ttl("10080").unwrap().token_ttl_minutes, MAX_TOKEN_TTL_MINUTES);
        assert!(ttl("10081").is_err());
        assert!(ttl("9223372036854775807").is_err());
    }

    #[test]
    fn overrides_are_read() {
        let cfg = load(&[
            ("HALO_JWT_SECRET", "s"),
            ("HALO_HOST", "127.0.0.1"),
            ("HALO_PORT", "8080"),
            ("HALO_TOKEN_TTL_MINUTES", "15"),
            ("HALO_SEED_DEMO", "false"),
        ])
        .unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.token_ttl_minutes, 15);
        assert!(!cfg.seed_demo);
    }
}
