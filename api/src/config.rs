use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use ipnetwork::IpNetwork;

const DEFAULT_FRONTEND_ORIGIN: &str = "http://127.0.0.1:3000";
const DEFAULT_DEVELOPMENT_ORIGINS: &[&str] = &["http://localhost:3000"];
const DEFAULT_TRUSTED_PROXIES: &str = "127.0.0.1/32";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub env: Env,
    pub database_url: String,
    pub database_pool_size: usize,
    pub port: u16,
    pub frontend_origin: String,
    pub development_origins: Vec<String>,
    pub admin_email: String,
    pub session_cookie_name: String,
    pub trusted_proxies: Vec<IpNetwork>,
    pub enable_hsts: bool,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable `{0}` is required")]
    Missing(&'static str),

    #[error("Environment variable `{key}` is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    var(lookup, key).ok_or(ConfigError::Missing(key))
}

fn parsed_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match var(lookup, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            tracing::debug!("Environment variable `{key}` not set, using default");
            Ok(default)
        }
    }
}

/// Splits an env-style list. Accepts a JSON array (`["a", "b"]`) or items
/// separated by commas and/or newlines. Blank items are dropped.
pub fn parse_delimited_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();

    if raw.starts_with('[') && raw.ends_with(']') {
        if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(raw) {
            return items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|item| !item.is_empty())
                .collect();
        }
    }

    raw.replace('\n', ",")
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("`{raw}` is not a boolean"),
        }),
    }
}

fn is_http_origin(origin: &str) -> bool {
    origin.starts_with("http://") || origin.starts_with("https://")
}

impl ServerConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match var(&lookup, "ENVIRONMENT").map(|e| e.to_ascii_lowercase()) {
            Some(env) => match env.as_str() {
                "dev" | "development" => Env::Dev,
                "staging" => Env::Staging,
                "production" | "prod" => Env::Production,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "ENVIRONMENT",
                        reason: format!("`{env}` is not one of dev, staging, production"),
                    });
                }
            },
            None => Env::Dev,
        };

        let database_pool_size = parsed_var(&lookup, "DATABASE_POOL_SIZE", 5usize)?;
        if !(1..=20).contains(&database_pool_size) {
            return Err(ConfigError::Invalid {
                key: "DATABASE_POOL_SIZE",
                reason: "must be between 1 and 20".into(),
            });
        }

        let frontend_origin = var(&lookup, "FRONTEND_ORIGIN")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.into())
            .trim_end_matches('/')
            .to_string();

        let development_origins: Vec<String> = var(&lookup, "DEVELOPMENT_ORIGINS")
            .map(|raw| parse_delimited_list(&raw))
            .unwrap_or_default()
            .into_iter()
            .map(|origin| origin.trim_end_matches('/').to_string())
            .collect();

        let trusted_proxies = parse_delimited_list(
            &var(&lookup, "TRUSTED_PROXIES").unwrap_or_else(|| DEFAULT_TRUSTED_PROXIES.into()),
        )
        .into_iter()
        .map(|cidr| {
            cidr.parse::<IpNetwork>()
                .map_err(|e| ConfigError::Invalid {
                    key: "TRUSTED_PROXIES",
                    reason: format!("`{cidr}`: {e}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

        if trusted_proxies.is_empty() {
            return Err(ConfigError::Invalid {
                key: "TRUSTED_PROXIES",
                reason: "must not be empty".into(),
            });
        }

        let enable_hsts = match var(&lookup, "ENABLE_HSTS") {
            Some(raw) => parse_bool("ENABLE_HSTS", &raw)?,
            None => true,
        };

        let config = ServerConfig {
            env,
            database_url: required_var(&lookup, "DATABASE_URL")?,
            database_pool_size,
            port: parsed_var(&lookup, "PORT", 8000u16)?,
            frontend_origin,
            development_origins,
            admin_email: var(&lookup, "ADMIN_EMAIL")
                .unwrap_or_else(|| "admin@example.com".into())
                .to_lowercase(),
            session_cookie_name: var(&lookup, "SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "portfolio_session".into()),
            trusted_proxies,
            enable_hsts,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_origin(&self.frontend_origin) {
            return Err(ConfigError::Invalid {
                key: "FRONTEND_ORIGIN",
                reason: "must be an http(s) origin".into(),
            });
        }

        for origin in &self.development_origins {
            if origin == "*" {
                return Err(ConfigError::Invalid {
                    key: "DEVELOPMENT_ORIGINS",
                    reason: "wildcards are not permitted".into(),
                });
            }
            if !is_http_origin(origin) {
                return Err(ConfigError::Invalid {
                    key: "DEVELOPMENT_ORIGINS",
                    reason: format!("`{origin}` is not an http(s) origin"),
                });
            }
        }

        if self.env != Env::Dev {
            if !self.frontend_origin.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "FRONTEND_ORIGIN",
                    reason: "must use HTTPS outside development".into(),
                });
            }
            if !self.development_origins.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "DEVELOPMENT_ORIGINS",
                    reason: "must be empty outside development".into(),
                });
            }
        }

        Ok(())
    }

    /// Origins the SPA may call us from. Development origins only count in
    /// the dev environment.
    pub fn allowed_cors_origins(&self) -> Vec<String> {
        let mut origins = BTreeSet::from([self.frontend_origin.clone()]);

        if self.env == Env::Dev {
            if self.development_origins.is_empty() {
                origins.extend(DEFAULT_DEVELOPMENT_ORIGINS.iter().map(|o| o.to_string()));
            } else {
                origins.extend(self.development_origins.iter().cloned());
            }
        }

        origins.into_iter().collect()
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        email.eq_ignore_ascii_case(&self.admin_email)
    }

    /// The database URL with the password masked, for logging.
    pub fn redacted_database_url(&self) -> String {
        redact_dsn(&self.database_url)
    }
}

fn redact_dsn(dsn: &str) -> String {
    let Some((scheme, rest)) = dsn.split_once("://") else {
        return dsn.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return dsn.to_string();
    };

    let masked = match credentials.split_once(':') {
        Some((user, _)) => format!("{user}:***"),
        None => "***".to_string(),
    };

    format!("{scheme}://{masked}@{host}")
}
