use std::time::Duration;

use catalog_core::schema::{RecordSchema, EMPLOYEE_SCHEMA};

/// Default API root when `CATALOG_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local development API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; the collection segment is appended to it.
    pub api_url: String,
    /// Schema of the collection to manage.
    pub schema: &'static RecordSchema,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Refetch the whole collection after every successful submit.
    pub reload_after_submit: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            schema: &EMPLOYEE_SCHEMA,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            reload_after_submit: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                     |
    /// |--------------------------------|-----------------------------|
    /// | `CATALOG_API_URL`              | `http://localhost:3000/api` |
    /// | `CATALOG_KIND`                 | `employees`                 |
    /// | `CATALOG_REQUEST_TIMEOUT_SECS` | `30`                        |
    /// | `CATALOG_RELOAD_AFTER_SUBMIT`  | `false`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CATALOG_API_URL") {
            config.api_url = url.trim().to_string();
        }

        if let Some(kind) = lookup("CATALOG_KIND") {
            config.schema = parse_kind(&kind).ok_or_else(|| ConfigError::Invalid {
                var: "CATALOG_KIND",
                value: kind.clone(),
                reason: "expected `employees` or `movies`".to_string(),
            })?;
        }

        if let Some(secs) = lookup("CATALOG_REQUEST_TIMEOUT_SECS") {
            let parsed: u64 = secs.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "CATALOG_REQUEST_TIMEOUT_SECS",
                value: secs.clone(),
                reason: "expected a whole number of seconds".to_string(),
            })?;
            config.request_timeout = Duration::from_secs(parsed);
        }

        if let Some(flag) = lookup("CATALOG_RELOAD_AFTER_SUBMIT") {
            config.reload_after_submit = parse_bool(&flag).ok_or_else(|| ConfigError::Invalid {
                var: "CATALOG_RELOAD_AFTER_SUBMIT",
                value: flag.clone(),
                reason: "expected true/false".to_string(),
            })?;
        }

        Ok(config)
    }
}

/// Map a collection name to its built-in schema.
pub fn parse_kind(kind: &str) -> Option<&'static RecordSchema> {
    RecordSchema::builtin(kind.trim())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use catalog_core::schema::MOVIE_SCHEMA;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.schema, &EMPLOYEE_SCHEMA);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.reload_after_submit);
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("CATALOG_API_URL", " https://example.com/api "),
            ("CATALOG_KIND", "Movies"),
            ("CATALOG_REQUEST_TIMEOUT_SECS", "5"),
            ("CATALOG_RELOAD_AFTER_SUBMIT", "yes"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://example.com/api");
        assert_eq!(config.schema, &MOVIE_SCHEMA);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.reload_after_submit);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_matches!(
            load(&[("CATALOG_KIND", "books")]),
            Err(ConfigError::Invalid { var: "CATALOG_KIND", .. })
        );
    }

    #[test]
    fn bad_timeout_and_flag_are_rejected() {
        assert_matches!(
            load(&[("CATALOG_REQUEST_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::Invalid { var: "CATALOG_REQUEST_TIMEOUT_SECS", .. })
        );
        assert_matches!(
            load(&[("CATALOG_RELOAD_AFTER_SUBMIT", "maybe")]),
            Err(ConfigError::Invalid { var: "CATALOG_RELOAD_AFTER_SUBMIT", .. })
        );
    }
}
