use std::{env, time::Duration};

use tracing::warn;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";

/// Client configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub request_timeout: Duration,
    pub notification_ttl: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            token: None,
            request_timeout: Duration::from_secs(10),
            notification_ttl: Duration::from_secs(4),
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_base = lookup("PENTOPUBLIC_API_BASE")
            .map(normalize_endpoint)
            .unwrap_or(defaults.api_base);
        let token = lookup("PENTOPUBLIC_TOKEN").filter(|t| !t.trim().is_empty());
        let request_timeout = secs(&lookup, "PENTOPUBLIC_TIMEOUT_SECS")
            .unwrap_or(defaults.request_timeout);
        let notification_ttl = secs(&lookup, "PENTOPUBLIC_NOTIFY_SECS")
            .unwrap_or(defaults.notification_ttl);

        Self {
            api_base,
            token,
            request_timeout,
            notification_ttl,
        }
    }
}

fn secs<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!(key, value = %raw, "ignoring invalid duration, using default");
            None
        }
        Ok(value) => Some(Duration::from_secs(value)),
    }
}

fn normalize_endpoint(raw: String) -> String {
    let ep = raw.trim().trim_end_matches('/').to_string();
    if ep.starts_with("http://") || ep.starts_with("https://") {
        ep
    } else {
        format!("http://{ep}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AdminConfig::from_lookup(lookup_from(&[]));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert!(cfg.token.is_none());
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.notification_ttl, Duration::from_secs(4));
    }

    #[test]
    fn overrides_are_normalized() {
        let cfg = AdminConfig::from_lookup(lookup_from(&[
            ("PENTOPUBLIC_API_BASE", " books.example.com/api/ "),
            ("PENTOPUBLIC_TOKEN", "abc"),
            ("PENTOPUBLIC_TIMEOUT_SECS", "3"),
            ("PENTOPUBLIC_NOTIFY_SECS", "zero"),
        ]));
        assert_eq!(cfg.api_base, "http://books.example.com/api");
        assert_eq!(cfg.token.as_deref(), Some("abc"));
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.notification_ttl, Duration::from_secs(4));
    }
}
