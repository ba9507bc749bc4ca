//! Transport settings read from the environment.

use std::time::Duration;

use crate::error::ConfigError;

pub const USER_AGENT_VAR: &str = "REST_PLUGIN_USER_AGENT";
pub const TIMEOUT_VAR: &str = "REST_PLUGIN_TIMEOUT_SECS";

/// Settings applied to every request sent by `UreqTransport`.
///
/// Unset fields fall back to the transport's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout = match read(TIMEOUT_VAR) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: TIMEOUT_VAR,
                        value: raw,
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            user_agent: read(USER_AGENT_VAR),
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_transport_defaults() {
        let config = TransportConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TransportConfig::default());
    }

    #[test]
    fn reads_user_agent_and_timeout() {
        let config = TransportConfig::from_lookup(lookup(&[
            (USER_AGENT_VAR, "agent/1.0"),
            (TIMEOUT_VAR, "30"),
        ]))
        .unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("agent/1.0"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config =
            TransportConfig::from_lookup(lookup(&[(USER_AGENT_VAR, "  "), (TIMEOUT_VAR, "")]))
                .unwrap();
        assert_eq!(config, TransportConfig::default());
    }

    #[test]
    fn rejects_non_numeric_and_zero_timeouts() {
        for raw in ["soon", "0", "-5"] {
            let err = TransportConfig::from_lookup(lookup(&[(TIMEOUT_VAR, raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { value, .. } if value == raw));
        }
    }
}
