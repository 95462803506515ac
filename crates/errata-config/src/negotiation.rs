use serde::Deserialize;

/// JSON content-type normalization for successful responses
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NegotiationConfig {
    /// Whether the negotiator runs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Largest body the negotiator will buffer to check for JSON
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: NegotiationConfig = toml::from_str("").unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_body_bytes, 1_048_576);
    }

    #[test]
    fn deserialize_disabled() {
        let config: NegotiationConfig = toml::from_str("enabled = false\nmax_body_bytes = 4096").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.max_body_bytes, 4096);
    }
}
