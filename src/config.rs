use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Upper bound on concurrent per-namespace metrics queries.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: default_concurrency(),
        }
    }
}

fn default_listen_port() -> u16 {
    9090
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    8
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self, ConfigError> {
        let mut cfg: Config = serde_yaml::from_str(data)?;

        let base_url = cfg
            .cluster
            .base_url
            .trim()
            .trim_end_matches('/')
            .to_string();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "cluster.base_url must be configured".into(),
            ));
        }
        cfg.cluster.base_url = base_url;
        cfg.metrics.concurrency = cfg.metrics.concurrency.max(1);

        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }
}

impl ClusterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_yaml("cluster:\n  base_url: http://127.0.0.1:8001/\n").unwrap();
        assert_eq!(cfg.listen_port, 9090);
        assert_eq!(cfg.cluster.base_url, "http://127.0.0.1:8001");
        assert_eq!(cfg.cluster.timeout(), Duration::from_secs(10));
        assert!(cfg.cluster.token.is_none());
        assert!(cfg.metrics.enabled);
        assert_eq!(cfg.metrics.concurrency, 8);
    }

    #[test]
    fn explicit_values_and_concurrency_floor() {
        let yaml = "\
listen_port: 8080
cluster:
  base_url: https://k8s.local
  token: secret
  timeout_secs: 3
metrics:
  enabled: false
  concurrency: 0
";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.cluster.token.as_deref(), Some("secret"));
        assert!(!cfg.metrics.enabled);
        assert_eq!(cfg.metrics.concurrency, 1);
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let err = Config::from_yaml("cluster:\n  base_url: \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_cluster_section_fails_to_parse() {
        let err = Config::from_yaml("listen_port: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
