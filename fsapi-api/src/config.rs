//! Client configuration
//!
//! Controls network timeouts and the default list page size. The struct can
//! be deserialized so that shells can load it from a file; durations are
//! given in milliseconds there.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Configuration for an [`FsapiClient`](crate::FsapiClient)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Time allowed to connect to the device
    /// Default: 5 seconds
    #[serde(rename = "connect_timeout_ms", deserialize_with = "duration_from_millis")]
    pub connect_timeout: Duration,

    /// Time allowed to read a response
    /// Default: 10 seconds
    #[serde(rename = "read_timeout_ms", deserialize_with = "duration_from_millis")]
    pub read_timeout: Duration,

    /// Rows requested per LIST_GET_NEXT page
    /// Default: 100
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: transport::DEFAULT_CONNECT_TIMEOUT,
            read_timeout: transport::DEFAULT_READ_TIMEOUT,
            page_size: 100,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same limit for connecting and reading
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(1))
            .with_page_size(20);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "read_timeout_ms": 1500, "page_size": 10 }"#).unwrap();
        assert_eq!(config.read_timeout, Duration::from_millis(1500));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, 10);
    }
}
