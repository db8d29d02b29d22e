//! Client configuration types.

use std::time::Duration;

use serde::Deserialize;

/// Configuration of the metadata client.
///
/// Can be deserialized from the service configuration, using the keys
/// `pathPrefix` and `secureSsl`:
///
/// ```
/// use seagull::ClientConfig;
///
/// let config: ClientConfig =
///     serde_json::from_str(r#"{"pathPrefix": "/metadata/", "secureSsl": true}"#).unwrap();
/// assert_eq!(config.path_prefix(), "/metadata");
/// assert!(config.secure_ssl());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ClientConfigBuilder")]
pub struct ClientConfig {
    path_prefix: String,
    secure_ssl: bool,
}

impl ClientConfig {
    /// Create a configuration; trailing slashes of `path_prefix` are dropped.
    #[must_use]
    pub fn new(path_prefix: impl Into<String>, secure_ssl: bool) -> Self {
        Self::builder()
            .path_prefix(path_prefix)
            .secure_ssl(secure_ssl)
            .build()
    }

    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Prefix put in front of every request path. Never ends with `/`.
    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Whether server certificates are verified.
    #[must_use]
    pub const fn secure_ssl(&self) -> bool {
        self.secure_ssl
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfigBuilder {
    path_prefix: Option<String>,
    secure_ssl: Option<bool>,
}

impl ClientConfigBuilder {
    /// Set the path prefix (default: empty).
    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Set whether TLS certificates are verified (default: `false`).
    #[must_use]
    pub const fn secure_ssl(mut self, secure: bool) -> Self {
        self.secure_ssl = Some(secure);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let path_prefix = self
            .path_prefix
            .map(|prefix| prefix.trim_end_matches('/').to_string())
            .unwrap_or_default();
        ClientConfig {
            path_prefix,
            secure_ssl: self.secure_ssl.unwrap_or(false),
        }
    }
}

impl From<ClientConfigBuilder> for ClientConfig {
    fn from(builder: ClientConfigBuilder) -> Self {
        builder.build()
    }
}

/// Settings of the default HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// How long the transport waits for a response.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.path_prefix(), "");
        assert!(!config.secure_ssl());
        assert_eq!(ClientConfig::builder().build(), config);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(ClientConfig::new("/metadata/", false).path_prefix(), "/metadata");
        assert_eq!(ClientConfig::new("/metadata//", false).path_prefix(), "/metadata");
        assert_eq!(ClientConfig::new("/", false).path_prefix(), "");
        assert_eq!(ClientConfig::new("/metadata", true).path_prefix(), "/metadata");
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::builder()
            .path_prefix("/seagull/")
            .secure_ssl(true)
            .build();

        assert_eq!(config.path_prefix(), "/seagull");
        assert!(config.secure_ssl());
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").expect("empty config");
        assert_eq!(config, ClientConfig::default());

        let config: ClientConfig =
            serde_json::from_str(r#"{"pathPrefix": "/md/", "serviceName": "seagull"}"#)
                .expect("partial config");
        assert_eq!(config.path_prefix(), "/md");
        assert!(!config.secure_ssl());
    }

    #[test]
    fn default_transport_timeout() {
        assert_eq!(TransportConfig::default().timeout, Duration::from_secs(30));
    }
}
