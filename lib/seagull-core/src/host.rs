//! Host discovery.
//!
//! A [`HostLocator`] answers "where does the metadata service live right
//! now?" with an ordered list of [`HostSpec`]s. The client re-asks on every
//! call and always uses the first entry.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use url::Url;

use crate::Error;

/// One live service address: a protocol and a `host[:port]` authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostSpec {
    protocol: String,
    host: String,
}

impl HostSpec {
    /// Create a host spec.
    ///
    /// A trailing `:` on the protocol is dropped, so `"https:"` and
    /// `"https"` are equivalent.
    #[must_use]
    pub fn new(protocol: impl Into<String>, host: impl Into<String>) -> Self {
        let mut protocol = protocol.into();
        if protocol.ends_with(':') {
            protocol.pop();
        }
        Self {
            protocol,
            host: host.into(),
        }
    }

    /// Take the scheme and authority of a URL, ignoring its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no host.
    pub fn from_url(url: &Url) -> Result<Self, Error> {
        let host = url
            .host_str()
            .ok_or_else(|| Error::invalid_request(format!("URL has no host: {url}")))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self::new(url.scheme(), host))
    }

    /// Protocol, e.g. `https`.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Authority, e.g. `localhost:8009`.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.host)
    }
}

impl FromStr for HostSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_url(&Url::parse(s)?)
    }
}

/// Supplies the currently live service addresses.
///
/// An empty list is a valid answer and makes the call fail with
/// [`Error::NoHosts`]. Implementations must not block indefinitely.
pub trait HostLocator: Send + Sync {
    /// Current hosts, best first.
    fn get(&self) -> Vec<HostSpec>;
}

/// A fixed list of hosts.
///
/// # Example
///
/// ```
/// use seagull_core::{HostLocator, HostSpec, StaticHosts};
///
/// let hosts = StaticHosts::new([HostSpec::new("http", "localhost:9120")]);
/// assert_eq!(hosts.get().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHosts {
    hosts: Vec<HostSpec>,
}

impl StaticHosts {
    /// Create a locator that always answers `hosts`.
    #[must_use]
    pub fn new(hosts: impl IntoIterator<Item = HostSpec>) -> Self {
        Self {
            hosts: hosts.into_iter().collect(),
        }
    }

    /// A locator that never finds anything.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl HostLocator for StaticHosts {
    fn get(&self) -> Vec<HostSpec> {
        self.hosts.clone()
    }
}

impl<F> HostLocator for F
where
    F: Fn() -> Vec<HostSpec> + Send + Sync,
{
    fn get(&self) -> Vec<HostSpec> {
        self()
    }
}

impl<L: HostLocator + ?Sized> HostLocator for Arc<L> {
    fn get(&self) -> Vec<HostSpec> {
        (**self).get()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn host_spec_display() {
        let spec = HostSpec::new("https", "localhost:21002");
        assert_eq!(spec.to_string(), "https://localhost:21002");
    }

    #[test]
    fn host_spec_strips_protocol_colon() {
        let spec = HostSpec::new("http:", "metadata.local");
        assert_eq!(spec.protocol(), "http");
        assert_eq!(spec.to_string(), "http://metadata.local");
    }

    #[test]
    fn host_spec_from_str() {
        let spec: HostSpec = "https://seagull.example.com:8443/ignored"
            .parse()
            .expect("valid host");
        assert_eq!(spec, HostSpec::new("https", "seagull.example.com:8443"));

        let spec: HostSpec = "http://10.0.0.4".parse().expect("valid host");
        assert_eq!(spec.host(), "10.0.0.4");
    }

    #[test]
    fn host_spec_from_str_rejects_garbage() {
        let_assert!(Err(Error::InvalidUrl(_)) = "not a url".parse::<HostSpec>());
        let_assert!(
            Err(Error::InvalidRequest(message)) = "mailto:someone@example.com".parse::<HostSpec>()
        );
        check!(message.contains("no host"));
    }

    #[test]
    fn static_hosts_preserve_order() {
        let hosts = StaticHosts::new([
            HostSpec::new("http", "first:1"),
            HostSpec::new("http", "second:2"),
        ]);
        let found = hosts.get();
        assert_eq!(found.first().map(HostSpec::host), Some("first:1"));
        assert_eq!(found.len(), 2);
        assert!(StaticHosts::empty().get().is_empty());
    }

    #[test]
    fn closure_locator_is_asked_every_time() {
        let calls = AtomicUsize::new(0);
        let locator = || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![HostSpec::new("http", "dynamic:1")]
        };

        assert_eq!(locator.get().len(), 1);
        assert_eq!(locator.get().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_locator_forwards() {
        let locator: Arc<dyn HostLocator> = Arc::new(StaticHosts::empty());
        assert!(locator.get().is_empty());
    }
}
