//! Client for the metadata service.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{
    ClientConfig, HostLocator, HttpClient, HyperClient, PreconditionError, RequestBuilder,
    Response, StaticHosts, absent, require,
};

/// Typed access to the per-user documents held by the metadata service.
///
/// Every operation is two-phase: calling it validates the arguments and
/// returns a [`RequestBuilder`]; awaiting [`RequestBuilder::send`] performs
/// the call. A 404 answer means the document does not exist and resolves
/// to `Ok(None)`.
///
/// # Example
///
/// ```ignore
/// use seagull::{ClientConfig, HostSpec, MetadataClient, StaticHosts};
///
/// let hosts = StaticHosts::new([HostSpec::new("https", "api.tidepool.org")]);
/// let client = MetadataClient::new(hosts, ClientConfig::new("/metadata", true));
///
/// let profile: Option<serde_json::Value> = client
///     .get_profile("1234", &session_token)?
///     .send()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct MetadataClient<C = HyperClient, L = StaticHosts> {
    client: C,
    hosts: L,
    config: ClientConfig,
}

impl<L: HostLocator> MetadataClient<HyperClient, L> {
    /// Create a client backed by a default [`HyperClient`].
    #[must_use]
    pub fn new(hosts: L, config: ClientConfig) -> Self {
        Self::with_client(HyperClient::new(), hosts, config)
    }
}

impl<C: HttpClient, L: HostLocator> MetadataClient<C, L> {
    /// Create a client on top of any transport.
    #[must_use]
    pub const fn with_client(client: C, hosts: L, config: ClientConfig) -> Self {
        Self {
            client,
            hosts,
            config,
        }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The transport.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The host locator.
    #[must_use]
    pub const fn hosts(&self) -> &L {
        &self.hosts
    }

    /// A bare request to `path` on the service, with no handlers registered.
    pub fn request_to<T>(&self, path: impl Into<String>) -> RequestBuilder<'_, C, L, T> {
        RequestBuilder::new(&self.client, &self.hosts, &self.config, path)
    }

    /// Fetch the collection `collection_name` of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] if any argument is empty.
    pub fn get_collection<T>(
        &self,
        user_id: &str,
        collection_name: &str,
        token: &str,
    ) -> Result<RequestBuilder<'_, C, L, Option<T>>, PreconditionError>
    where
        T: DeserializeOwned + 'static,
    {
        require(user_id, "Must specify a userId")?;
        require(collection_name, "Must specify the collectionName")?;
        require(token, "Must specify a token")?;

        Ok(self.lookup(format!("/{user_id}/{collection_name}"), token))
    }

    /// Fetch the profile of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] if any argument is empty.
    pub fn get_profile<T>(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<RequestBuilder<'_, C, L, Option<T>>, PreconditionError>
    where
        T: DeserializeOwned + 'static,
    {
        self.get_collection(user_id, "profile", token)
    }

    /// Fetch the groups `user_id` belongs to.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] if any argument is empty.
    pub fn get_groups<T>(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<RequestBuilder<'_, C, L, Option<T>>, PreconditionError>
    where
        T: DeserializeOwned + 'static,
    {
        self.get_collection(user_id, "groups", token)
    }

    /// Fetch the private pair `hash_name` of `user_id`.
    ///
    /// The token is not checked; the service rejects calls without one.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] if `user_id` or `hash_name` is empty.
    pub fn get_private_pair<T>(
        &self,
        user_id: &str,
        hash_name: &str,
        token: &str,
    ) -> Result<RequestBuilder<'_, C, L, Option<T>>, PreconditionError>
    where
        T: DeserializeOwned + 'static,
    {
        require(user_id, "Must specify a userId")?;
        require(hash_name, "Must specify the hash name")?;

        Ok(self.lookup(format!("/{user_id}/private/{hash_name}"), token))
    }

    /// GET of a JSON document: 200 parses it, 404 means absent.
    fn lookup<T>(&self, path: String, token: &str) -> RequestBuilder<'_, C, L, Option<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.request_to(path)
            .with_token(token)
            .when_status(200, |response: &Response<Bytes>| response.json().map(Some))
            .when_status(404, absent)
    }
}
