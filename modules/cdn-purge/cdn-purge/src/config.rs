//! Credential and endpoint configuration.
//!
//! [`PurgeConfig`] is resolved once (from the environment or a host-provided
//! [`Figment`]) and shared by `Arc` with every component. Nothing else in
//! the crate reads the environment.

use std::fmt;

use figment::Figment;
use purge_http::HttpClientConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const DEFAULT_LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_MANAGEMENT_BASE_URL: &str = "https://management.azure.com";
/// Audience of the management API, sent as `resource` in the token request.
pub const DEFAULT_RESOURCE: &str = "https://management.azure.com/";

pub const CDN_API_VERSION: &str = "2021-06-01";
pub const FRONT_DOOR_API_VERSION: &str = "2019-05-01";

/// Environment variable names, in resolution order.
pub mod env {
    pub const CLIENT_ID: &str = "AZURE_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
    pub const TENANT_ID: &str = "AZURE_TENANT_ID";
    pub const SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
    pub const RESOURCE_GROUP: &str = "AZURE_RESOURCE_GROUP";
    pub const CDN_PROFILE: &str = "AZURE_CDN_PROFILE";
    pub const CDN_ENDPOINT: &str = "AZURE_CDN_ENDPOINT";
    pub const FRONT_DOOR: &str = "AZURE_FRONTDOOR";
}

/// Fixed identity and endpoint values for one process.
///
/// No validation happens on construction; use [`is_complete`](Self::is_complete)
/// for the "is the CDN configured" check. `Debug` redacts the client secret.
#[derive(Clone)]
pub struct PurgeConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub tenant_id: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub cdn_profile: String,
    pub cdn_endpoint: String,
    /// Secondary edge-acceleration (Front Door) instance; empty means none.
    pub front_door: String,

    pub login_base_url: String,
    pub management_base_url: String,
    pub resource: String,

    /// Transport settings shared by the authenticator and the purge client.
    pub http: HttpClientConfig,
}

/// Shape accepted from a [`Figment`]; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPurgeConfig {
    client_id: String,
    client_secret: String,
    tenant_id: String,
    subscription_id: String,
    resource_group: String,
    cdn_profile: String,
    cdn_endpoint: String,
    front_door: String,
    login_base_url: Option<String>,
    management_base_url: Option<String>,
    resource: Option<String>,
}

impl PurgeConfig {
    /// Resolve the configuration from the process environment.
    ///
    /// Unset variables become empty strings.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn resolve_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).unwrap_or_default();
        Self {
            client_id: var(env::CLIENT_ID),
            client_secret: SecretString::from(var(env::CLIENT_SECRET)),
            tenant_id: var(env::TENANT_ID),
            subscription_id: var(env::SUBSCRIPTION_ID),
            resource_group: var(env::RESOURCE_GROUP),
            cdn_profile: var(env::CDN_PROFILE),
            cdn_endpoint: var(env::CDN_ENDPOINT),
            front_door: var(env::FRONT_DOOR),
            ..Self::default()
        }
    }

    /// Extract the configuration from a host-provided [`Figment`].
    ///
    /// # Errors
    ///
    /// Returns the figment error if a present value has the wrong type.
    pub fn from_figment(figment: &Figment) -> Result<Self, figment::Error> {
        let raw: RawPurgeConfig = figment.extract()?;
        let defaults = Self::default();
        Ok(Self {
            client_id: raw.client_id,
            client_secret: SecretString::from(raw.client_secret),
            tenant_id: raw.tenant_id,
            subscription_id: raw.subscription_id,
            resource_group: raw.resource_group,
            cdn_profile: raw.cdn_profile,
            cdn_endpoint: raw.cdn_endpoint,
            front_door: raw.front_door,
            login_base_url: raw.login_base_url.unwrap_or(defaults.login_base_url),
            management_base_url: raw
                .management_base_url
                .unwrap_or(defaults.management_base_url),
            resource: raw.resource.unwrap_or(defaults.resource),
            http: defaults.http,
        })
    }

    /// `true` iff subscription, resource group, CDN profile and CDN endpoint
    /// are all non-empty. Client credentials are not part of this check.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.subscription_id.is_empty()
            && !self.resource_group.is_empty()
            && !self.cdn_profile.is_empty()
            && !self.cdn_endpoint.is_empty()
    }

    /// `true` iff client id, client secret and tenant id are all non-empty.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.expose_secret().is_empty()
            && !self.tenant_id.is_empty()
    }

    #[must_use]
    pub fn is_front_door_configured(&self) -> bool {
        !self.front_door.is_empty()
    }

    /// OAuth2 token endpoint for the configured tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/token",
            self.login_base_url.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Purge endpoint of the primary CDN endpoint.
    #[must_use]
    pub fn cdn_purge_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Cdn/profiles/{}/endpoints/{}/purge?api-version={CDN_API_VERSION}",
            self.management_base_url.trim_end_matches('/'),
            self.subscription_id,
            self.resource_group,
            self.cdn_profile,
            self.cdn_endpoint,
        )
    }

    /// Purge endpoint of the Front Door instance, if one is configured.
    #[must_use]
    pub fn front_door_purge_url(&self) -> Option<String> {
        if !self.is_front_door_configured() {
            return None;
        }
        Some(format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/frontDoors/{}/purge?api-version={FRONT_DOOR_API_VERSION}",
            self.management_base_url.trim_end_matches('/'),
            self.subscription_id,
            self.resource_group,
            self.front_door,
        ))
    }
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: SecretString::from(String::new()),
            tenant_id: String::new(),
            subscription_id: String::new(),
            resource_group: String::new(),
            cdn_profile: String::new(),
            cdn_endpoint: String::new(),
            front_door: String::new(),
            login_base_url: DEFAULT_LOGIN_BASE_URL.to_owned(),
            management_base_url: DEFAULT_MANAGEMENT_BASE_URL.to_owned(),
            resource: DEFAULT_RESOURCE.to_owned(),
            http: HttpClientConfig::default(),
        }
    }
}

impl fmt::Debug for PurgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurgeConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .field("resource_group", &self.resource_group)
            .field("cdn_profile", &self.cdn_profile)
            .field("cdn_endpoint", &self.cdn_endpoint)
            .field("front_door", &self.front_door)
            .field("login_base_url", &self.login_base_url)
            .field("management_base_url", &self.management_base_url)
            .field("resource", &self.resource)
            .field("http", &self.http)
            .finish()
    }
}
