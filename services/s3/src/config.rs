use crate::constants::{AWS_ACCESS_KEY_ID, AWS_ENDPOINT_URL, AWS_REGION, AWS_SECRET_ACCESS_KEY};
use http::uri::{Authority, Scheme};
use http::Uri;
use objsign_core::utils::Redact;
use objsign_core::{Error, Result};
use std::env;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

/// Config carries the values needed to construct a [`Signer`][crate::Signer].
///
/// All fields are optional here; [`Signer::new`][crate::Signer::new] checks
/// the required ones atomically and reports the first missing field.
#[derive(Clone, Default)]
pub struct Config {
    /// `endpoint` of the target service, e.g. `http://127.0.0.1:9000`.
    ///
    /// Will be loaded from env value [`AWS_ENDPOINT_URL`] if unset.
    pub endpoint: Option<String>,
    /// `region` used in credential scope and key derivation. Opaque: it is
    /// never validated against a known list.
    ///
    /// Will be loaded from env value [`AWS_REGION`] if unset.
    pub region: Option<String>,
    /// `access_key_id` of the credential.
    ///
    /// Will be loaded from env value [`AWS_ACCESS_KEY_ID`] if unset.
    pub access_key_id: Option<String>,
    /// `secret_access_key` of the credential.
    ///
    /// Will be loaded from env value [`AWS_SECRET_ACCESS_KEY`] if unset.
    pub secret_access_key: Option<String>,
}

impl Config {
    /// Fill unset fields from the process environment.
    ///
    /// Values already set on the config take precedence over the
    /// environment.
    pub fn from_env(mut self) -> Self {
        if self.endpoint.is_none() {
            self.endpoint = env::var(AWS_ENDPOINT_URL).ok();
        }
        if self.region.is_none() {
            self.region = env::var(AWS_REGION).ok();
        }
        if self.access_key_id.is_none() {
            self.access_key_id = env::var(AWS_ACCESS_KEY_ID).ok();
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = env::var(AWS_SECRET_ACCESS_KEY).ok();
        }
        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}

/// Endpoint of the target service: scheme plus host with optional port.
///
/// Immutable for the lifetime of a signer.
#[derive(Debug, Clone)]
pub struct Endpoint {
    scheme: Scheme,
    authority: Authority,
}

impl Endpoint {
    /// Parse an endpoint from a URL string.
    ///
    /// The endpoint carries only scheme and host; a path or query on it
    /// would end up outside the canonical request, so both are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let uri = Uri::from_str(s)
            .map_err(|e| Error::config_invalid("endpoint is not a valid url").with_source(e))?;
        let parts = uri.into_parts();

        let scheme = parts
            .scheme
            .ok_or_else(|| Error::config_invalid("endpoint scheme is required"))?;
        let authority = parts
            .authority
            .ok_or_else(|| Error::config_invalid("endpoint host is required"))?;
        if let Some(paq) = parts.path_and_query {
            if !paq.as_str().is_empty() && paq.as_str() != "/" {
                return Err(Error::config_invalid(
                    "endpoint must not carry a path or query",
                ));
            }
        }

        Ok(Self { scheme, authority })
    }

    /// Scheme of the endpoint.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Host with optional port, as sent in the Host header.
    pub fn authority(&self) -> &str {
        self.authority.as_str()
    }
}
