use crate::config::{Config, Endpoint};
use crate::constants::{
    AWS4_HMAC_SHA256, AWS4_REQUEST, SERVICE, UNSIGNED_PAYLOAD, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
};
use crate::credential::Credential;
use crate::request::{RequestSpec, SignedRequest};
use http::header::{HeaderName, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::{HeaderMap, HeaderValue, Uri};
use log::debug;
use objsign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use objsign_core::time::{format_date, format_iso8601, Clock, SystemClock};
use objsign_core::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Signer that produces SigV4 authorization material for path-style
/// requests against an S3-compatible service.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Signing is pure computation: the signer performs no network I/O and
/// keeps no per-request state, so one instance can sign from any number
/// of threads concurrently.
#[derive(Clone)]
pub struct Signer {
    endpoint: Endpoint,
    region: String,
    credential: Credential,
    clock: Arc<dyn Clock>,
    signing_key: Arc<Mutex<Option<CachedKey>>>,
}

/// Derived signing key together with the date stamp it is scoped to.
struct CachedKey {
    date_stamp: String,
    key: Vec<u8>,
}

impl Signer {
    /// Build a signer from `config`.
    ///
    /// All required values are checked here, before anything is hashed;
    /// nothing is deferred to the first `sign` call.
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::config_invalid("endpoint is required"))?;
        let region = config
            .region
            .as_deref()
            .ok_or_else(|| Error::config_invalid("region is required"))?;
        let access_key_id = config
            .access_key_id
            .as_deref()
            .ok_or_else(|| Error::config_invalid("access_key_id is required"))?;
        let secret_access_key = config
            .secret_access_key
            .as_deref()
            .ok_or_else(|| Error::config_invalid("secret_access_key is required"))?;

        let credential = Credential::new(access_key_id, secret_access_key);
        if !credential.is_valid() {
            return Err(Error::credential_invalid(
                "access_key_id and secret_access_key must not be empty",
            ));
        }

        Ok(Self {
            endpoint: Endpoint::parse(endpoint)?,
            region: region.to_string(),
            credential,
            clock: Arc::new(SystemClock),
            signing_key: Arc::new(Mutex::new(None)),
        })
    }

    /// Replace the time source.
    ///
    /// Defaults to the system clock. Inject a
    /// [`FixedClock`][objsign_core::time::FixedClock] to make signing
    /// deterministic in tests.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Region this signer signs for.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Sign one request, producing the complete header set and the
    /// fully-qualified target URI.
    pub fn sign(&self, spec: &RequestSpec) -> Result<SignedRequest> {
        if spec.path().has_key() && !spec.path().has_bucket() {
            return Err(Error::request_invalid("object key requires a bucket"));
        }

        // Both date representations must come from one capture, otherwise
        // the credential scope can disagree with the X-Amz-Date header
        // around midnight.
        let now = self.clock.now();
        let full_date = format_iso8601(now);
        let date_stamp = format_date(now);

        let canonical_uri = spec.path().canonical_uri();
        let payload_hash = match spec.content() {
            Some(content) => hex_sha256(content.body()),
            None => UNSIGNED_PAYLOAD.to_string(),
        };

        // Names are inserted lower-cased; the BTreeMap keeps the canonical
        // order and rules out duplicates.
        let mut headers = BTreeMap::new();
        headers.insert(
            HOST.as_str().to_string(),
            self.endpoint.authority().to_string(),
        );
        headers.insert(X_AMZ_CONTENT_SHA_256.to_string(), payload_hash.clone());
        headers.insert(X_AMZ_DATE.to_string(), full_date.clone());
        if let Some(content) = spec.content() {
            headers.insert(
                CONTENT_LENGTH.as_str().to_string(),
                content.body().len().to_string(),
            );
            headers.insert(
                CONTENT_TYPE.as_str().to_string(),
                content.content_type().to_string(),
            );
        }

        let signed_headers = headers
            .keys()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let creq = canonical_request_string(
            spec.method().as_str(),
            &canonical_uri,
            spec.query(),
            &headers,
            &signed_headers,
            &payload_hash,
        )?;
        debug!("calculated canonical request:\n{creq}");

        // Scope: "20130524/<region>/s3/aws4_request"
        let scope = format!(
            "{}/{}/{}/{}",
            date_stamp, self.region, SERVICE, AWS4_REQUEST
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20130524T000000Z
        // 20130524/<region>/s3/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{AWS4_HMAC_SHA256}")?;
            writeln!(f, "{full_date}")?;
            writeln!(f, "{scope}")?;
            write!(f, "{}", hex_sha256(creq.as_bytes()))?;
            f
        };
        debug!("calculated string to sign:\n{string_to_sign}");

        let signing_key = self.signing_key(&date_stamp);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "{} Credential={}/{},SignedHeaders={},Signature={}",
            AWS4_HMAC_SHA256,
            self.credential.access_key_id(),
            scope,
            signed_headers,
            signature
        ))?;
        authorization.set_sensitive(true);

        let mut header_map = HeaderMap::with_capacity(headers.len() + 1);
        for (name, value) in &headers {
            header_map.insert(HeaderName::from_str(name)?, HeaderValue::from_str(value)?);
        }
        header_map.insert(AUTHORIZATION, authorization);

        let uri = {
            let mut target = format!(
                "{}://{}{}",
                self.endpoint.scheme(),
                self.endpoint.authority(),
                canonical_uri
            );
            if !spec.query().is_empty() {
                target.push('?');
                target.push_str(spec.query());
            }
            Uri::from_str(&target)?
        };

        let body = spec
            .content()
            .map(|content| content.body().clone())
            .unwrap_or_default();

        Ok(SignedRequest::new(
            spec.method().clone(),
            uri,
            header_map,
            body,
        ))
    }

    /// Derive the signing key for `date_stamp`, reusing the cached key while
    /// the date stamp matches.
    ///
    /// The derived key is bound to exactly one day/region/service/terminator
    /// combination, so recomputing per request and caching per date are both
    /// correct; the cache only saves the four HMAC invocations.
    fn signing_key(&self, date_stamp: &str) -> Vec<u8> {
        let mut cache = self.signing_key.lock().expect("lock poisoned");
        if let Some(cached) = cache.as_ref() {
            if cached.date_stamp == date_stamp {
                return cached.key.clone();
            }
        }

        let key = generate_signing_key(self.credential.secret_access_key(), date_stamp, &self.region);
        *cache = Some(CachedKey {
            date_stamp: date_stamp.to_string(),
            key: key.clone(),
        });
        key
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

fn canonical_request_string(
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    headers: &BTreeMap<String, String>,
    signed_headers: &str,
    payload_hash: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{method}")?;
    // Insert canonical uri
    writeln!(f, "{canonical_uri}")?;
    // Insert query, accepted verbatim from the caller
    writeln!(f, "{canonical_query}")?;
    // Insert canonical headers, every line newline terminated
    for (name, value) in headers {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    // Insert signed headers
    writeln!(f, "{signed_headers}")?;
    // Insert payload hash, no trailing newline
    write!(f, "{payload_hash}")?;

    Ok(f)
}

fn generate_signing_key(secret: &str, date_stamp: &str, region: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), SERVICE.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Published reference vector for SigV4 with an S3 scope: GET object
    /// `test.txt`, 2013-05-24, region `us-east-1`, from
    /// <https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html>.
    #[test]
    fn test_reference_vector_get_object() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let empty_sha256 = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), "examplebucket.s3.amazonaws.com".to_string());
        headers.insert("range".to_string(), "bytes=0-9".to_string());
        headers.insert(X_AMZ_CONTENT_SHA_256.to_string(), empty_sha256.to_string());
        headers.insert(X_AMZ_DATE.to_string(), "20130524T000000Z".to_string());
        let signed_headers = "host;range;x-amz-content-sha256;x-amz-date";

        let creq = canonical_request_string(
            "GET",
            "/test.txt",
            "",
            &headers,
            signed_headers,
            empty_sha256,
        )?;
        assert_eq!(
            creq,
            "GET\n\
             /test.txt\n\
             \n\
             host:examplebucket.s3.amazonaws.com\n\
             range:bytes=0-9\n\
             x-amz-content-sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n\
             x-amz-date:20130524T000000Z\n\
             \n\
             host;range;x-amz-content-sha256;x-amz-date\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex_sha256(creq.as_bytes()),
            "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972"
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n20130524T000000Z\n20130524/us-east-1/s3/aws4_request\n{}",
            hex_sha256(creq.as_bytes())
        );
        let signing_key = generate_signing_key(
            "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
            "20130524",
            "us-east-1",
        );
        assert_eq!(
            hex_hmac_sha256(&signing_key, string_to_sign.as_bytes()),
            "f0e8bdb87c964420e857bd35b5d6ed310bd44f0170aba48dd91039c6036bdb41"
        );

        Ok(())
    }

    #[test]
    fn test_signing_key_depends_on_every_input() {
        let base = generate_signing_key("secret", "20130524", "us-east-1");
        assert_eq!(base.len(), 32);
        assert_ne!(base, generate_signing_key("secret2", "20130524", "us-east-1"));
        assert_ne!(base, generate_signing_key("secret", "20130525", "us-east-1"));
        assert_ne!(base, generate_signing_key("secret", "20130524", "eu-west-2"));
    }

    #[test]
    fn test_signing_key_cache_rolls_over_with_date() -> anyhow::Result<()> {
        let config = Config {
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            region: Some("us-east-1".to_string()),
            access_key_id: Some("access_key_id".to_string()),
            secret_access_key: Some("secret_access_key".to_string()),
        };
        let signer = Signer::new(&config)?;

        let first = signer.signing_key("20130524");
        assert_eq!(first, signer.signing_key("20130524"));

        let next_day = signer.signing_key("20130525");
        assert_ne!(first, next_day);
        assert_eq!(next_day, signer.signing_key("20130525"));
        Ok(())
    }
}
