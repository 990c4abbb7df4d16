use crate::path::ObjectPath;
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// Request payload: raw bytes plus their media type.
#[derive(Debug, Clone)]
pub struct Content {
    body: Bytes,
    content_type: String,
}

impl Content {
    /// Create a payload from body bytes and a media type.
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    /// The exact bytes that will be sent and hashed.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Media type, sent as the Content-Type header.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Specification of one request to sign. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: ObjectPath,
    query: String,
    content: Option<Content>,
}

impl RequestSpec {
    /// Create a spec for `method` against `path`.
    pub fn new(method: Method, path: ObjectPath) -> Self {
        Self {
            method,
            path,
            query: String::new(),
            content: None,
        }
    }

    /// Attach a pre-built canonical query string.
    ///
    /// The value is inserted into the canonical request and the target URI
    /// verbatim. It is the caller's responsibility that parameters are
    /// sorted by name and percent-encoded per the SigV4 rules; the engine
    /// does not detect or correct violations, and a non-canonical query
    /// fails remote signature verification.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Attach a request body.
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// HTTP method of the request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target path.
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Canonical query string, possibly empty.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Request payload, if any.
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }
}

/// Signed artifact for one HTTP call: the complete header set, the
/// fully-qualified target URI, and the body bytes.
///
/// A transport must send exactly these headers and this URI, unmodified;
/// the storage service recomputes the signature from what actually arrives.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl SignedRequest {
    pub(crate) fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// HTTP method of the signed call.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Fully-qualified target URI, including the canonical query string.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Final header collection, Authorization included.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body bytes; empty when the request carries no payload.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Convert into the `http::Request` handed to the transport.
    pub fn into_http_request(self) -> http::Request<Bytes> {
        let mut req = http::Request::new(self.body);
        *req.method_mut() = self.method;
        *req.uri_mut() = self.uri;
        *req.headers_mut() = self.headers;
        req
    }
}
