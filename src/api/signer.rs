use base64::Engine as _;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha2::{Digest, Sha256};

use crate::error::ApiError;

const X_OPS_SIGN: HeaderName = HeaderName::from_static("x-ops-sign");
const X_OPS_USERID: HeaderName = HeaderName::from_static("x-ops-userid");
const X_OPS_TIMESTAMP: HeaderName = HeaderName::from_static("x-ops-timestamp");
const X_OPS_CONTENT_HASH: HeaderName = HeaderName::from_static("x-ops-content-hash");
const X_CHEF_VERSION: HeaderName = HeaderName::from_static("x-chef-version");
/// Signing protocol advertised alongside the SHA-256 content hash.
const SIGN_DESCRIPTION: &str = "algorithm=sha256;version=1.3";

/// Produces the per-request authentication headers.
pub trait RequestSigner: Send + Sync {
    /// Returns the headers to attach to a request for `path` with `body`.
    ///
    /// # Errors
    ///
    /// Returns an error when a header value cannot be represented.
    fn sign(&self, method: &Method, path: &str, body: &[u8]) -> Result<HeaderMap, ApiError>;
}

/// Identifies the client and hashes the body the way the Chef Server expects.
///
/// No `X-Ops-Authorization-*` headers are produced, so a server that verifies
/// signatures rejects these requests. Only usable against servers or doubles
/// that skip authentication; a key-holding [`RequestSigner`] is needed for a
/// real Chef Server.
#[derive(Debug, Clone)]
pub struct HeaderSigner {
    client_name: String,
    chef_version: String,
}

impl HeaderSigner {
    #[must_use]
    pub const fn new(client_name: String, chef_version: String) -> Self {
        Self {
            client_name,
            chef_version,
        }
    }
}

impl RequestSigner for HeaderSigner {
    fn sign(&self, _method: &Method, _path: &str, body: &[u8]) -> Result<HeaderMap, ApiError> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let content_hash = base64::engine::general_purpose::STANDARD.encode(Sha256::digest(body));

        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(X_OPS_SIGN, HeaderValue::from_static(SIGN_DESCRIPTION));
        headers.insert(X_OPS_USERID, header_value("X-Ops-Userid", &self.client_name)?);
        headers.insert(X_OPS_TIMESTAMP, header_value("X-Ops-Timestamp", &timestamp)?);
        headers.insert(
            X_OPS_CONTENT_HASH,
            header_value("X-Ops-Content-Hash", &content_hash)?,
        );
        headers.insert(
            X_CHEF_VERSION,
            header_value("X-Chef-Version", &self.chef_version)?,
        );
        Ok(headers)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_err| ApiError::InvalidHeader { name })
}
