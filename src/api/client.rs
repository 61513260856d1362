use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::cookbooks::CookbookSet;
use crate::domain::Node;
use crate::error::ApiError;

use super::ChefApi;
use super::signer::RequestSigner;

pub const DEFAULT_USER_AGENT: &str = concat!("chef-load/", env!("CARGO_PKG_VERSION"));
const JSON_MEDIA_TYPE: &str = "application/json";

/// Connection parameters for the Chef Server.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Organization base URL; always ends with `/` so relative paths nest
    /// under it.
    pub server_url: Url,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub insecure: bool,
}

#[derive(Serialize)]
struct RunListBody<'a> {
    run_list: &'a [String],
}

/// `reqwest`-backed client. Cloning is cheap and every clone shares one
/// connection pool.
#[derive(Clone)]
pub struct ChefClient {
    http: Client,
    base_url: Url,
    signer: Arc<dyn RequestSigner>,
}

impl ChefClient {
    /// Builds the HTTP client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(settings: &ApiSettings, signer: Arc<dyn RequestSigner>) -> Result<Self, ApiError> {
        let mut client_builder = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(DEFAULT_USER_AGENT);

        if settings.insecure {
            client_builder = client_builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let http = client_builder
            .build()
            .map_err(|source| ApiError::BuildClient { source })?;

        Ok(Self {
            http,
            base_url: settings.server_url.clone(),
            signer,
        })
    }

    pub(super) fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|source| ApiError::InvalidPath {
                path: path.to_owned(),
                source,
            })
    }

    /// Sends one signed request. A non-success status becomes an error and its
    /// response is dropped on the spot.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(Url, Response), ApiError> {
        let url = self.resolve(path)?;
        let body = body.unwrap_or_default();
        let headers = self.signer.sign(&method, url.path(), &body)?;

        let mut request_builder = self
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .headers(headers);
        if !body.is_empty() {
            request_builder = request_builder
                .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
                .body(body);
        }

        trace!("{} {}", method, url);
        let response = request_builder
            .send()
            .await
            .map_err(|source| ApiError::Request {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method,
                url: url.to_string(),
                status,
            });
        }
        Ok((url, response))
    }

    async fn send_json<T>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<(Url, Response), ApiError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(|source| ApiError::Encode { source })?;
        self.send(method, path, Some(body)).await
    }
}

async fn read_json<T>(url: &Url, response: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let bytes = response.bytes().await.map_err(|source| ApiError::Body {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

async fn drain_response_body(url: &Url, response: Response) -> Result<u64, ApiError> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|source| ApiError::Body {
            url: url.to_string(),
            source,
        })?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

fn node_path(name: &str) -> String {
    format!("nodes/{}", name)
}

#[async_trait]
impl ChefApi for ChefClient {
    async fn get_node(&self, name: &str) -> Result<Node, ApiError> {
        let (url, response) = self.send(Method::GET, &node_path(name), None).await?;
        read_json(&url, response).await
    }

    async fn create_node(&self, node: &Node) -> Result<(), ApiError> {
        let (url, response) = self.send_json(Method::POST, "nodes", node).await?;
        drain_response_body(&url, response).await.map(drop)
    }

    async fn update_node(&self, node: &Node) -> Result<(), ApiError> {
        let (url, response) = self
            .send_json(Method::PUT, &node_path(&node.name), node)
            .await?;
        drain_response_body(&url, response).await.map(drop)
    }

    async fn resolve_cookbooks(
        &self,
        environment: &str,
        run_list: &[String],
    ) -> Result<CookbookSet, ApiError> {
        let path = format!("environments/{}/cookbook_versions", environment);
        let (url, response) = self
            .send_json(Method::POST, &path, &RunListBody { run_list })
            .await?;
        read_json(&url, response).await
    }

    async fn probe(&self, path: &str) -> Result<u64, ApiError> {
        let (url, response) = self.send(Method::GET, path, None).await?;
        drain_response_body(&url, response).await
    }
}
