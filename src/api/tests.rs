use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Url};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::{ApiSettings, ChefApi, ChefClient, HeaderSigner, RequestSigner};
use crate::domain::Node;

/// base64(sha256("")).
const EMPTY_BODY_HASH: &str = "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";

fn settings(server_url: &str) -> Result<ApiSettings, String> {
    Ok(ApiSettings {
        server_url: Url::parse(server_url).map_err(|err| format!("bad url: {}", err))?,
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        insecure: false,
    })
}

fn client(server_url: &str) -> Result<ChefClient, String> {
    let signer = Arc::new(HeaderSigner::new("pivotal".to_owned(), "13.0.0".to_owned()));
    ChefClient::new(&settings(server_url)?, signer).map_err(|err| err.to_string())
}

/// Answers exactly one request with `status_line` and `body`, handing back
/// the raw request text.
async fn spawn_responder(
    status_line: &'static str,
    body: &'static str,
) -> Result<(String, tokio::task::JoinHandle<String>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    let handle = tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return String::new();
        };
        let mut request = Vec::new();
        let mut buffer = [0u8; 4096];
        loop {
            let Ok(read) = stream.read(&mut buffer).await else {
                break;
            };
            if read == 0 {
                break;
            }
            request.extend_from_slice(buffer.get(..read).unwrap_or_default());
            if request_complete(&request) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        drop(stream.write_all(response.as_bytes()).await);
        drop(stream.shutdown().await);
        String::from_utf8_lossy(&request).into_owned()
    });
    Ok((format!("http://{}/organizations/test/", addr), handle))
}

fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body.len() >= content_length
}

#[test]
fn header_signer_emits_identity_and_content_hash() -> Result<(), String> {
    let signer = HeaderSigner::new("pivotal".to_owned(), "13.0.0".to_owned());
    let headers = signer
        .sign(&Method::GET, "/organizations/test/nodes/a", b"")
        .map_err(|err| err.to_string())?;
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    if get("x-ops-userid").as_deref() != Some("pivotal") {
        return Err("missing X-Ops-Userid".to_owned());
    }
    if get("x-ops-content-hash").as_deref() != Some(EMPTY_BODY_HASH) {
        return Err(format!("unexpected hash: {:?}", get("x-ops-content-hash")));
    }
    if get("x-chef-version").as_deref() != Some("13.0.0") {
        return Err("missing X-Chef-Version".to_owned());
    }
    let timestamp = get("x-ops-timestamp").ok_or("missing X-Ops-Timestamp")?;
    if !timestamp.ends_with('Z') || timestamp.len() != 20 {
        return Err(format!("unexpected timestamp: {}", timestamp));
    }
    Ok(())
}

#[test]
fn header_signer_leaves_authorization_to_key_signers() -> Result<(), String> {
    let signer = HeaderSigner::new("pivotal".to_owned(), "13.0.0".to_owned());
    let headers = signer
        .sign(&Method::PUT, "/organizations/test/nodes/a", br#"{"name":"a"}"#)
        .map_err(|err| err.to_string())?;
    if headers
        .keys()
        .any(|name| name.as_str().starts_with("x-ops-authorization"))
    {
        return Err(format!("unexpected authorization headers: {:?}", headers));
    }
    let names: Vec<&str> = headers.keys().map(|name| name.as_str()).collect();
    if names.len() != 5 {
        return Err(format!("unexpected header set: {:?}", names));
    }
    Ok(())
}

#[test]
fn header_signer_rejects_unrepresentable_client_name() -> Result<(), String> {
    let signer = HeaderSigner::new("bad\nname".to_owned(), "13.0.0".to_owned());
    if signer.sign(&Method::GET, "/", b"").is_ok() {
        return Err("expected newline in client name to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn relative_paths_nest_under_organization() -> Result<(), String> {
    let client = client("https://chef.example.com/organizations/demo/")?;
    let url = client.resolve("nodes/load-0").map_err(|err| err.to_string())?;
    if url.as_str() != "https://chef.example.com/organizations/demo/nodes/load-0" {
        return Err(format!("unexpected url: {}", url));
    }
    let rooted = client.resolve("/_status").map_err(|err| err.to_string())?;
    if rooted.as_str() != "https://chef.example.com/_status" {
        return Err(format!("unexpected rooted url: {}", rooted));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn get_node_reports_not_found() -> Result<(), String> {
    let (base, server) = spawn_responder("404 Not Found", r#"{"error":["not found"]}"#).await?;
    let client = client(&base)?;

    let result = client.get_node("load-0").await;
    let request = server.await.map_err(|err| err.to_string())?;

    match result {
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(format!("expected not found, got {}", err)),
        Ok(node) => return Err(format!("expected error, got {:?}", node)),
    }
    if !request.starts_with("GET /organizations/test/nodes/load-0 HTTP/1.1") {
        return Err(format!("unexpected request: {}", request));
    }
    if !request.to_ascii_lowercase().contains("x-ops-userid: pivotal") {
        return Err("request was not signed".to_owned());
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn get_node_decodes_server_record() -> Result<(), String> {
    let (base, server) = spawn_responder(
        "200 OK",
        r#"{"name":"load-0","chef_environment":"prod","run_list":["role[web]"]}"#,
    )
    .await?;
    let client = client(&base)?;

    let node = client.get_node("load-0").await.map_err(|err| err.to_string())?;
    drop(server.await);

    if node.environment != "prod" || node.run_list != ["role[web]"] {
        return Err(format!("unexpected node: {:?}", node));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn resolve_cookbooks_posts_run_list() -> Result<(), String> {
    let (base, server) = spawn_responder(
        "200 OK",
        r#"{"ntp":{"version":"1.0.0"},"apt":{"version":"2.3.1"}}"#,
    )
    .await?;
    let client = client(&base)?;
    let run_list = vec!["recipe[ntp]".to_owned()];

    let cookbooks = client
        .resolve_cookbooks("_default", &run_list)
        .await
        .map_err(|err| err.to_string())?;
    let request = server.await.map_err(|err| err.to_string())?;

    if cookbooks.len() != 2 {
        return Err(format!("expected 2 cookbooks, got {}", cookbooks.len()));
    }
    if !request.starts_with("POST /organizations/test/environments/_default/cookbook_versions ") {
        return Err(format!("unexpected request: {}", request));
    }
    if !request.ends_with(r#"{"run_list":["recipe[ntp]"]}"#) {
        return Err(format!("unexpected body: {}", request));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn malformed_resolution_is_a_decode_error() -> Result<(), String> {
    let (base, server) = spawn_responder("200 OK", "{not json").await?;
    let client = client(&base)?;

    let result = client.resolve_cookbooks("_default", &[]).await;
    drop(server.await);

    match result {
        Err(crate::error::ApiError::Decode { .. }) => Ok(()),
        Err(err) => Err(format!("expected decode error, got {}", err)),
        Ok(_) => Err("expected decode error".to_owned()),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn update_node_puts_full_record() -> Result<(), String> {
    let (base, server) = spawn_responder("200 OK", "{}").await?;
    let client = client(&base)?;
    let mut node = Node::new("load-3");
    node.run_list = vec!["role[base]".to_owned()];

    client
        .update_node(&node)
        .await
        .map_err(|err| err.to_string())?;
    let request = server.await.map_err(|err| err.to_string())?;

    if !request.starts_with("PUT /organizations/test/nodes/load-3 ") {
        return Err(format!("unexpected request: {}", request));
    }
    if !request.contains(r#""run_list":["role[base]"]"#) {
        return Err(format!("run list missing from body: {}", request));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn probe_drains_body_and_counts_bytes() -> Result<(), String> {
    let (base, server) = spawn_responder("200 OK", r#"{"roles":[]}"#).await?;
    let client = client(&base)?;

    let bytes = client.probe("roles").await.map_err(|err| err.to_string())?;
    drop(server.await);

    if bytes != 12 {
        return Err(format!("expected 12 bytes, got {}", bytes));
    }
    Ok(())
}
