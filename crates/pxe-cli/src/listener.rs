//! HTTP listener for "installation completed" notifications
//!
//! Installed hosts call `GET /installationCompleted?hostname=<name>` from
//! their first boot. The listener stops once no host sections remain, when
//! `GET /shutdown` is requested, or on Ctrl+C.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use colored::Colorize;
use pxe_core::CompletionHandler;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};

use crate::error::{CliError, Result};

/// Shared between request handlers.
pub struct ListenerState {
    /// Serializes every edit of the DHCP configuration
    handler: Mutex<CompletionHandler>,
    stop: Notify,
}

impl ListenerState {
    pub fn new(handler: CompletionHandler) -> Arc<Self> {
        Arc::new(Self {
            handler: Mutex::new(handler),
            stop: Notify::new(),
        })
    }
}

pub fn router(state: Arc<ListenerState>) -> Router {
    Router::new()
        .route("/installationCompleted", get(installation_completed))
        .route("/shutdown", get(shutdown))
        .fallback(not_found)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CompletionQuery {
    hostname: Option<String>,
}

async fn installation_completed(
    State(state): State<Arc<ListenerState>>,
    Query(query): Query<CompletionQuery>,
) -> Response {
    let Some(hostname) = query.hostname.filter(|h| !h.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "missing hostname parameter" })),
        )
            .into_response();
    };

    let handler = state.handler.lock().await;
    match handler.installation_completed(hostname.trim()).await {
        Ok(remaining) => {
            println!(
                "{} {} finished installing ({} remaining)",
                "+".green(),
                hostname.cyan(),
                remaining
            );
            if remaining == 0 {
                state.stop.notify_one();
            }
            Json(json!({ "status": "success" })).into_response()
        }
        Err(e) => {
            tracing::error!(%hostname, error = %e, "failed to handle completion");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn shutdown(State(state): State<Arc<ListenerState>>) -> Json<serde_json::Value> {
    tracing::info!("shutdown requested");
    state.stop.notify_one();
    Json(json!({ "status": "success" }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "error", "message": "not found" })),
    )
}

/// Serve on `listener` until every host reported or a stop is requested.
pub async fn serve(listener: TcpListener, state: Arc<ListenerState>) -> Result<()> {
    let stop = Arc::clone(&state);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = stop.stop.notified() => tracing::info!("stopping listener"),
                _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, stopping listener"),
            }
        })
        .await?;
    Ok(())
}

/// Bind all interfaces on `port` and wait for the pending hosts.
pub async fn run(port: u16, handler: CompletionHandler) -> Result<()> {
    let pending = handler.remaining()?;
    if pending == 0 {
        println!("No hosts pending installation, not listening.");
        return Ok(());
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::user(format!("Cannot listen on {addr}: {e}")))?;
    println!(
        "Waiting for {} host(s) on {}",
        pending,
        format!("http://{addr}").cyan()
    );

    serve(listener, ListenerState::new(handler)).await?;
    println!("{}", "Listener stopped".bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use pxe_core::ServiceControl;
    use pxe_test_utils::TestWorkspace;
    use std::time::Duration;

    struct NoopService;

    #[async_trait]
    impl ServiceControl for NoopService {
        async fn restart(&self, _unit: &str) -> pxe_core::Result<()> {
            Ok(())
        }
    }

    const TWO_HOSTS: &str =
        "shared-network provisioning {\n}\ngroup {\nhost web1 {\n}\nhost web2 {\n}\n}\n";

    async fn start(ws: &TestWorkspace) -> (String, tokio::task::JoinHandle<Result<()>>) {
        let handler = CompletionHandler::new(ws.dhcp_conf_path(), "dhcpd", Arc::new(NoopService));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(serve(listener, ListenerState::new(handler)));
        (base, server)
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap()
    }

    async fn stopped(server: tokio::task::JoinHandle<Result<()>>) {
        let joined = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("listener did not stop");
        assert!(joined.unwrap().is_ok());
    }

    #[tokio::test]
    async fn stops_after_last_host_reports() {
        let ws = TestWorkspace::new();
        ws.write("dhcpd.conf", TWO_HOSTS);
        let (base, server) = start(&ws).await;
        let client = client();

        let resp = client
            .get(format!("{base}/installationCompleted?hostname=web1"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "status": "success" }));
        assert!(!ws.dhcp_conf().contains("host web1"));
        assert!(!server.is_finished());

        let resp = client
            .get(format!("{base}/installationCompleted?hostname=web2"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        drop(client);
        stopped(server).await;
        assert!(!ws.dhcp_conf().contains("host "));
    }

    #[tokio::test]
    async fn rejects_bad_requests() {
        let ws = TestWorkspace::new();
        ws.write("dhcpd.conf", TWO_HOSTS);
        let (base, server) = start(&ws).await;
        let client = client();

        let missing = client
            .get(format!("{base}/installationCompleted"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::BAD_REQUEST);

        let unknown = client.get(format!("{base}/status")).send().await.unwrap();
        assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);

        let wrong_method = client
            .post(format!("{base}/installationCompleted?hostname=web1"))
            .send()
            .await
            .unwrap();
        assert_eq!(wrong_method.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

        // nothing was removed
        assert_eq!(ws.dhcp_conf(), TWO_HOSTS);

        let ack = client.get(format!("{base}/shutdown")).send().await.unwrap();
        assert_eq!(ack.status(), reqwest::StatusCode::OK);
        drop(client);
        stopped(server).await;
    }

    #[tokio::test]
    async fn broken_configuration_is_a_server_error() {
        let ws = TestWorkspace::new();
        ws.write("dhcpd.conf", "group {\nhost web1 {\n}\n");
        let (base, server) = start(&ws).await;
        let client = client();

        let resp = client
            .get(format!("{base}/installationCompleted?hostname=web1"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "error");

        client.get(format!("{base}/shutdown")).send().await.unwrap();
        drop(client);
        stopped(server).await;
    }
}
