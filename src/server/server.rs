use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Router};
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::records::{update_records, RecordStore};
use crate::render::render_page;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Clone)]
struct AppState {
    store: Arc<dyn RecordStore>,
    // serializes the load-update-save cycle; the store itself is lock-free
    update_lock: Arc<Mutex<()>>,
}

#[derive(Debug, Deserialize)]
struct CallerParams {
    caller: Option<String>,
}

pub struct CallhomeServer {
    store: Arc<dyn RecordStore>,
}

impl CallhomeServer {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CallhomeServer { store }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            update_lock: Arc::new(Mutex::new(())),
        };

        Router::new()
            .route("/", axum::routing::any(callhome_handler))
            .with_state(state)
    }

    pub async fn start(&self, host: &str, port: u16) -> Result<(), ServerError> {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;

        info!("callhome listening on http://{}", addr);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

        info!("callhome shut down");

        Ok(())
    }
}

/// Accepts any method. The `caller` parameter (query string first, then an
/// urlencoded form field) overrides the peer address for testing; whatever
/// candidate wins must parse as an IP address or it is echoed straight back.
async fn callhome_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(query): Query<CallerParams>,
    form: Option<Form<CallerParams>>,
) -> Response {
    let candidate = query
        .caller
        .or_else(|| form.and_then(|Form(params)| params.caller))
        .unwrap_or_else(|| peer.ip().to_string());

    if candidate.parse::<IpAddr>().is_err() {
        debug!("not an address, echoing back: {:?}", candidate);
        return candidate.into_response();
    }

    let _guard = state.update_lock.lock().await;

    match update_records(state.store.as_ref(), &candidate) {
        Ok(records) => {
            debug!("recorded ping from {}", candidate);
            Html(render_page(&records)).into_response()
        }
        Err(err) => {
            error!("record update failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("record update failed: {}", err),
            )
                .into_response()
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                error!("failed to install SIGTERM handler: {}", err);
                let _ = signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM");
            }
            _ = signal::ctrl_c() => {
                info!("received Ctrl+C");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        info!("received Ctrl+C");
    }
}
