//! HTTP control plane
//!
//! ## Endpoints
//!
//! - `POST /kill` - form fields `pid`, `port` or `service`
//!
//! ```bash
//! curl -d pid=4242 http://127.0.0.1:8080/kill
//! curl -d service=api http://127.0.0.1:8080/kill
//! ```
//!
//! Responses are plain text. Port-based killing answers 501.

use axum::{
    extract::{rejection::FormRejection, DefaultBodyLimit, Form, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use nix::unistd::Pid;
use tokio::net::TcpListener;

use crate::manager::{is_own_pid, process_exists, terminate_process, SharedRegistry};
use crate::protocol::{KillForm, Selector, KILL_PATH, MAX_BODY_BYTES};

/// Build the control-plane router over a shared registry
pub fn router(registry: SharedRegistry) -> Router {
    Router::new()
        .route(KILL_PATH, any(kill))
        .with_state(registry)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Serve the control plane until SIGINT/SIGTERM
pub async fn serve(listener: TcpListener, registry: SharedRegistry) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Control plane listening on {}", addr);
    }
    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    log::info!("Shutdown signal received, stopping control plane");
}

async fn kill(
    method: Method,
    State(registry): State<SharedRegistry>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<String, ControlError> {
    if method != Method::POST {
        return Err(ControlError::BadRequest("Invalid request method".into()));
    }

    let Form(pairs) = form.map_err(|e| {
        log::debug!("Rejected kill request: {}", e);
        ControlError::BadRequest("Failed to parse form data".into())
    })?;
    let form: KillForm = pairs.into_iter().collect();

    match form.selector() {
        Some(Selector::Pid(raw)) => kill_by_pid(&raw),
        Some(Selector::Port(_)) => Err(ControlError::NotImplemented(
            "Port-based service killing is not implemented".into(),
        )),
        Some(Selector::Service(name)) => kill_by_service(&registry, &name).await,
        None => Err(ControlError::BadRequest(
            "No valid parameters found in request".into(),
        )),
    }
}

fn kill_by_pid(raw: &str) -> Result<String, ControlError> {
    let invalid = || ControlError::BadRequest(format!("Invalid PID: {}", raw));

    let pid = raw.parse::<i32>().map(Pid::from_raw).map_err(|_| invalid())?;
    if is_own_pid(pid) || !process_exists(pid) {
        return Err(invalid());
    }

    terminate_process(pid).map_err(|e| {
        log::error!("{}", e);
        ControlError::Internal(format!("Failed to kill service with PID {}", pid))
    })?;

    log::info!("Killed PID {}", pid);
    Ok(format!("Killed service with PID {}\n", pid))
}

async fn kill_by_service(registry: &SharedRegistry, name: &str) -> Result<String, ControlError> {
    let mut pids = registry.lock().await;

    let pid = *pids
        .get(name)
        .ok_or_else(|| ControlError::NotFound(format!("Service {} not found", name)))?;

    if !process_exists(pid) {
        pids.remove(name);
        return Err(ControlError::NotFound(format!(
            "Service {} was not running",
            name
        )));
    }

    terminate_process(pid).map_err(|e| {
        log::error!("{}: {}", name, e);
        ControlError::Internal(format!("Failed to kill service {} with PID {}", name, pid))
    })?;

    log::info!("Killed service {} (PID {})", name, pid);
    Ok(format!("Killed service {} with PID {}\n", name, pid))
}

/// Control-plane failures, each mapped to an HTTP status
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    NotImplemented(String),
}

impl ControlError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        (self.status(), format!("{}\n", self)).into_response()
    }
}
