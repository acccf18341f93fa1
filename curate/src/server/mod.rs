pub mod route;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::server::route::server_router;
use crate::types::params::ServerParams;
use crate::{CurateError, CurateResult};

/// Binds the health endpoint and serves it from a separate task.
///
/// Binding happens before this returns, so a port that is taken is reported here. The task only
/// ever finishes when serving fails.
///
/// # Arguments
/// * `server_params` - Host and port to bind. Port 0 picks a free port.
///
/// # Returns
/// * `SocketAddr` - The address actually bound.
/// * `JoinHandle<std::io::Result<()>>` - The serving task.
pub async fn setup_server(server_params: &ServerParams) -> CurateResult<(SocketAddr, JoinHandle<std::io::Result<()>>)> {
    let (address, listener) = get_server_url(server_params).await?;

    let task_handle = tokio::spawn(async move { axum::serve(listener, server_router()).await });

    info!(address = %address, "Health server listening");
    Ok((address, task_handle))
}

pub(crate) async fn get_server_url(server_params: &ServerParams) -> CurateResult<(SocketAddr, TcpListener)> {
    let address = format!("{}:{}", server_params.host, server_params.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| CurateError::ServerError(format!("Failed to bind {}: {}", address, e)))?;
    let local_address = listener.local_addr()?;

    Ok((local_address, listener))
}
