//! Test support shared by the HIM console crates: a fake backend and a
//! helper for serving any axum router on an ephemeral local port.

pub mod backend;
pub mod fixtures;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub use backend::{
    MockBackend, RecordedRequest, ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_PHONE, DEV_OTP, HELPER_EMAIL,
    HELPER_PASSWORD,
};

/// A router served on `127.0.0.1`; shut down when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_router(app: Router) -> std::io::Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = server.await {
            tracing::warn!(error = %e, "test server stopped with error");
        }
    });

    Ok(TestServer {
        addr,
        base_url: format!("http://{addr}"),
        shutdown: Some(shutdown_tx),
    })
}
