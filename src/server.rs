//! TCP accept loop.

use std::sync::Arc;

use tokio::{net::TcpListener, sync::Mutex};
use tracing::{debug, error, info};

use crate::{connection::handle_connection, store::Store};

/// Accepts connections forever, handing each one to its own task. All
/// connections share the one store.
///
/// Taking an already-bound listener keeps the function testable: callers
/// bind the fixed production port or an ephemeral one.
pub async fn run(listener: TcpListener, store: Arc<Mutex<Store>>) {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "accepting inbound connections");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(peer = %addr, "accepted connection");
                let store = Arc::clone(&store);

                tokio::spawn(async move {
                    handle_connection(stream, store).await;
                });
            }
            Err(err) => {
                error!(cause = %err, "failed to accept connection");
            }
        }
    }
}
