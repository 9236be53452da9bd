use std::sync::Arc;

use tokio::{net::TcpListener, sync::Mutex};
use tracing::error;

use redlite::{server, store::Store};

const LISTEN_ADDR: &str = "0.0.0.0:6379";

/// Entry point: bind the fixed Redis port and serve until killed.
///
/// The process exits with code 1 when the port cannot be bound.
#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt::try_init();

    let listener = match TcpListener::bind(LISTEN_ADDR).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(cause = %err, addr = LISTEN_ADDR, "failed to bind TCP listener");
            std::process::exit(1);
        }
    };

    let store = Arc::new(Mutex::new(Store::new()));
    server::run(listener, store).await;
}
