//! Per-connection request loop.

use std::sync::Arc;

use tokio::{io::BufReader, net::TcpStream, sync::Mutex};
use tracing::{debug, error};

use crate::{
    commands::CommandHandler,
    resp::{RespError, RespParser, RespWriter},
    store::Store,
};

/// Drives one client connection until the peer disconnects or breaks
/// framing.
///
/// Command-level failures are reported to the client as `-ERR` replies and
/// the loop continues; protocol and transport errors close the socket.
pub async fn handle_connection(stream: TcpStream, store: Arc<Mutex<Store>>) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (read_half, write_half) = stream.into_split();
    let mut parser = RespParser::new(BufReader::new(read_half));
    let mut writer = RespWriter::new(write_half);

    loop {
        let frame = match parser.read_value().await {
            Ok(frame) => frame,
            Err(RespError::ConnectionClosed) => {
                debug!(peer = %peer, "client disconnected");
                return;
            }
            Err(err) => {
                error!(peer = %peer, cause = %err, "protocol error, closing connection");
                return;
            }
        };

        let reply = match CommandHandler::new(frame) {
            Ok(command) => match command.handle_command(&store).await {
                Ok(reply) => reply,
                Err(err) => err.as_reply(),
            },
            Err(err) => err.as_reply(),
        };

        if let Err(err) = writer.write(&reply).await {
            error!(peer = %peer, cause = %err, "failed to write reply");
            return;
        }
    }
}
