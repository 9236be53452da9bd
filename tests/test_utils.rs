use std::sync::Arc;

use tokio::{sync::Mutex, task::JoinHandle};

use redlite::{commands::CommandHandler, resp::RespValue, store::Store};

/// Shared helpers for the black-box command tests.
pub struct TestEnv {
    pub store: Arc<Mutex<Store>>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::new())),
        }
    }

    pub fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }

    /// Runs one command through the same path a connection would use and
    /// returns the reply value, folding command errors into their `-ERR`
    /// reply form.
    pub async fn exec(&self, parts: &[&str]) -> RespValue {
        match CommandHandler::new(command_frame(parts)) {
            Ok(command) => match command.handle_command(&self.store).await {
                Ok(reply) => reply,
                Err(err) => err.as_reply(),
            },
            Err(err) => err.as_reply(),
        }
    }

    /// Spawns a command on its own task, the way each client connection runs
    /// on its own task in the server.
    pub fn spawn(&self, parts: &[&str]) -> JoinHandle<RespValue> {
        let env = self.clone();
        let parts: Vec<String> = parts.iter().map(|part| part.to_string()).collect();

        tokio::spawn(async move {
            let borrowed: Vec<&str> = parts.iter().map(|part| part.as_str()).collect();
            env.exec(&borrowed).await
        })
    }
}

/// Builds the RESP frame for a command, an array of bulk strings.
pub fn command_frame(parts: &[&str]) -> RespValue {
    RespValue::Array(
        parts
            .iter()
            .map(|part| RespValue::BulkString(part.to_string()))
            .collect(),
    )
}

/// Expected reply shape for multi-value results.
pub fn bulk_array(items: &[&str]) -> RespValue {
    RespValue::Array(
        items
            .iter()
            .map(|item| RespValue::BulkString(item.to_string()))
            .collect(),
    )
}

pub fn bulk(value: &str) -> RespValue {
    RespValue::BulkString(value.to_string())
}

pub fn error_reply(message: &str) -> RespValue {
    RespValue::Error(format!("ERR {}", message))
}
