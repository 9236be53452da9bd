use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

/// Handles the GET command.
///
/// A missing or expired key is a null bulk string, not an error. Expired
/// entries are removed by the store during the lookup.
pub async fn get(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongNumberOfArguments("get"));
    }

    let mut store_guard = store.lock().await;

    match store_guard.get(&arguments[0]) {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::NullBulkString),
    }
}
