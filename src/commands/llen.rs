use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

/// Handles the LLEN command: the list length, or 0 for a missing key.
pub async fn llen(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongNumberOfArguments("llen"));
    }

    let store_guard = store.lock().await;

    Ok(RespValue::Integer(store_guard.llen(&arguments[0]) as i64))
}
