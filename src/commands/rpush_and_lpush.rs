use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

/// Parsed arguments shared by RPUSH and LPUSH: a key plus one or more
/// values.
pub struct PushArguments {
    key: String,
    values: Vec<String>,
}

impl PushArguments {
    pub fn parse(
        mut arguments: Vec<String>,
        command_name: &'static str,
    ) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments(command_name));
        }

        let key = arguments.remove(0);

        Ok(Self {
            key,
            values: arguments,
        })
    }
}

/// Handles RPUSH: appends values at the tail and replies with the new list
/// length. Any clients blocked on the key are served before the store lock
/// is released.
pub async fn rpush(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments, "rpush")?;

    let mut store_guard = store.lock().await;
    let new_len = store_guard.rpush(&push_arguments.key, push_arguments.values);

    Ok(RespValue::Integer(new_len as i64))
}

/// Handles LPUSH: prepends values one by one, so the last argument ends up
/// at the head. Wakes blocked clients the same way RPUSH does.
pub async fn lpush(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments, "lpush")?;

    let mut store_guard = store.lock().await;
    let new_len = store_guard.lpush(&push_arguments.key, push_arguments.values);

    Ok(RespValue::Integer(new_len as i64))
}
