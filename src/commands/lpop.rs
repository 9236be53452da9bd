use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

/// Parsed arguments for LPOP: a key and an optional element count.
pub struct LpopArguments {
    key: String,
    count: Option<i64>,
}

impl LpopArguments {
    pub fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() || arguments.len() > 2 {
            return Err(CommandError::WrongNumberOfArguments("lpop"));
        }

        let count = match arguments.get(1) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| CommandError::NotAnInteger)?),
            None => None,
        };

        Ok(Self {
            key: arguments.remove(0),
            count,
        })
    }
}

/// Handles the LPOP command.
///
/// Without a count the reply is a single bulk string, or a null bulk string
/// when the list is empty or missing. With a count the reply is always an
/// array, possibly empty.
pub async fn lpop(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;

    match lpop_arguments.count {
        None => match store_guard.lpop_one(&lpop_arguments.key) {
            Some(value) => Ok(RespValue::BulkString(value)),
            None => Ok(RespValue::NullBulkString),
        },
        Some(count) => Ok(RespValue::from_strings(
            store_guard.lpop_many(&lpop_arguments.key, count),
        )),
    }
}
