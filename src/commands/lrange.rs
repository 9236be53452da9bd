use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

/// Parsed arguments for LRANGE: key plus signed start and stop indices.
pub struct LrangeArguments {
    key: String,
    start: i64,
    stop: i64,
}

impl LrangeArguments {
    pub fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::WrongNumberOfArguments("lrange"));
        }

        let start = arguments[1]
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;
        let stop = arguments[2]
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;

        Ok(Self {
            key: arguments.remove(0),
            start,
            stop,
        })
    }
}

/// Handles the LRANGE command. Index normalization and clamping live in the
/// store; a missing key or an empty range is an empty array.
pub async fn lrange(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let store_guard = store.lock().await;
    let elements = store_guard.lrange(
        &lrange_arguments.key,
        lrange_arguments.start,
        lrange_arguments.stop,
    );

    Ok(RespValue::from_strings(elements))
}
