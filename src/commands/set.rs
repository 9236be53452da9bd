use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

/// Parsed arguments for SET: key, value and an optional PX expiry.
pub struct SetArguments {
    key: String,
    value: String,
    ttl: Option<Duration>,
}

impl SetArguments {
    /// Accepts `SET key value` and `SET key value PX <ms>`.
    ///
    /// `PX` is matched case-insensitively; any other option, or the bare
    /// three-argument form, is a syntax error.
    pub fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        match arguments.len() {
            0 | 1 => return Err(CommandError::WrongNumberOfArguments("set")),
            2 | 4 => {}
            _ => return Err(CommandError::SyntaxError),
        }

        let mut ttl = None;

        if arguments.len() == 4 {
            if !arguments[2].eq_ignore_ascii_case("px") {
                return Err(CommandError::SyntaxError);
            }

            let milliseconds = arguments[3]
                .parse::<u64>()
                .map_err(|_| CommandError::NotAnInteger)?;
            ttl = Some(Duration::from_millis(milliseconds));
        }

        let value = arguments.swap_remove(1);
        let key = arguments.swap_remove(0);

        Ok(Self { key, value, ttl })
    }
}

/// Handles the SET command. Overwrites any previous entry under the key,
/// whatever its TTL state was.
pub async fn set(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    store_guard.set(set_arguments.key, set_arguments.value, set_arguments.ttl);

    Ok(RespValue::ok())
}
