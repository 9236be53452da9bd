use crate::{commands::command_error::CommandError, resp::RespValue};

/// Handles the PING command.
///
/// Without arguments the reply is the simple string `PONG`; with one
/// argument the server echoes it back as a bulk string.
pub fn ping(mut arguments: Vec<String>) -> Result<RespValue, CommandError> {
    match arguments.len() {
        0 => Ok(RespValue::pong()),
        1 => Ok(RespValue::BulkString(arguments.remove(0))),
        _ => Err(CommandError::WrongNumberOfArguments("ping")),
    }
}
