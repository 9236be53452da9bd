use crate::{commands::command_error::CommandError, resp::RespValue};

/// Handles the ECHO command: replies with its single argument as a bulk
/// string.
pub fn echo(mut arguments: Vec<String>) -> Result<RespValue, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongNumberOfArguments("echo"));
    }

    Ok(RespValue::BulkString(arguments.remove(0)))
}
