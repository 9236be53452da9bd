use thiserror::Error;

use crate::resp::RespValue;

/// Command-level failures. These are reported to the client as `-ERR`
/// replies; the connection keeps going.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(&'static str),
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("syntax error")]
    SyntaxError,
    #[error("timeout is not a float or out of range")]
    TimeoutNotAFloat,
    #[error("timeout is negative")]
    NegativeTimeout,
}

impl CommandError {
    /// The RESP error reply for this failure.
    pub fn as_reply(&self) -> RespValue {
        RespValue::Error(format!("ERR {}", self))
    }
}
