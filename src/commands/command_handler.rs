use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{
        blpop::blpop,
        command_error::CommandError,
        echo::echo,
        get::get,
        llen::llen,
        lpop::lpop,
        lrange::lrange,
        ping::ping,
        rpush_and_lpush::{lpush, rpush},
        set::set,
    },
    resp::RespValue,
    store::Store,
};

/// A decoded command: the dispatch name in canonical uppercase, the name as
/// the client typed it, and the raw arguments.
///
/// Built from the RESP array a client sends; dispatches to the handler for
/// the named command and yields one reply value.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub raw_name: String,
    pub arguments: Vec<String>,
}

impl CommandHandler {
    /// Parses a top-level RESP frame into a command.
    ///
    /// Commands must arrive as a non-empty array of bulk strings; anything
    /// else is answered with a syntax error rather than closing the
    /// connection.
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = input else {
            return Err(CommandError::SyntaxError);
        };

        let mut parts: Vec<String> = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                RespValue::BulkString(s) => parts.push(s),
                _ => return Err(CommandError::SyntaxError),
            }
        }

        if parts.is_empty() {
            return Err(CommandError::SyntaxError);
        }

        let raw_name = parts.remove(0);
        let name = raw_name.to_uppercase();

        Ok(Self {
            name,
            raw_name,
            arguments: parts,
        })
    }

    /// Executes the command against the shared store.
    ///
    /// Only BLPOP may suspend; every other command completes without
    /// yielding once it holds the store lock.
    pub async fn handle_command(
        &self,
        store: &Arc<Mutex<Store>>,
    ) -> Result<RespValue, CommandError> {
        match self.name.as_str() {
            "PING" => ping(self.arguments.clone()),
            "ECHO" => echo(self.arguments.clone()),
            "GET" => get(store, self.arguments.clone()).await,
            "SET" => set(store, self.arguments.clone()).await,
            "RPUSH" => rpush(store, self.arguments.clone()).await,
            "LPUSH" => lpush(store, self.arguments.clone()).await,
            "LRANGE" => lrange(store, self.arguments.clone()).await,
            "LLEN" => llen(store, self.arguments.clone()).await,
            "LPOP" => lpop(store, self.arguments.clone()).await,
            "BLPOP" => blpop(store, self.arguments.clone()).await,
            // The error echoes the name as the client typed it.
            _ => Err(CommandError::UnknownCommand(self.raw_name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(parts: &[&str]) -> RespValue {
        RespValue::Array(
            parts
                .iter()
                .map(|part| RespValue::BulkString(part.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_command_name_is_uppercased_for_dispatch() {
        let command = CommandHandler::new(frame(&["get", "mykey"])).unwrap();
        assert_eq!(command.name, "GET");
        assert_eq!(command.raw_name, "get");
        assert_eq!(command.arguments, vec!["mykey".to_string()]);
    }

    #[test]
    fn test_rejects_non_array_frames() {
        let result = CommandHandler::new(RespValue::SimpleString("PING".to_string()));
        assert_eq!(result, Err(CommandError::SyntaxError));
    }

    #[test]
    fn test_rejects_non_bulk_elements() {
        let input = RespValue::Array(vec![RespValue::Integer(1)]);
        assert_eq!(CommandHandler::new(input), Err(CommandError::SyntaxError));
    }

    #[test]
    fn test_rejects_empty_array() {
        let input = RespValue::Array(vec![]);
        assert_eq!(CommandHandler::new(input), Err(CommandError::SyntaxError));
    }
}
