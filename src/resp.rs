//! RESP (REdis Serialization Protocol) codec.
//!
//! The parser consumes a buffered byte stream and produces one decoded
//! [`RespValue`] per call; the writer encodes a value back into RESP framing
//! and flushes it to the peer. Commands arrive as arrays of bulk strings and
//! replies are built from the same value type.

use std::{future::Future, pin::Pin};

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum nesting depth accepted by the parser unless overridden.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("unknown RESP type byte: {0:#04x}")]
    UnknownTypeByte(u8),
    #[error("failed to parse integer")]
    InvalidInteger,
    #[error("invalid bulk string length")]
    InvalidBulkLength,
    #[error("invalid array length")]
    InvalidArrayLength,
    #[error("unterminated line")]
    UnterminatedLine,
    #[error("bulk string missing CRLF terminator")]
    MissingBulkTerminator,
    #[error("nesting depth limit exceeded")]
    DepthLimitExceeded,
}

/// A decoded RESP value.
///
/// Null bulk strings and null arrays are distinct variants so that replies
/// can express the difference between an empty collection and an absent one.
#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    NullBulkString,
    Array(Vec<RespValue>),
    NullArray,
}

impl RespValue {
    /// The `+OK\r\n` reply.
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    /// The `+PONG\r\n` reply.
    pub fn pong() -> Self {
        RespValue::SimpleString("PONG".to_string())
    }

    /// Builds an array of bulk strings, the shape of most multi-value replies.
    pub fn from_strings(items: Vec<String>) -> Self {
        RespValue::Array(items.into_iter().map(RespValue::BulkString).collect())
    }

    /// Encodes this value in RESP wire framing.
    ///
    /// Bulk string lengths are byte counts. Callers of `SimpleString` and
    /// `Error` must not embed `\r` or `\n` in the payload.
    pub fn encode(&self) -> String {
        match self {
            RespValue::SimpleString(s) => format!("+{}\r\n", s),
            RespValue::Error(message) => format!("-{}\r\n", message),
            RespValue::Integer(i) => format!(":{}\r\n", i),
            RespValue::BulkString(s) => format!("${}\r\n{}\r\n", s.len(), s),
            RespValue::NullBulkString => "$-1\r\n".to_string(),
            RespValue::Array(elements) => {
                let mut encoded = format!("*{}\r\n", elements.len());
                for element in elements {
                    encoded.push_str(&element.encode());
                }
                encoded
            }
            RespValue::NullArray => "*-1\r\n".to_string(),
        }
    }
}

/// Streaming RESP parser over a buffered reader.
///
/// Each call to [`read_value`](RespParser::read_value) consumes exactly one
/// top-level value from the stream. Any framing error poisons the
/// connection; the caller is expected to close it.
pub struct RespParser<R> {
    reader: R,
    max_depth: usize,
}

impl<R: AsyncBufRead + Unpin + Send> RespParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Overrides the nesting depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Reads one complete RESP value from the stream.
    ///
    /// Returns [`RespError::ConnectionClosed`] when the peer disconnects
    /// cleanly between frames; every other error means the stream can no
    /// longer be trusted.
    pub async fn read_value(&mut self) -> Result<RespValue, RespError> {
        self.parse_value(0).await
    }

    // Recursion is bounded by max_depth; the boxed future breaks the cycle
    // that a plain recursive async fn would create.
    fn parse_value<'a>(
        &'a mut self,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<RespValue, RespError>> + Send + 'a>> {
        Box::pin(async move {
            let type_byte = self.read_type_byte(depth).await?;

            match type_byte {
                b'+' => Ok(RespValue::SimpleString(self.read_line().await?)),
                b'-' => Ok(RespValue::Error(self.read_line().await?)),
                b':' => {
                    let line = self.read_line().await?;
                    let value = line.parse::<i64>().map_err(|_| RespError::InvalidInteger)?;
                    Ok(RespValue::Integer(value))
                }
                b'$' => self.read_bulk_string().await,
                b'*' => {
                    let line = self.read_line().await?;
                    let count = line
                        .parse::<i64>()
                        .map_err(|_| RespError::InvalidArrayLength)?;

                    if count == -1 {
                        return Ok(RespValue::NullArray);
                    }
                    if count < -1 {
                        return Err(RespError::InvalidArrayLength);
                    }
                    if depth + 1 > self.max_depth {
                        return Err(RespError::DepthLimitExceeded);
                    }

                    let mut elements = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        elements.push(self.parse_value(depth + 1).await?);
                    }
                    Ok(RespValue::Array(elements))
                }
                other => Err(RespError::UnknownTypeByte(other)),
            }
        })
    }

    async fn read_type_byte(&mut self, depth: usize) -> Result<u8, RespError> {
        let mut byte = [0u8; 1];
        match self.reader.read_exact(&mut byte).await {
            Ok(_) => Ok(byte[0]),
            // EOF before a frame begins is a clean disconnect.
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof && depth == 0 => {
                Err(RespError::ConnectionClosed)
            }
            Err(err) => Err(RespError::IoError(err.to_string())),
        }
    }

    /// Reads a line up to `\n`, trimming a trailing `\r` if present.
    /// Canonical framing is `\r\n`; a bare `\n` is tolerated.
    async fn read_line(&mut self) -> Result<String, RespError> {
        let mut line = Vec::new();
        self.reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|err| RespError::IoError(err.to_string()))?;

        if line.last() != Some(&b'\n') {
            return Err(RespError::UnterminatedLine);
        }
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        String::from_utf8(line).map_err(|_| RespError::InvalidUtf8)
    }

    async fn read_bulk_string(&mut self) -> Result<RespValue, RespError> {
        let line = self.read_line().await?;
        let length = line
            .parse::<i64>()
            .map_err(|_| RespError::InvalidBulkLength)?;

        if length == -1 {
            return Ok(RespValue::NullBulkString);
        }
        if length < -1 {
            return Err(RespError::InvalidBulkLength);
        }

        // Payload plus the trailing CRLF; a short read fails the frame.
        let mut buffer = vec![0u8; length as usize + 2];
        self.reader
            .read_exact(&mut buffer)
            .await
            .map_err(|err| RespError::IoError(err.to_string()))?;

        if &buffer[length as usize..] != b"\r\n" {
            return Err(RespError::MissingBulkTerminator);
        }
        buffer.truncate(length as usize);

        String::from_utf8(buffer)
            .map(RespValue::BulkString)
            .map_err(|_| RespError::InvalidUtf8)
    }
}

/// Writes encoded RESP values to the outbound half of a connection.
pub struct RespWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> RespWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes `value` and flushes it to the peer.
    pub async fn write(&mut self, value: &RespValue) -> Result<(), RespError> {
        self.writer
            .write_all(value.encode().as_bytes())
            .await
            .map_err(|err| RespError::IoError(err.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|err| RespError::IoError(err.to_string()))
    }
}
