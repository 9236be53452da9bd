use std::{sync::Arc, time::Duration};

use tokio::sync::{oneshot, Mutex};

use crate::{
    commands::command_error::CommandError,
    resp::RespValue,
    store::Store,
    waiters::PopResult,
};

/// Parsed arguments for BLPOP: one or more keys in priority order, followed
/// by a timeout in seconds.
pub struct BlpopArguments {
    keys: Vec<String>,
    timeout_secs: f64,
}

impl BlpopArguments {
    /// Accepts `BLPOP key [key ...] timeout`.
    ///
    /// The timeout may be fractional; `0` means wait indefinitely. NaN,
    /// infinities and values too large for a `Duration` are rejected along
    /// with anything that does not parse, and a negative timeout gets its
    /// own error.
    pub fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments("blpop"));
        }

        let timeout_raw = arguments
            .pop()
            .ok_or(CommandError::WrongNumberOfArguments("blpop"))?;
        let timeout_secs = timeout_raw
            .parse::<f64>()
            .map_err(|_| CommandError::TimeoutNotAFloat)?;

        // Duration::from_secs_f64 panics on values it cannot represent.
        // The bound itself rounds up past Duration::MAX, so it is excluded.
        if !timeout_secs.is_finite() || timeout_secs >= Duration::MAX.as_secs_f64() {
            return Err(CommandError::TimeoutNotAFloat);
        }
        if timeout_secs < 0.0 {
            return Err(CommandError::NegativeTimeout);
        }

        Ok(Self {
            keys: arguments,
            timeout_secs,
        })
    }
}

/// Handles the BLPOP command.
///
/// Under one store guard the watched keys are scanned in the given order; a
/// hit is popped and returned immediately. Otherwise a waiter is registered
/// on every key under that same guard, so a racing push cannot slip between
/// the failed scan and the registration. The caller then parks on its
/// response slot without holding the lock.
///
/// A timed-out waiter is retired under the lock before the null reply is
/// sent; a value delivered concurrently with retirement is discarded.
pub async fn blpop(
    store: &Arc<Mutex<Store>>,
    arguments: Vec<String>,
) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;

    let (waiter_id, receiver) = {
        let mut store_guard = store.lock().await;

        if let Some((key, value)) = store_guard.pop_first_available(&blpop_arguments.keys) {
            return Ok(RespValue::from_strings(vec![key, value]));
        }

        store_guard.register_waiter(blpop_arguments.keys.clone())
    };

    match wait_for_pop(receiver, blpop_arguments.timeout_secs).await {
        Some((key, value)) => Ok(RespValue::from_strings(vec![key, value])),
        None => {
            let mut store_guard = store.lock().await;
            store_guard.retire_waiter(waiter_id);
            Ok(RespValue::NullArray)
        }
    }
}

/// Parks on the response slot until a value arrives or the deadline passes.
/// A timeout of zero waits forever.
async fn wait_for_pop(receiver: oneshot::Receiver<PopResult>, timeout_secs: f64) -> Option<PopResult> {
    if timeout_secs == 0.0 {
        return receiver.await.ok();
    }

    match tokio::time::timeout(Duration::from_secs_f64(timeout_secs), receiver).await {
        Ok(result) => result.ok(),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_key() {
        let args = BlpopArguments::parse(vec!["mylist".into(), "5".into()]).unwrap();
        assert_eq!(args.keys, vec!["mylist".to_string()]);
        assert_eq!(args.timeout_secs, 5.0);
    }

    #[test]
    fn test_parse_multiple_keys_keep_order() {
        let args =
            BlpopArguments::parse(vec!["a".into(), "b".into(), "c".into(), "0.5".into()])
                .unwrap();
        assert_eq!(
            args.keys,
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(args.timeout_secs, 0.5);
    }

    #[test]
    fn test_parse_rejects_missing_timeout() {
        let result = BlpopArguments::parse(vec!["mylist".into()]);
        assert_eq!(
            result.err(),
            Some(CommandError::WrongNumberOfArguments("blpop"))
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric_timeout() {
        let result = BlpopArguments::parse(vec!["mylist".into(), "soon".into()]);
        assert_eq!(result.err(), Some(CommandError::TimeoutNotAFloat));
    }

    #[test]
    fn test_parse_rejects_infinite_timeout() {
        let result = BlpopArguments::parse(vec!["mylist".into(), "inf".into()]);
        assert_eq!(result.err(), Some(CommandError::TimeoutNotAFloat));
    }

    #[test]
    fn test_parse_rejects_timeout_too_large_for_a_duration() {
        let result = BlpopArguments::parse(vec!["mylist".into(), "1e300".into()]);
        assert_eq!(result.err(), Some(CommandError::TimeoutNotAFloat));
    }

    #[test]
    fn test_parse_rejects_negative_timeout() {
        let result = BlpopArguments::parse(vec!["mylist".into(), "-1".into()]);
        assert_eq!(result.err(), Some(CommandError::NegativeTimeout));
    }

    #[tokio::test]
    async fn test_wait_for_pop_times_out() {
        let (_sender, receiver) = oneshot::channel::<PopResult>();

        let result = wait_for_pop(receiver, 0.01).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_wait_for_pop_receives_before_deadline() {
        let (sender, receiver) = oneshot::channel::<PopResult>();
        let _ = sender.send(("q".to_string(), "v".to_string()));

        let result = wait_for_pop(receiver, 5.0).await;
        assert_eq!(result, Some(("q".to_string(), "v".to_string())));
    }

    #[tokio::test]
    async fn test_wait_for_pop_zero_timeout_waits_for_delivery() {
        let (sender, receiver) = oneshot::channel::<PopResult>();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = sender.send(("q".to_string(), "v".to_string()));
        });

        let result = wait_for_pop(receiver, 0.0).await;
        assert_eq!(result, Some(("q".to_string(), "v".to_string())));
    }

    #[tokio::test]
    async fn test_wait_for_pop_closed_slot_reads_as_timeout() {
        let (sender, receiver) = oneshot::channel::<PopResult>();
        drop(sender);

        let result = wait_for_pop(receiver, 1.0).await;
        assert!(result.is_none());
    }
}
