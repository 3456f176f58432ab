use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};

use super::AdapterError;

/// Runs an adapter call, giving up after `timeout`.
///
/// With a limit the call runs on a helper thread; when the limit expires the
/// caller gets [`AdapterError::Timeout`] and the helper is left to finish on
/// its own (its result is discarded). `None` runs the call inline. A panic
/// in `f` becomes [`AdapterError::Unavailable`] either way.
pub fn call_with_timeout<T, F>(timeout: Option<Duration>, f: F) -> Result<T, AdapterError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AdapterError> + Send + 'static,
{
    let Some(limit) = timeout else {
        return catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| Err(panicked()));
    };

    let (tx, rx) = bounded(1);
    let span = tracing::Span::current();

    thread::Builder::new()
        .name("lucio-adapter".to_string())
        .spawn(move || {
            let result = span.in_scope(f);
            // Receiver is gone when the caller already timed out.
            let _ = tx.send(result);
        })
        .map_err(|e| AdapterError::Unavailable(format!("failed to spawn adapter thread: {}", e)))?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "Adapter call timed out");
            Err(AdapterError::Timeout(limit))
        }
        Err(RecvTimeoutError::Disconnected) => Err(panicked()),
    }
}

fn panicked() -> AdapterError {
    AdapterError::Unavailable("adapter call panicked".to_string())
}
