//! Event channel abstraction over the dashboard socket

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Callback invoked with each payload pushed on a subscribed event
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Builds the reply payload for a request event
pub type Responder = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Handle returned by `subscribe`, used to remove the handler again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("cannot emit '{event}': channel is disconnected")]
    Disconnected { event: String },
}

/// Persistent push connection to the backend
///
/// Connect/disconnect lifecycle belongs to whoever owns the concrete
/// channel; consumers only subscribe and emit.
pub trait EventChannel: Send + Sync {
    fn is_connected(&self) -> bool;

    fn subscribe(&self, event: &str, handler: Handler) -> SubscriptionToken;

    /// Returns false if the token was already removed
    fn unsubscribe(&self, token: SubscriptionToken) -> bool;

    /// Fire-and-forget send
    fn emit(&self, event: &str, payload: Value) -> Result<(), TelemetryError>;
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Inner {
    connected: bool,
    next_token: u64,
    handlers: Vec<(SubscriptionToken, String, Handler)>,
    /// request event -> (reply event, responder)
    responders: HashMap<String, (String, Responder)>,
}

/// In-process channel
///
/// Server pushes are simulated with `deliver`; request events registered via
/// `respond_to` answer with exactly one reply on their reply event.
#[derive(Default)]
pub struct LocalChannel {
    inner: Mutex<Inner>,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self) {
        lock(&self.inner).connected = true;
        log::debug!("local channel connected");
    }

    pub fn disconnect(&self) {
        lock(&self.inner).connected = false;
        log::debug!("local channel disconnected");
    }

    /// Answer every `request_event` with one `reply_event` push
    pub fn respond_to<F>(&self, request_event: &str, reply_event: &str, responder: F)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let responder: Responder = Arc::new(responder);
        lock(&self.inner)
            .responders
            .insert(request_event.to_string(), (reply_event.to_string(), responder));
    }

    /// Push a payload to every handler of `event`; returns how many ran
    pub fn deliver(&self, event: &str, payload: &Value) -> usize {
        // Handlers run outside the lock so they may subscribe or emit
        let handlers: Vec<Handler> = lock(&self.inner)
            .handlers
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect();

        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        lock(&self.inner)
            .handlers
            .iter()
            .filter(|(_, name, _)| name == event)
            .count()
    }
}

impl EventChannel for LocalChannel {
    fn is_connected(&self) -> bool {
        lock(&self.inner).connected
    }

    fn subscribe(&self, event: &str, handler: Handler) -> SubscriptionToken {
        let mut inner = lock(&self.inner);
        let token = SubscriptionToken(inner.next_token);
        inner.next_token += 1;
        inner.handlers.push((token, event.to_string(), handler));
        token
    }

    fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.handlers.len();
        inner.handlers.retain(|(t, _, _)| *t != token);
        inner.handlers.len() != before
    }

    fn emit(&self, event: &str, payload: Value) -> Result<(), TelemetryError> {
        let reply = {
            let inner = lock(&self.inner);
            if !inner.connected {
                return Err(TelemetryError::Disconnected {
                    event: event.to_string(),
                });
            }
            inner
                .responders
                .get(event)
                .map(|(reply_event, responder)| (reply_event.clone(), Arc::clone(responder)))
        };

        match reply {
            Some((reply_event, responder)) => {
                let response = responder(&payload);
                self.deliver(&reply_event, &response);
            }
            None => log::trace!("no responder for '{}'", event),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: &Arc<AtomicUsize>) -> Handler {
        let counter = Arc::clone(counter);
        Arc::new(move |_: &Value| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_emit_requires_connection() {
        let channel = LocalChannel::new();
        let err = channel.emit("ping", Value::Null).unwrap_err();
        assert_eq!(err, TelemetryError::Disconnected { event: "ping".to_string() });

        channel.connect();
        assert!(channel.emit("ping", Value::Null).is_ok());

        channel.disconnect();
        assert!(!channel.is_connected());
    }

    #[test]
    fn test_request_gets_exactly_one_reply() {
        let channel = LocalChannel::new();
        channel.connect();
        channel.respond_to("ping", "pong", |_| json!({"ok": true}));

        let replies = Arc::new(AtomicUsize::new(0));
        channel.subscribe("pong", counting_handler(&replies));

        channel.emit("ping", Value::Null).unwrap();
        assert_eq!(replies.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let channel = LocalChannel::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let token = channel.subscribe("tick", counting_handler(&hits));

        assert_eq!(channel.deliver("tick", &Value::Null), 1);
        assert!(channel.unsubscribe(token));
        assert!(!channel.unsubscribe(token));
        assert_eq!(channel.deliver("tick", &Value::Null), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
