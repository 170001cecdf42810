//! Webhook receive-and-echo endpoint state.

use std::sync::Mutex;

use serde_json::{Map, Value};

/// Holds the most recent webhook delivery for later inspection.
pub struct WebhookInbox {
    last: Mutex<Value>,
}

impl WebhookInbox {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(Value::Object(Map::new())),
        }
    }

    /// Replace the stored delivery with `payload`.
    pub fn record(&self, payload: Value) {
        *self.last.lock().expect("webhook inbox mutex poisoned") = payload;
    }

    /// The most recent delivery, or an empty object before the first.
    pub fn latest(&self) -> Value {
        self.last.lock().expect("webhook inbox mutex poisoned").clone()
    }
}

impl Default for WebhookInbox {
    fn default() -> Self {
        Self::new()
    }
}
