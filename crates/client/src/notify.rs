// User-visible failure notifications.

use tracing::warn;

/// Transient, non-blocking notification sink (a toast in a UI, stderr in a
/// terminal).
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Routes notifications to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!(notification = %message, "user notification");
    }
}

/// Keeps every notification in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryNotifier {
    messages: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MemoryNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

#[cfg(test)]
impl Notifier for MemoryNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
