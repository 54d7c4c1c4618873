// SPDX-FileCopyrightText: 2026 SQRL Client Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event Relay
//!
//! Callbacks for long-running core operations, built for UI consumers whose
//! lifecycle detaches and reattaches listeners. While no handler is
//! attached, the relay buffers the latest event of each kind; attaching
//! flushes the buffer in kind order, so a consumer that comes back always
//! sees the most recent state.

use std::sync::{Arc, Mutex};

/// Events emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqrlEvent {
    /// Password KDF progress, 0-100.
    KdfProgress {
        /// Percent complete.
        percent: u32,
    },

    /// A `query` round-trip finished.
    QueryCompleted {
        /// Whether the server knows this identity.
        account_exists: bool,
    },

    /// An `ident` round-trip finished.
    IdentCompleted,

    /// Error event for operations running off the caller's thread.
    Error {
        /// Error description.
        message: String,
    },
}

impl SqrlEvent {
    fn kind(&self) -> EventKind {
        match self {
            SqrlEvent::KdfProgress { .. } => EventKind::KdfProgress,
            SqrlEvent::QueryCompleted { .. } => EventKind::QueryCompleted,
            SqrlEvent::IdentCompleted => EventKind::IdentCompleted,
            SqrlEvent::Error { .. } => EventKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    KdfProgress,
    QueryCompleted,
    IdentCompleted,
    Error,
}

/// Event handler trait.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: SqrlEvent);
}

/// Simple callback-based event handler.
pub struct CallbackHandler<F>
where
    F: Fn(SqrlEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(SqrlEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(SqrlEvent) + Send + Sync,
{
    fn on_event(&self, event: SqrlEvent) {
        (self.callback)(event);
    }
}

#[derive(Default)]
struct RelayInner {
    handler: Option<Arc<dyn EventHandler>>,
    pending: Vec<SqrlEvent>,
}

/// Latest-value event relay with attach/detach semantics.
#[derive(Default)]
pub struct EventRelay {
    inner: Mutex<RelayInner>,
}

impl EventRelay {
    /// Creates a detached relay with an empty buffer.
    pub fn new() -> Self {
        EventRelay::default()
    }

    /// Attaches a handler, delivering any buffered events first.
    pub fn attach(&self, handler: Arc<dyn EventHandler>) {
        let buffered = {
            let mut inner = self.inner.lock().expect("relay mutex poisoned");
            inner.handler = Some(Arc::clone(&handler));
            std::mem::take(&mut inner.pending)
        };
        // Deliver outside the lock so a handler may post or re-attach
        for event in buffered {
            handler.on_event(event);
        }
    }

    /// Detaches the current handler; subsequent events are buffered.
    pub fn detach(&self) {
        self.inner.lock().expect("relay mutex poisoned").handler = None;
    }

    /// Posts an event: delivered immediately when a handler is attached,
    /// otherwise it replaces any buffered event of the same kind.
    pub fn post(&self, event: SqrlEvent) {
        let handler = {
            let mut inner = self.inner.lock().expect("relay mutex poisoned");
            match &inner.handler {
                Some(handler) => Some(Arc::clone(handler)),
                None => {
                    let kind = event.kind();
                    inner.pending.retain(|e| e.kind() != kind);
                    inner.pending.push(event.clone());
                    None
                }
            }
        };
        if let Some(handler) = handler {
            handler.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct Recorder {
        seen: StdMutex<Vec<SqrlEvent>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Recorder {
                seen: StdMutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<SqrlEvent> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl EventHandler for Recorder {
        fn on_event(&self, event: SqrlEvent) {
            self.seen.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_attached_handler_sees_events_live() {
        let relay = EventRelay::new();
        let recorder = Recorder::new();
        relay.attach(recorder.clone());

        relay.post(SqrlEvent::KdfProgress { percent: 50 });
        assert_eq!(
            recorder.events(),
            vec![SqrlEvent::KdfProgress { percent: 50 }]
        );
    }

    #[test]
    fn test_detached_relay_keeps_latest_per_kind() {
        let relay = EventRelay::new();
        relay.post(SqrlEvent::KdfProgress { percent: 10 });
        relay.post(SqrlEvent::KdfProgress { percent: 90 });
        relay.post(SqrlEvent::IdentCompleted);

        let recorder = Recorder::new();
        relay.attach(recorder.clone());

        // Only the latest KdfProgress survived the buffering
        assert_eq!(
            recorder.events(),
            vec![
                SqrlEvent::KdfProgress { percent: 90 },
                SqrlEvent::IdentCompleted
            ]
        );
    }

    #[test]
    fn test_detach_returns_to_buffering() {
        let relay = EventRelay::new();
        let first = Recorder::new();
        relay.attach(first.clone());
        relay.detach();

        relay.post(SqrlEvent::Error {
            message: "boom".to_string(),
        });
        assert!(first.events().is_empty());

        let second = Recorder::new();
        relay.attach(second.clone());
        assert_eq!(second.events().len(), 1);
    }
}
