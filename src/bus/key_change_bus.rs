use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

use crate::ListenerHandle;
use crate::StoreEngine;

/// Bounded fan-out buffer per subscriber; slow subscribers observe a
/// `Lagged` event instead of blocking the store's callback thread.
const BUS_CHANNEL_CAPACITY: usize = 256;

struct SharedSource {
    tx: broadcast::Sender<String>,
    /// The single native registration with the backing store; dropping it
    /// deregisters the listener.
    _registration: ListenerHandle,
    subscribers: usize,
}

struct BusInner {
    engine: Arc<dyn StoreEngine>,
    shared: Mutex<Option<SharedSource>>,
}

/// Multicast stream of changed key names over one backing engine.
///
/// Owns exactly one listener registration with the store, shared by all
/// subscribers. Subscribers see events from their subscription point
/// forward only; the sequence itself lives for the lifetime of the bus.
#[derive(Clone)]
pub struct KeyChangeBus {
    inner: Arc<BusInner>,
}

impl KeyChangeBus {
    pub fn new(engine: Arc<dyn StoreEngine>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                engine,
                shared: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to the live key stream.
    ///
    /// The first subscription registers the native listener; delivery is
    /// serialized through the shared broadcast sender, so it is safe for
    /// the store to fire its callback from an arbitrary thread.
    pub fn subscribe(&self) -> KeySubscription {
        let mut shared = self.inner.shared.lock();
        let source = shared.get_or_insert_with(|| {
            debug!("first subscriber, registering native store listener");
            let (tx, _) = broadcast::channel(BUS_CHANNEL_CAPACITY);
            let fan_out = tx.clone();
            let registration = self.inner.engine.register_listener(Arc::new(move |key: &str| {
                // send only fails when no subscriber is alive; nothing to deliver then
                let _ = fan_out.send(key.to_string());
            }));
            SharedSource {
                tx,
                _registration: registration,
                subscribers: 0,
            }
        });
        source.subscribers += 1;
        let rx = source.tx.subscribe();
        KeySubscription {
            stream: BroadcastStream::new(rx),
            _guard: SubscriberGuard {
                inner: self.inner.clone(),
            },
        }
    }

    /// Inject a synthetic change event, used by the accessor to fan a
    /// bulk clear out as one event per previously-present key.
    pub fn publish(
        &self,
        key: &str,
    ) {
        let shared = self.inner.shared.lock();
        if let Some(source) = shared.as_ref() {
            let _ = source.tx.send(key.to_string());
        }
    }

    /// Whether the native listener registration currently exists
    pub fn has_source(&self) -> bool {
        self.inner.shared.lock().is_some()
    }
}

impl std::fmt::Debug for KeyChangeBus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let subscribers = self
            .inner
            .shared
            .lock()
            .as_ref()
            .map(|s| s.subscribers)
            .unwrap_or(0);
        f.debug_struct("KeyChangeBus")
            .field("subscribers", &subscribers)
            .finish()
    }
}

struct SubscriberGuard {
    inner: Arc<BusInner>,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        let mut shared = self.inner.shared.lock();
        if let Some(source) = shared.as_mut() {
            source.subscribers -= 1;
            if source.subscribers == 0 {
                debug!("last subscriber gone, dropping native store listener");
                *shared = None;
            }
        }
    }
}

/// One event observed by a subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// The named key changed
    Changed(String),
    /// The subscriber fell behind and missed notifications; consumers
    /// should re-read current state rather than replaying history
    Lagged,
}

/// A live subscription to the bus; an infinite stream of [`KeyEvent`]s.
/// Dropping it releases the subscriber's slot (and, for the last
/// subscriber, the native listener).
pub struct KeySubscription {
    stream: BroadcastStream<String>,
    _guard: SubscriberGuard,
}

impl Stream for KeySubscription {
    type Item = KeyEvent;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.stream).poll_next(cx).map(|next| {
            next.map(|result| match result {
                Ok(key) => KeyEvent::Changed(key),
                Err(BroadcastStreamRecvError::Lagged(_)) => KeyEvent::Lagged,
            })
        })
    }
}
