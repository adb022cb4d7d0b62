use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use futures::Stream;

use crate::KeyEvent;
use crate::KeySubscription;
use crate::Result;

/// A replay-first live stream over one key.
///
/// The first emission is always the current stored value (or the caller's
/// default when absent), produced without waiting for a mutation. Every
/// subsequent emission re-runs the decode path against the up-to-date
/// stored string. Missed notifications are coalesced: on lag the stream
/// re-reads current state instead of replaying history.
pub struct KeyWatch<T> {
    key: String,
    subscription: KeySubscription,
    seed_pending: bool,
    read: Box<dyn Fn() -> Result<T> + Send + Sync>,
}

impl<T> KeyWatch<T> {
    pub(crate) fn new(
        key: String,
        subscription: KeySubscription,
        read: Box<dyn Fn() -> Result<T> + Send + Sync>,
    ) -> Self {
        Self {
            key,
            subscription,
            seed_pending: true,
            read,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T> Stream for KeyWatch<T> {
    type Item = Result<T>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.seed_pending {
            this.seed_pending = false;
            return Poll::Ready(Some((this.read)()));
        }

        loop {
            match Pin::new(&mut this.subscription).poll_next(cx) {
                Poll::Ready(Some(KeyEvent::Changed(changed))) if changed == this.key => {
                    return Poll::Ready(Some((this.read)()));
                }
                Poll::Ready(Some(KeyEvent::Changed(_))) => continue,
                Poll::Ready(Some(KeyEvent::Lagged)) => {
                    return Poll::Ready(Some((this.read)()));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<T> std::fmt::Debug for KeyWatch<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KeyWatch").field("key", &self.key).finish()
    }
}
