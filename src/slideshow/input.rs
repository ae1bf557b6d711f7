use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::KeyEvent;

/// Process-wide keyboard events.
///
/// Sessions never listen to the bus directly; they hold a [`KeySubscription`]
/// for as long as they are open and the subscription goes away with them.
#[derive(Debug, Clone)]
pub struct KeyboardBus {
    tx: broadcast::Sender<KeyEvent>,
}

impl KeyboardBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes a key press. Returns how many subscribers saw it.
    pub fn publish(&self, event: KeyEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> KeySubscription {
        debug!(subscribers = self.tx.receiver_count() + 1, "keyboard: subscribed");
        KeySubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for KeyboardBus {
    fn default() -> Self {
        Self::new(32)
    }
}

/// A live subscription to the keyboard bus, released on drop.
#[derive(Debug)]
pub struct KeySubscription {
    rx: broadcast::Receiver<KeyEvent>,
}

impl KeySubscription {
    /// Next key press, or `None` once every publisher is gone.
    ///
    /// Presses dropped because the subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<KeyEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "keyboard: subscriber lagged; dropping key presses");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for KeySubscription {
    fn drop(&mut self) {
        debug!("keyboard: unsubscribed");
    }
}
