//! Change notification for the conversation store
//!
//! The store owns a broadcast channel; interested parties call
//! [`crate::storage::ChatStore::subscribe`] and get a receiver that is
//! unsubscribed simply by dropping it. Events are fire-and-forget: sending
//! with no live receivers is not an error, and a lagged receiver skips
//! ahead rather than blocking the writer.

use tokio::sync::broadcast;

/// Buffered events per receiver before older ones are dropped
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events published by the conversation store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A message was appended to the named session; history ordering and
    /// titles may have changed.
    SessionUpdated {
        /// Identifier of the session that changed
        session_id: String,
    },
}

/// Create the store's event channel
pub(crate) fn channel() -> broadcast::Sender<StoreEvent> {
    let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_delivered_to_subscriber() {
        let tx = channel();
        let mut rx = tx.subscribe();

        tx.send(StoreEvent::SessionUpdated {
            session_id: "abc".to_string(),
        })
        .expect("send failed");

        let event = rx.recv().await.expect("recv failed");
        assert_eq!(
            event,
            StoreEvent::SessionUpdated {
                session_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_send_without_receivers_is_not_fatal() {
        let tx = channel();
        // No subscribers: send returns Err, which callers ignore.
        let res = tx.send(StoreEvent::SessionUpdated {
            session_id: "nobody-listening".to_string(),
        });
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_dropped_receiver_unsubscribes() {
        let tx = channel();
        let rx = tx.subscribe();
        assert_eq!(tx.receiver_count(), 1);
        drop(rx);
        assert_eq!(tx.receiver_count(), 0);
    }
}
