//! Conduit - the channel between two adjacent stages
//!
//! Backed by a bounded `async-channel`, so it is safe for multiple producers and
//! multiple consumers. The owner (the engine) holds the [`Closer`]; stages only
//! ever see the [`Outlet`] they write to and the [`Inlet`] they read from.

use async_channel::{bounded, Receiver, Sender};

use crate::ConduitClosed;

/// Smallest capacity a conduit can have
///
/// `async-channel` has no zero-capacity rendezvous; one slot is the tightest handoff.
pub const MIN_CAPACITY: usize = 1;

/// An allocated conduit, before its endpoints are handed out
#[derive(Debug)]
pub struct Conduit<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Conduit<T> {
    /// Allocate a conduit holding at most `capacity` in-flight items
    ///
    /// Capacities below [`MIN_CAPACITY`] are raised to it.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(MIN_CAPACITY));
        Self { tx, rx }
    }

    /// Write endpoint for the stage feeding this conduit
    pub fn outlet(&self) -> Outlet<T> {
        Outlet {
            tx: self.tx.clone(),
        }
    }

    /// Read endpoint for the stage consuming this conduit
    pub fn inlet(&self) -> Inlet<T> {
        Inlet {
            rx: self.rx.clone(),
        }
    }

    /// Owner endpoint used to close the conduit
    pub fn closer(&self) -> Closer<T> {
        Closer {
            tx: self.tx.clone(),
        }
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(MIN_CAPACITY)
    }
}

/// Send-only endpoint handed to the writing stage
///
/// Has no `close`; only the owner's [`Closer`] can close the conduit.
#[derive(Debug)]
pub struct Outlet<T> {
    tx: Sender<T>,
}

impl<T> Clone for Outlet<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Outlet<T> {
    /// Send one item, waiting while the conduit is full
    ///
    /// # Errors
    /// Returns the item back inside [`ConduitClosed`] if the conduit was closed.
    pub async fn send(&self, item: T) -> Result<(), ConduitClosed<T>> {
        self.tx
            .send(item)
            .await
            .map_err(|e| ConduitClosed(e.into_inner()))
    }

    /// Whether the owner has closed the conduit
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receive endpoint handed to the reading stage
#[derive(Debug)]
pub struct Inlet<T> {
    rx: Receiver<T>,
}

impl<T> Clone for Inlet<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> Inlet<T> {
    /// Next item, or `None` once the conduit is closed and empty
    pub async fn recv(&self) -> Option<T> {
        self.rx.recv().await.ok()
    }

    /// Items currently buffered
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Whether the conduit was closed (items may still be buffered)
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }
}

/// Owner endpoint; closes the conduit for every reader and writer
#[derive(Debug)]
pub struct Closer<T> {
    tx: Sender<T>,
}

impl<T> Clone for Closer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Closer<T> {
    /// Close the conduit
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_items_arrive_in_send_order() {
        let conduit = Conduit::new(4);
        let outlet = conduit.outlet();
        let inlet = conduit.inlet();

        for i in 0..3 {
            outlet.send(i).await.unwrap();
        }
        assert_eq!(inlet.len(), 3);
        assert_eq!(inlet.recv().await, Some(0));
        assert_eq!(inlet.recv().await, Some(1));
        assert_eq!(inlet.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let conduit = Conduit::new(2);
        let outlet = conduit.outlet();
        let inlet = conduit.inlet();
        let closer = conduit.closer();

        outlet.send("a").await.unwrap();
        assert!(closer.close());
        assert!(!closer.close(), "second close must be a no-op");

        assert!(inlet.is_closed());
        assert_eq!(inlet.recv().await, Some("a"));
        assert_eq!(inlet.recv().await, None);
    }

    #[tokio::test]
    async fn test_send_after_close_returns_item() {
        let conduit = Conduit::new(1);
        let outlet = conduit.outlet();
        conduit.closer().close();

        let err = outlet.send(42).await.unwrap_err();
        assert_eq!(err.into_inner(), 42);
        assert!(outlet.is_closed());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let conduit: Conduit<u8> = Conduit::new(0);
        assert_eq!(conduit.capacity(), MIN_CAPACITY);
    }

    #[tokio::test]
    async fn test_full_conduit_applies_backpressure() {
        let conduit = Conduit::new(1);
        let outlet = conduit.outlet();
        let inlet = conduit.inlet();

        outlet.send(1).await.unwrap();
        let blocked =
            tokio::time::timeout(std::time::Duration::from_millis(20), outlet.send(2)).await;
        assert!(blocked.is_err(), "send into a full conduit should wait");

        assert_eq!(inlet.recv().await, Some(1));
    }
}
