//! Ordered hand-off chain for per-symbol execution units.
//!
//! A relay of `n` legs threads one value (an accumulator, a connection
//! half, or both) through `n` concurrently spawned tasks in a fixed
//! order. Leg `k` cannot obtain the value until leg `k - 1` has passed
//! it on, so whatever leg `k` does while holding it happens-before the
//! same step of leg `k + 1`. Ordering follows position in the chain,
//! never completion order of the tasks.
//!
//! Dropping a [`Handoff`] without passing aborts every later leg with
//! [`SfeError::Relay`].

use tokio::sync::oneshot;

use crate::error::{Result, SfeError};

/// A stage's claim on the relayed value.
pub struct Leg<T> {
    position: usize,
    rx: oneshot::Receiver<T>,
    tx: oneshot::Sender<T>,
}

/// Obligation to forward the value to the next leg.
#[must_use = "dropping a Handoff aborts every later leg"]
pub struct Handoff<T> {
    position: usize,
    tx: oneshot::Sender<T>,
}

/// Receives the value after the last leg has passed it on.
pub struct Tail<T> {
    rx: oneshot::Receiver<T>,
}

/// Builds a relay of `n` legs seeded with `seed`.
///
/// With `n == 0` the tail yields the seed unchanged.
pub fn chain<T>(n: usize, seed: T) -> (Vec<Leg<T>>, Tail<T>) {
    let (first_tx, mut rx) = oneshot::channel();
    // The receiver is alive, so the seed cannot bounce back.
    let _ = first_tx.send(seed);

    let mut legs = Vec::with_capacity(n);
    for position in 0..n {
        let (tx, next_rx) = oneshot::channel();
        legs.push(Leg { position, rx, tx });
        rx = next_rx;
    }
    (legs, Tail { rx })
}

impl<T> Leg<T> {
    pub fn position(&self) -> usize {
        self.position
    }

    /// Waits until the previous leg passes the value on.
    pub async fn take(self) -> Result<(T, Handoff<T>)> {
        let position = self.position;
        let value = self.rx.await.map_err(|_| {
            SfeError::Relay(format!("predecessor of stage {} aborted", position))
        })?;
        Ok((value, Handoff { position, tx: self.tx }))
    }
}

impl<T> Handoff<T> {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn pass(self, value: T) -> Result<()> {
        let position = self.position;
        self.tx.send(value).map_err(|_| {
            SfeError::Relay(format!("successor of stage {} is gone", position))
        })
    }
}

impl<T> Tail<T> {
    /// Waits for the value left by the last leg.
    pub async fn finish(self) -> Result<T> {
        self.rx
            .await
            .map_err(|_| SfeError::Relay("relay ended before its last stage".into()))
    }
}
