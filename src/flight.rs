//! Request coalescing.
//!
//! [`Flight`] makes sure that, for any key, at most one load runs at a time in
//! this process. The first caller for a key (the leader) runs the work; every
//! caller that arrives while it is running (a follower) waits and receives a
//! clone of the leader's result.
//!
//! Completion removes the key from the in-flight map and publishes the result
//! under the same lock, so no caller can attach to a finished load and no
//! caller can start a duplicate load before the finished one is published.
//!
//! If the leader's future is dropped before finishing, its entry is removed and
//! waiting followers race to become the new leader.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;

type Calls<T> = Mutex<HashMap<String, watch::Receiver<Option<T>>>>;

/// Duplicate-suppressing executor keyed by string.
#[derive(Debug)]
pub struct Flight<T> {
    calls: Calls<T>,
}

impl<T> Default for Flight<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Follower(watch::Receiver<Option<T>>),
}

/// Removes the in-flight entry if the leader goes away without publishing.
struct LeaderGuard<'a, T> {
    calls: &'a Calls<T>,
    key: &'a str,
    armed: bool,
}

impl<T> Drop for LeaderGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.calls.lock().remove(self.key);
        }
    }
}

impl<T: Clone> Flight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `func` for `key` unless a run is already in flight, in which case
    /// waits for that run and returns a clone of its result.
    pub async fn work<F, Fut>(&self, key: &str, func: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let tx = loop {
            match self.join(key) {
                Role::Leader(tx) => break tx,
                Role::Follower(mut rx) => {
                    let outcome = rx
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|value| (*value).clone());
                    if let Some(value) = outcome {
                        return value;
                    }
                    // leader dropped without a result; try again
                }
            }
        };

        let mut guard = LeaderGuard {
            calls: &self.calls,
            key,
            armed: true,
        };
        let value = func().await;

        {
            let mut calls = self.calls.lock();
            calls.remove(key);
            tx.send_replace(Some(value.clone()));
        }
        guard.armed = false;
        value
    }

    /// Number of keys with a load in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    fn join(&self, key: &str) -> Role<T> {
        let mut calls = self.calls.lock();
        if let Some(rx) = calls.get(key) {
            return Role::Follower(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        calls.insert(key.to_string(), rx);
        Role::Leader(tx)
    }
}
