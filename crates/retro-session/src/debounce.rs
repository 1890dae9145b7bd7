use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Trailing-edge debouncer with an independent window per key.
///
/// Pushing a value for one key restarts that key's window only, so drafts
/// for different cards never cancel each other.
#[derive(Debug)]
pub struct Debouncer<K, V> {
    window: Duration,
    pending: HashMap<K, (V, Instant)>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    pub fn push(&mut self, key: K, value: V) {
        let deadline = Instant::now() + self.window;
        self.pending.insert(key, (value, deadline));
    }

    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|(value, _)| value)
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for the earliest window to close and hand back its value.
    /// Never resolves while nothing is pending. Cancel safe.
    pub async fn next_ready(&mut self) -> (K, V) {
        loop {
            let earliest = self
                .pending
                .iter()
                .min_by_key(|(_, (_, deadline))| *deadline)
                .map(|(key, (_, deadline))| (key.clone(), *deadline));

            let Some((key, deadline)) = earliest else {
                return std::future::pending().await;
            };

            tokio::time::sleep_until(deadline).await;
            if let Some((value, _)) = self.pending.remove(&key) {
                return (key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keys_debounce_independently() {
        let mut debouncer = Debouncer::new(Duration::from_millis(20));
        debouncer.push("a", "a1");
        debouncer.push("b", "b1");
        debouncer.push("a", "a2");

        let first = debouncer.next_ready().await;
        let second = debouncer.next_ready().await;
        assert_eq!(first, ("b", "b1"));
        assert_eq!(second, ("a", "a2"));
        assert!(debouncer.is_empty());
    }

    #[tokio::test]
    async fn test_push_restarts_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(40));
        debouncer.push(1, "draft");
        tokio::time::sleep(Duration::from_millis(25)).await;
        debouncer.push(1, "draft, longer");

        let early = tokio::time::timeout(Duration::from_millis(25), debouncer.next_ready()).await;
        assert!(early.is_err());
        assert_eq!(debouncer.next_ready().await, (1, "draft, longer"));
    }

    #[tokio::test]
    async fn test_cancel_all_drops_drafts() {
        let mut debouncer = Debouncer::new(Duration::from_millis(5));
        debouncer.push(1, "x");
        debouncer.push(2, "y");
        assert_eq!(debouncer.cancel(&1), Some("x"));
        debouncer.cancel_all();

        let fired = tokio::time::timeout(Duration::from_millis(30), debouncer.next_ready()).await;
        assert!(fired.is_err());
    }
}
