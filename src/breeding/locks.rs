//! Per-key async locks
//!
//! Operations on the same swarm or contract run one at a time; unrelated
//! keys never contend. Keys are locked in sorted order so two callers
//! asking for overlapping sets cannot deadlock.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held locks; dropping releases them
pub(crate) struct KeyGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub(crate) async fn acquire(&self, keys: &[String]) -> KeyGuard {
        let mut keys: Vec<&String> = keys.iter().collect();
        keys.sort();
        keys.dedup();

        let handles: Vec<Arc<Mutex<()>>> = {
            let mut slots = self.slots.lock().await;
            // drop slots nobody else is holding or waiting on
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            keys.iter()
                .map(|k| slots.entry((*k).clone()).or_default().clone())
                .collect()
        };

        let mut guards = Vec::with_capacity(handles.len());
        for handle in handles {
            guards.push(handle.lock_owned().await);
        }
        KeyGuard { _guards: guards }
    }
}

pub(crate) fn swarm_key(swarm_id: &str) -> String {
    format!("swarm:{}", swarm_id)
}

pub(crate) fn contract_key(contract_id: &str) -> String {
    format!("contract:{}", contract_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedLocks::default());
        let counter = Arc::new(Mutex::new(Vec::new()));

        let guard = locks.acquire(&[swarm_key("a")]).await;
        let (l2, c2) = (locks.clone(), counter.clone());
        let waiter = tokio::spawn(async move {
            let _g = l2.acquire(&[swarm_key("a"), swarm_key("b")]).await;
            c2.lock().await.push("second");
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        counter.lock().await.push("first");
        drop(guard);
        waiter.await.unwrap();
        assert_eq!(*counter.lock().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_disjoint_keys_do_not_block() {
        let locks = KeyedLocks::default();
        let _a = locks.acquire(&[swarm_key("a")]).await;
        let b = tokio::time::timeout(Duration::from_millis(200), locks.acquire(&[swarm_key("b")])).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_keys() {
        let locks = KeyedLocks::default();
        let guard = tokio::time::timeout(
            Duration::from_millis(200),
            locks.acquire(&[contract_key("c"), contract_key("c")]),
        )
        .await;
        assert!(guard.is_ok());
    }
}
