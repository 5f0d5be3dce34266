use crate::domain::ids::OrderId;
use crate::error::{EscrowError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<OrderId, Arc<AsyncMutex<()>>>>>;

/// Per-order mutual exclusion.
///
/// Payment confirmations, cancellations, delivery confirmations and
/// remittances on the same order run one at a time; different orders never
/// contend. Waiting is bounded so a stuck holder surfaces as a retryable error.
/// An order's entry lives only while someone holds or waits for its lock.
pub struct OrderLocks {
    locks: LockTable,
    timeout: Duration,
}

/// Holds an order's lock; releasing the last interest drops the entry.
#[derive(Debug)]
pub struct OrderGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: LockTable,
    order_id: OrderId,
}

impl OrderLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Arc::default(),
            timeout,
        }
    }

    pub async fn acquire(&self, order_id: &OrderId) -> Result<OrderGuard> {
        let lock = table(&self.locks)
            .entry(order_id.clone())
            .or_default()
            .clone();
        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(OrderGuard {
                guard: Some(guard),
                locks: self.locks.clone(),
                order_id: order_id.clone(),
            }),
            Err(_) => {
                release(&self.locks, order_id);
                Err(EscrowError::UpstreamUnavailable(format!(
                    "timed out waiting for order {} lock",
                    order_id
                )))
            }
        }
    }

    /// Number of orders with a held or awaited lock.
    pub fn tracked(&self) -> usize {
        table(&self.locks).len()
    }
}

impl Drop for OrderGuard {
    fn drop(&mut self) {
        self.guard.take();
        release(&self.locks, &self.order_id);
    }
}

// The table lock is never held across an await, so poisoning only follows a
// panic in the few lines below and the map itself stays consistent.
fn table(locks: &LockTable) -> MutexGuard<'_, HashMap<OrderId, Arc<AsyncMutex<()>>>> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drops the entry when the table holds the only reference to it. Waiters
/// clone the entry under the table lock, so the count cannot race upwards.
fn release(locks: &LockTable, order_id: &OrderId) {
    let mut table = table(locks);
    if table
        .get(order_id)
        .is_some_and(|lock| Arc::strong_count(lock) == 1)
    {
        table.remove(order_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_order_is_exclusive() {
        let locks = OrderLocks::new(Duration::from_millis(50));
        let id = OrderId::new("o-1");
        let _held = locks.acquire(&id).await.unwrap();
        let err = locks.acquire(&id).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_different_orders_do_not_contend() {
        let locks = OrderLocks::new(Duration::from_millis(50));
        let _a = locks.acquire(&OrderId::new("o-1")).await.unwrap();
        assert!(locks.acquire(&OrderId::new("o-2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_released_locks_leave_no_entry() {
        let locks = OrderLocks::new(Duration::from_millis(50));
        for i in 0..100 {
            let _guard = locks.acquire(&OrderId::new(format!("o-{}", i))).await.unwrap();
            assert_eq!(locks.tracked(), 1);
        }
        assert_eq!(locks.tracked(), 0);

        let id = OrderId::new("o-1");
        let held = locks.acquire(&id).await.unwrap();
        assert!(locks.acquire(&id).await.is_err());
        assert_eq!(locks.tracked(), 1, "a timed-out waiter must not drop the held entry");
        drop(held);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiters_keep_the_entry_alive() {
        let locks = Arc::new(OrderLocks::new(Duration::from_secs(5)));
        let id = OrderId::new("o-1");
        let counter = Arc::new(AsyncMutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let locks = locks.clone();
            let id = id.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(&id).await.unwrap();
                let mut n = counter.lock().await;
                *n += 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*counter.lock().await, 32);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_lock_is_released_on_drop() {
        let locks = OrderLocks::new(Duration::from_millis(50));
        let id = OrderId::new("o-1");
        drop(locks.acquire(&id).await.unwrap());
        assert!(locks.acquire(&id).await.is_ok());
    }
}
