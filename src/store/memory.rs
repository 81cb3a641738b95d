//! Process-local garment collection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::trace;

use super::{Connection, Filter, Store, StoreError};
use crate::garment::Garment;

/// An in-memory stand-in for the MongoDB collection.
///
/// Cloning is cheap and every clone shares the same data, so a test can keep
/// a handle while the router owns another. Two switches simulate outages:
/// [`set_reachable`](Self::set_reachable) makes `acquire` fail, and
/// [`set_failing`](Self::set_failing) makes every query fail.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    garments: RwLock<Vec<Garment>>,
    unreachable: AtomicBool,
    failing: AtomicBool,
    open: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_garments(garments: impl IntoIterator<Item = Garment>) -> Self {
        let inner = Inner {
            garments: RwLock::new(garments.into_iter().collect()),
            ..Inner::default()
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.inner.unreachable.store(!reachable, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Connections acquired and not yet released or dropped.
    pub fn open_connections(&self) -> usize {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> Vec<Garment> {
        self.inner.garments.read().await.clone()
    }
}

impl Store for MemoryStore {
    type Conn = MemoryConnection;

    async fn acquire(&self) -> Result<MemoryConnection, StoreError> {
        if self.inner.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unreachable".into()));
        }
        self.inner.open.fetch_add(1, Ordering::SeqCst);
        trace!("memory connection acquired");
        Ok(MemoryConnection { inner: Arc::clone(&self.inner) })
    }
}

pub struct MemoryConnection {
    inner: Arc<Inner>,
}

impl MemoryConnection {
    fn check(&self) -> Result<(), StoreError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            Err(StoreError::Query("memory store marked failing".into()))
        } else {
            Ok(())
        }
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.inner.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Connection for MemoryConnection {
    async fn find(&self, filter: &Filter) -> Result<Vec<Garment>, StoreError> {
        self.check()?;
        let garments = self.inner.garments.read().await;
        Ok(garments.iter().filter(|g| filter.matches(g)).cloned().collect())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Garment>, StoreError> {
        self.check()?;
        let garments = self.inner.garments.read().await;
        Ok(garments.iter().find(|g| filter.matches(g)).cloned())
    }

    async fn insert(&self, garment: &Garment) -> Result<(), StoreError> {
        self.check()?;
        self.inner.garments.write().await.push(garment.clone());
        Ok(())
    }

    async fn set_price(&self, code: i64, price: f64) -> Result<u64, StoreError> {
        self.check()?;
        let mut garments = self.inner.garments.write().await;
        match garments.iter_mut().find(|g| g.code == code) {
            Some(garment) => {
                garment.price = price;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, code: i64) -> Result<u64, StoreError> {
        self.check()?;
        let mut garments = self.inner.garments.write().await;
        match garments.iter().position(|g| g.code == code) {
            Some(index) => {
                garments.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn release(self) {
        trace!("memory connection released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryStore {
        MemoryStore::with_garments([
            Garment::new(1, "Camisa Azul", "Camisas", 20.0),
            Garment::new(2, "Pantalón Negro", "Pantalones", 35.0),
        ])
    }

    #[tokio::test]
    async fn release_and_drop_both_close_the_connection() {
        let store = seeded();
        let first = store.acquire().await.unwrap();
        let second = store.acquire().await.unwrap();
        assert_eq!(store.open_connections(), 2);

        first.release().await;
        drop(second);
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn unreachable_store_refuses_connections() {
        let store = seeded();
        store.set_reachable(false);
        assert!(matches!(store.acquire().await, Err(StoreError::Unavailable(_))));
        assert_eq!(store.open_connections(), 0);

        store.set_reachable(true);
        assert!(store.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn failing_store_fails_queries() {
        let store = seeded();
        store.set_failing(true);
        let conn = store.acquire().await.unwrap();
        assert!(matches!(conn.find(&Filter::All).await, Err(StoreError::Query(_))));
        assert!(matches!(conn.delete(1).await, Err(StoreError::Query(_))));
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn mutations_touch_only_the_first_match() {
        let store = seeded();
        let conn = store.acquire().await.unwrap();
        conn.insert(&Garment::new(1, "Camisa Roja", "Camisas", 22.0)).await.unwrap();

        assert_eq!(conn.set_price(1, 50.0).await.unwrap(), 1);
        assert_eq!(conn.set_price(9, 50.0).await.unwrap(), 0);

        let ones = conn.find(&Filter::Code(1)).await.unwrap();
        assert_eq!(ones[0].price, 50.0);
        assert_eq!(ones[1].price, 22.0);

        assert_eq!(conn.delete(1).await.unwrap(), 1);
        assert_eq!(conn.find_one(&Filter::Code(1)).await.unwrap().unwrap().name, "Camisa Roja");
        assert_eq!(conn.delete(9).await.unwrap(), 0);
    }
}
