use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::{MediaKind, PooledItem};

/// In-memory pool of embedded catalog items
///
/// One pool per process, shared by the initializer and the engine through an
/// `Arc`. Entries are keyed by `(media_kind, id)`: inserting a key that is
/// already present replaces that entry in place, so the pool never holds
/// duplicates and iteration order is insertion order of first appearance.
#[derive(Default)]
pub struct ItemPool {
    inner: RwLock<PoolInner>,
}

#[derive(Default)]
struct PoolInner {
    items: Vec<PooledItem>,
    index: HashMap<(MediaKind, u64), usize>,
}

/// Entry counts per media kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub total: usize,
    pub movie: usize,
    pub tv: usize,
}

impl ItemPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.items.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.len()
    }

    pub async fn contains(&self, media_kind: MediaKind, id: u64) -> bool {
        self.inner.read().await.index.contains_key(&(media_kind, id))
    }

    /// Ids from `ids` with no entry under `media_kind`, in input order
    pub async fn missing(&self, media_kind: MediaKind, ids: &[u64]) -> Vec<u64> {
        let inner = self.inner.read().await;
        ids.iter()
            .copied()
            .filter(|id| !inner.index.contains_key(&(media_kind, *id)))
            .collect()
    }

    /// Inserts entries, returning how many new keys were added
    pub async fn insert_many<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = PooledItem>,
    {
        let mut inner = self.inner.write().await;
        let mut added = 0;

        for item in items {
            let key = item.key();
            match inner.index.get(&key).copied() {
                Some(position) => inner.items[position] = item,
                None => {
                    let position = inner.items.len();
                    inner.items.push(item);
                    inner.index.insert(key, position);
                    added += 1;
                }
            }
        }

        added
    }

    /// Runs `f` over the pool contents under the read lock
    pub async fn read<R>(&self, f: impl FnOnce(&[PooledItem]) -> R) -> R {
        let inner = self.inner.read().await;
        f(&inner.items)
    }

    pub async fn stats(&self) -> PoolStats {
        let inner = self.inner.read().await;
        let movie = inner
            .items
            .iter()
            .filter(|p| p.item.media_kind == MediaKind::Movie)
            .count();

        PoolStats {
            total: inner.items.len(),
            movie,
            tv: inner.items.len() - movie,
        }
    }
}
