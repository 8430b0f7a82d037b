//! Lock-free, read-mostly holder for the loaded price and post tables.
//!
//! Readers call [`DatasetStore::snapshot`] and work on an `Arc` that stays
//! valid for the whole request; writers call [`DatasetStore::replace`] after a
//! reload to atomically swap in new tables. The store is an ordinary value handed
//! to whoever serves requests, so tests and concurrent dashboards each own one.
//!
//! Implementation notes:
//! - Uses `arc-swap` for atomic pointer swaps + cheap reads (no RwLock).
//! - Nothing is loaded implicitly; a fresh store is empty until `replace`.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::models::{EventPoint, PriceSeries};

/// One consistent pair of tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<P> {
    /// Price candles, ascending.
    pub prices: PriceSeries,
    /// Posts, in loader order.
    pub events: Vec<EventPoint<P>>,
}

impl<P> Default for Dataset<P> {
    fn default() -> Self {
        Self {
            prices: PriceSeries::default(),
            events: Vec::new(),
        }
    }
}

/// Atomically swappable [`Dataset`].
#[derive(Debug)]
pub struct DatasetStore<P> {
    current: ArcSwap<Dataset<P>>,
}

impl<P> Default for DatasetStore<P> {
    fn default() -> Self {
        Self::new(Dataset::default())
    }
}

impl<P> DatasetStore<P> {
    /// Store holding `dataset`.
    pub fn new(dataset: Dataset<P>) -> Self {
        Self {
            current: ArcSwap::from_pointee(dataset),
        }
    }

    /// Current tables. Cheap: one atomic load plus a refcount bump.
    pub fn snapshot(&self) -> Arc<Dataset<P>> {
        self.current.load_full()
    }

    /// Swap in freshly loaded tables and return the previous ones.
    ///
    /// Readers holding an older snapshot keep it until they drop it.
    pub fn replace(&self, dataset: Dataset<P>) -> Arc<Dataset<P>> {
        self.current.swap(Arc::new(dataset))
    }

    /// Reset to empty tables. Useful for tests.
    pub fn clear(&self) {
        self.current.store(Arc::new(Dataset::default()));
    }
}
