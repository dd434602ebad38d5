use assoc_store::AssocTable;
use slab_store::{SlabAllocator, SlabConfig};

use crate::cas::CasGenerator;
use crate::handle::ItemRef;
use crate::metrics::Metrics;
use crate::time::{Clock, SystemClock};

/// Configuration bound at [Store::setup] time and held for the lifetime of the store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct StoreConfig {
    /// Hash index is pre-sized to `2^hash_power` buckets.
    pub hash_power: u32,
    /// Whether items carry an 8-byte CAS token. Fixed for the life of the store.
    pub use_cas: bool,
    pub slab: SlabConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            hash_power: 16,
            use_cas: true,
            slab: SlabConfig::default(),
        }
    }
}

/// Bundles the slab allocator, hash index, CAS generator, clock, and metrics sink behind the
/// `setup`/`teardown` lifecycle, and exposes the data-plane operations as inherent methods. This
/// is the crate's single public entry point.
pub struct Store<C: Clock = SystemClock> {
    pub(crate) slab: SlabAllocator,
    pub(crate) assoc: AssocTable<ItemRef>,
    pub(crate) cas: CasGenerator,
    pub(crate) clock: C,
    pub(crate) metrics: Metrics,
    pub(crate) config: StoreConfig,
    initialized: bool,
}

impl Store<SystemClock> {
    /// Set up a store using the system wall clock.
    pub fn setup(config: StoreConfig) -> Self {
        Self::setup_with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> Store<C> {
    /// Set up a store against an arbitrary clock (tests use [crate::time::TestClock]).
    pub fn setup_with_clock(config: StoreConfig, clock: C) -> Self {
        log::info!(
            "item store setup: hash_power={} use_cas={}",
            config.hash_power,
            config.use_cas
        );
        Store {
            slab: SlabAllocator::new(config.slab),
            assoc: AssocTable::create(config.hash_power),
            cas: CasGenerator::new(config.use_cas),
            clock,
            metrics: Metrics::default(),
            config,
            initialized: true,
        }
    }

    /// Re-initialize an already-set-up store, discarding all linked items. Permitted, but logged
    /// as unusual since it silently drops every item currently in the index.
    pub fn reinit(&mut self, config: StoreConfig, clock: C) {
        if self.initialized {
            log::warn!("item store re-initialized while already set up");
        }
        *self = Store::setup_with_clock(config, clock);
    }

    /// Tear down the store. Items and slab pages drop with `self`; this exists to mirror the
    /// source's explicit `item_teardown` lifecycle call and to log the transition.
    pub fn teardown(self) {
        log::info!(
            "item store teardown: {} items were linked",
            self.metrics.item_curr
        );
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
