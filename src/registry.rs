use crate::{Instantiate, Pool, PoolConfig, Result};
use core::any::{Any, TypeId};
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

static GLOBAL: Lazy<PoolRegistry> = Lazy::new(PoolRegistry::new);

/// Identity of a template: its concrete type plus the address of its `Arc`
/// allocation. The registered pool keeps the template alive, so the address
/// is never reused while the entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TemplateKey {
    type_id: TypeId,
    addr: usize,
}

impl TemplateKey {
    fn of<T: Instantiate>(template: &Arc<T>) -> Self {
        TemplateKey {
            type_id: TypeId::of::<T>(),
            addr: Arc::as_ptr(template) as usize,
        }
    }
}

type ErasedPool = Arc<dyn Any + Send + Sync>;

/// Maps templates to their pools so callers can share one [`Pool`] per
/// template without passing it around.
///
/// Pools are created lazily on first use and live as long as the registry.
/// [`PoolRegistry::global`] gives the process-wide instance. Templates may
/// allocate from the registry inside [`Instantiate::instantiate`].
pub struct PoolRegistry {
    config: PoolConfig,
    pools: RwLock<HashMap<TemplateKey, ErasedPool>>,
}

impl PoolRegistry {
    /// Creates an empty registry whose pools use the default growth
    /// increment.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates an empty registry whose pools grow by `config.grow_size`.
    ///
    /// The initial size of each pool comes from the call that creates it.
    pub fn with_config(config: PoolConfig) -> Self {
        PoolRegistry {
            config,
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide registry. It is never torn down.
    pub fn global() -> &'static PoolRegistry {
        &GLOBAL
    }

    /// Returns the configuration applied to newly created pools.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Creates and registers a pool of `initial_size` clones for `template`.
    ///
    /// Does nothing if the template already has a pool; an existing pool is
    /// neither resized nor reset.
    pub fn initialize<T: Instantiate>(&self, template: &Arc<T>, initial_size: usize) -> Result<()> {
        self.get_or_create(template, initial_size).map(|_| ())
    }

    /// Allocates an instance from the pool registered for `template`,
    /// creating that pool with `initial_size` clones on first use.
    pub fn allocate<T: Instantiate>(&self, template: &Arc<T>, initial_size: usize) -> Result<Arc<T>> {
        self.get_or_create(template, initial_size)?.allocate()
    }

    /// Releases `instance` into the pool registered for `template`.
    ///
    /// Does nothing if no pool is registered for the template.
    pub fn release<T: Instantiate>(&self, template: &Arc<T>, instance: &Arc<T>) {
        if let Some(pool) = self.pool(template) {
            pool.release(instance);
        }
    }

    /// Returns the pool registered for `template`, if any.
    pub fn pool<T: Instantiate>(&self, template: &Arc<T>) -> Option<Arc<Pool<T>>> {
        let pools = self.pools.read();
        pools
            .get(&TemplateKey::of(template))
            .and_then(|pool| pool.clone().downcast::<Pool<T>>().ok())
    }

    /// Checks whether a pool is registered for `template`.
    pub fn contains<T: Instantiate>(&self, template: &Arc<T>) -> bool {
        self.pools.read().contains_key(&TemplateKey::of(template))
    }

    /// Gets the number of registered pools.
    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    /// Checks if no pool has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }

    fn get_or_create<T: Instantiate>(&self, template: &Arc<T>, initial_size: usize) -> Result<Arc<Pool<T>>> {
        if let Some(pool) = self.pool(template) {
            return Ok(pool);
        }

        // Clone hooks run with no registry lock held so they may use the
        // registry themselves. Concurrent creators race; the first insert wins
        // and the other pools are dropped.
        let config = self.config.with_initial_size(initial_size);
        let created = Arc::new(Pool::with_config(template.clone(), &config)?);

        let key = TemplateKey::of(template);
        let mut pools = self.pools.write();
        let pool = match pools.entry(key) {
            Entry::Occupied(entry) => entry.get().clone().downcast::<Pool<T>>().unwrap_or(created),
            Entry::Vacant(entry) => {
                entry.insert(created.clone());
                debug!("registered pool for template {:#x}", key.addr);
                created
            }
        };
        Ok(pool)
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("config", &self.config)
            .field("pools", &self.len())
            .finish()
    }
}
