use crate::{Instantiate, PoolConfig, PoolError, Result, DEFAULT_GROW_SIZE};
use core::{
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
};
use log::{debug, trace};
use parking_lot::Mutex;
use std::sync::Arc;

/// Bookkeeping record pairing one cloned instance with its lent flag.
#[derive(Debug)]
struct Slot<T> {
    instance: Arc<T>,
    released: bool,
}

impl<T: Instantiate> Slot<T> {
    fn fresh(template: &T) -> Self {
        let instance = Arc::new(template.instantiate());
        instance.set_active(false);
        Slot {
            instance,
            released: true,
        }
    }

    fn lend(&mut self) -> Arc<T> {
        self.released = false;
        self.instance.set_active(true);
        self.instance.clone()
    }
}

/// A struct representing a pool of clones of a single template.
///
/// Instances are handed out as [`Arc`] handles and stay tracked by the pool
/// while lent. Released instances are found by a reverse scan, so the most
/// recently added free slot is reused first. When every slot is lent the
/// pool grows by its growth increment, or reports [`PoolError::Exhausted`]
/// if the increment is zero.
///
/// A single lock guards the slot array; scans, flag changes and resizes all
/// happen under it. The [`Instantiate`] hooks run while that lock is held,
/// so they must not call back into the same pool.
#[derive(Debug)]
pub struct Pool<T> {
    template: Arc<T>,
    grow_size: usize,
    slots: Mutex<Vec<Slot<T>>>,
}

impl<T> Pool<T> {
    /// Gets the number of slots, lent or released.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Checks if the pool holds no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Gets the number of released instances ready to be allocated.
    pub fn available(&self) -> usize {
        self.slots.lock().iter().filter(|slot| slot.released).count()
    }

    /// Gets the number of instances currently lent out.
    pub fn in_use(&self) -> usize {
        self.slots.lock().iter().filter(|slot| !slot.released).count()
    }

    /// Returns the template every instance is cloned from.
    pub fn template(&self) -> &Arc<T> {
        &self.template
    }

    /// Returns the number of slots added when the pool runs dry.
    pub fn grow_size(&self) -> usize {
        self.grow_size
    }

    /// Checks whether `instance` is one of the pool's tracked instances.
    pub fn contains(&self, instance: &Arc<T>) -> bool {
        self.slots
            .lock()
            .iter()
            .any(|slot| Arc::ptr_eq(&slot.instance, instance))
    }

    /// Wraps the pool with an atomic reference counter, enabling the use of
    /// [`Self::allocate_guarded`].
    pub fn to_rc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<T: Instantiate> Pool<T> {
    /// Creates a pool holding `initial_size` clones of `template`, growing
    /// by [`DEFAULT_GROW_SIZE`] when exhausted.
    pub fn new(template: Arc<T>, initial_size: usize) -> Result<Self> {
        Self::with_grow_size(template, initial_size, DEFAULT_GROW_SIZE)
    }

    /// Creates a pool sized by `config`.
    pub fn with_config(template: Arc<T>, config: &PoolConfig) -> Result<Self> {
        Self::with_grow_size(template, config.initial_size, config.grow_size)
    }

    /// Creates a pool holding `initial_size` clones of `template`, growing
    /// by `grow_size` slots when exhausted. A `grow_size` of zero makes the
    /// pool fixed-size.
    ///
    /// Every clone starts deactivated and released.
    pub fn with_grow_size(template: Arc<T>, initial_size: usize, grow_size: usize) -> Result<Self> {
        if !template.is_valid() {
            return Err(PoolError::InvalidTemplate);
        }
        let slots = (0..initial_size).map(|_| Slot::fresh(&*template)).collect();
        debug!("created pool with {initial_size} instances (grow size {grow_size})");
        Ok(Pool {
            template,
            grow_size,
            slots: Mutex::new(slots),
        })
    }

    /// Allocates an instance from the pool.
    ///
    /// The highest-indexed released slot is reused. If none is released the
    /// pool grows by its growth increment and hands out the first new slot.
    /// The returned instance has already been activated.
    ///
    /// Growth that would overflow `usize` is reported as
    /// [`PoolError::Exhausted`], the same as a pool that cannot grow.
    pub fn allocate(&self) -> Result<Arc<T>> {
        let mut slots = self.slots.lock();
        if let Some((index, slot)) = slots
            .iter_mut()
            .enumerate()
            .rev()
            .find(|(_, slot)| slot.released)
        {
            trace!("allocated pooled instance at slot {index}");
            return Ok(slot.lend());
        }

        let size = slots.len();
        let grown = match size.checked_add(self.grow_size) {
            Some(grown) if self.grow_size > 0 => grown,
            _ => {
                debug!("pool exhausted at {size} instances");
                return Err(PoolError::Exhausted { size });
            }
        };
        self.rebuild(&mut slots, grown, true);
        debug!("pool grew from {size} to {} instances", slots.len());
        Ok(slots[size].lend())
    }

    /// Allocates an instance wrapped in a guard that holds an arc reference
    /// to the owning pool and releases the instance when dropped.
    pub fn allocate_guarded(self: &Arc<Self>) -> Result<PoolGuard<T>> {
        let instance = self.allocate()?;
        Ok(PoolGuard::new(instance, self))
    }

    /// Returns `instance` to the pool.
    ///
    /// The instance is deactivated and detached, and its slot becomes
    /// available again. Instances the pool does not track are ignored.
    /// Releasing an already released instance only deactivates it again.
    pub fn release(&self, instance: &Arc<T>) {
        let mut slots = self.slots.lock();
        match slots
            .iter_mut()
            .enumerate()
            .rev()
            .find(|(_, slot)| Arc::ptr_eq(&slot.instance, instance))
        {
            Some((index, slot)) => {
                slot.instance.set_active(false);
                slot.instance.detach();
                slot.released = true;
                trace!("released instance at slot {index}");
            }
            None => trace!("ignored release of an instance this pool does not track"),
        }
    }

    /// Resizes the pool to `new_size` slots.
    ///
    /// With `copy_existing`, the first `min(len, new_size)` slots are kept
    /// with their lent state; every other slot is a fresh, deactivated,
    /// released clone. Without it all previous slots are dropped.
    pub fn resize(&self, new_size: usize, copy_existing: bool) {
        let mut slots = self.slots.lock();
        let old_size = slots.len();
        self.rebuild(&mut slots, new_size, copy_existing);
        debug!("resized pool from {old_size} to {new_size} instances (copy existing: {copy_existing})");
    }

    /// Rebuilds the pool with fresh clones at its current length, or at the
    /// growth increment when the pool is empty.
    ///
    /// Instances lent before the reset stay with their holders but are no
    /// longer tracked, so releasing them afterwards is a no-op.
    pub fn reset(&self) {
        let mut slots = self.slots.lock();
        let size = match slots.len() {
            0 => self.grow_size,
            len => len,
        };
        self.rebuild(&mut slots, size, false);
        debug!("reset pool to {size} instances");
    }

    /// Builds the replacement slots and swaps them in. Callers hold the slot
    /// lock for the whole call.
    ///
    /// Fresh clones are built before `slots` is touched, so a panicking
    /// `instantiate` leaves the previous slots in place.
    fn rebuild(&self, slots: &mut Vec<Slot<T>>, new_size: usize, copy_existing: bool) {
        let kept = if copy_existing {
            slots.len().min(new_size)
        } else {
            0
        };
        let fresh: Vec<Slot<T>> = (kept..new_size)
            .map(|_| Slot::fresh(&*self.template))
            .collect();
        slots.truncate(kept);
        slots.reserve_exact(fresh.len());
        slots.extend(fresh);
    }
}

/// A struct representing a guard over an instance lent by a [`Pool`].
///
/// This struct ensures that the instance is released back to the pool when
/// it is dropped.
pub struct PoolGuard<T: Instantiate> {
    instance: Arc<T>,
    // Cleared by `into_inner` so the drop no longer releases.
    pool: Option<Arc<Pool<T>>>,
}

impl<T: Instantiate> PoolGuard<T> {
    fn new(instance: Arc<T>, pool: &Arc<Pool<T>>) -> Self {
        PoolGuard {
            instance,
            pool: Some(pool.clone()),
        }
    }

    /// Consumes the guard and returns the instance without releasing it.
    ///
    /// The instance stays lent until it is passed to [`Pool::release`].
    pub fn into_inner(mut self) -> Arc<T> {
        self.pool = None;
        self.instance.clone()
    }

    /// Returns the shared handle to the lent instance.
    pub fn handle(&self) -> &Arc<T> {
        &self.instance
    }
}

impl<T: Instantiate> Deref for PoolGuard<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl<T: Instantiate> Drop for PoolGuard<T> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(&self.instance);
        }
    }
}

impl<T: Instantiate + Hash> Hash for PoolGuard<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}
impl<T: Instantiate + fmt::Display> fmt::Display for PoolGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}
impl<T: Instantiate + fmt::Debug> fmt::Debug for PoolGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
impl<T: Instantiate> fmt::Pointer for PoolGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&(&**self as *const T), f)
    }
}
impl<T: Instantiate + PartialEq> PartialEq for PoolGuard<T> {
    #[inline]
    fn eq(&self, other: &PoolGuard<T>) -> bool {
        self.deref().eq(other)
    }
}
impl<T: Instantiate + Eq> Eq for PoolGuard<T> {}
impl<T: Instantiate> core::borrow::Borrow<T> for PoolGuard<T> {
    #[inline(always)]
    fn borrow(&self) -> &T {
        self
    }
}
impl<T: Instantiate> AsRef<T> for PoolGuard<T> {
    #[inline(always)]
    fn as_ref(&self) -> &T {
        self
    }
}
