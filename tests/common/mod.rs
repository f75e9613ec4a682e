use clonepool::Instantiate;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

/// Test template: every clone gets a new id from a counter shared with the
/// template, and records activation and detach calls.
///
/// Clones come out of `instantiate` active. The template tracks how many of
/// its clones are active right now, so any clone the pool forgets to
/// deactivate shows up in `active_clones`.
#[derive(Debug)]
pub struct Enemy {
    pub id: usize,
    pub valid: bool,
    pub active: AtomicBool,
    pub detached: AtomicUsize,
    spawned: Arc<AtomicUsize>,
    active_clones: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl Enemy {
    pub fn template() -> Arc<Enemy> {
        Arc::new(Self::with_validity(true))
    }

    pub fn empty() -> Arc<Enemy> {
        Arc::new(Self::with_validity(false))
    }

    fn with_validity(valid: bool) -> Enemy {
        Enemy {
            id: 0,
            valid,
            active: AtomicBool::new(true),
            detached: AtomicUsize::new(0),
            spawned: Arc::new(AtomicUsize::new(0)),
            active_clones: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn detach_count(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }

    /// Number of clones made from this template so far.
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Number of clones of this template that are currently active.
    pub fn active_clones(&self) -> usize {
        self.active_clones.load(Ordering::SeqCst)
    }
}

impl Instantiate for Enemy {
    fn instantiate(&self) -> Self {
        let id = self.spawned.fetch_add(1, Ordering::SeqCst) + 1;
        self.active_clones.fetch_add(1, Ordering::SeqCst);
        Enemy {
            id,
            valid: self.valid,
            active: AtomicBool::new(true),
            detached: AtomicUsize::new(0),
            spawned: self.spawned.clone(),
            active_clones: self.active_clones.clone(),
        }
    }

    fn set_active(&self, active: bool) {
        if self.active.swap(active, Ordering::SeqCst) != active {
            if active {
                self.active_clones.fetch_add(1, Ordering::SeqCst);
            } else {
                self.active_clones.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    fn detach(&self) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}
