/// Number of slots a pool adds when it runs out of released instances,
/// unless configured otherwise.
pub const DEFAULT_GROW_SIZE: usize = 5;

/// Sizing parameters for a [`Pool`](crate::Pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Instances cloned up front when the pool is created.
    pub initial_size: usize,
    /// Slots appended when an allocation finds no released instance.
    /// Zero disables growth, turning exhaustion into an error.
    pub grow_size: usize,
}

impl PoolConfig {
    /// Sets the number of instances created up front.
    pub fn with_initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = initial_size;
        self
    }

    /// Sets the growth increment.
    pub fn with_grow_size(mut self, grow_size: usize) -> Self {
        self.grow_size = grow_size;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            initial_size: 0,
            grow_size: DEFAULT_GROW_SIZE,
        }
    }
}
