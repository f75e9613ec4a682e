use thiserror::Error;

/// Result type for pool operations.
pub type Result<T> = core::result::Result<T, PoolError>;

/// Errors reported by [`Pool`](crate::Pool) and
/// [`PoolRegistry`](crate::PoolRegistry).
///
/// Releasing an unknown instance and initializing an already registered
/// template are not errors; those calls are silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The template rejected itself through [`Instantiate::is_valid`](crate::Instantiate::is_valid).
    #[error("template is null or empty and cannot be instantiated")]
    InvalidTemplate,

    /// Every slot is lent out and the pool is not allowed to grow.
    #[error("pool exhausted: all {size} instances are in use and growth is disabled")]
    Exhausted {
        /// Slot count at the time of the failed allocation.
        size: usize,
    },
}
