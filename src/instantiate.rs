/// A trait defining how pooled instances are produced from a template and
/// switched on and off while they move in and out of a pool.
///
/// All hooks take `&self` because instances are shared through [`Arc`]
/// handles; keep active state behind interior mutability.
///
/// [`Arc`]: std::sync::Arc
pub trait Instantiate: Sized + Send + Sync + 'static {
    /// Creates a new, independent instance from this template.
    fn instantiate(&self) -> Self;

    /// Enables or disables the instance.
    ///
    /// The pool deactivates every fresh clone and every released instance,
    /// and activates instances right before handing them out.
    fn set_active(&self, active: bool);

    /// Clears any parent or owner association when the instance is
    /// released.
    ///
    /// By default, this method does nothing.
    #[inline(always)]
    fn detach(&self) {}

    /// Validates that this value can serve as a template.
    ///
    /// By default, this method always returns true. Override it to reject
    /// null or empty templates at pool construction.
    #[inline(always)]
    fn is_valid(&self) -> bool {
        true
    }
}
