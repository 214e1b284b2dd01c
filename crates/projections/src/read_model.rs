//! Read model trait for query-side views.

/// A read model providing query access to denormalized cart data.
///
/// Views are updated by projections and answer the storefront's queries
/// (badge count, cart listing, button labels) without replaying events.
pub trait ReadModel: Send + Sync {
    /// Returns the name of this read model.
    fn name(&self) -> &'static str;

    /// Returns the number of carts tracked by this read model.
    fn count(&self) -> usize;
}
