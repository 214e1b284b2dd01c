//! Cart service providing a simplified API for cart operations.

use std::collections::HashMap;
use std::sync::Arc;

use common::AggregateId;
use event_store::{EventStore, EventStoreExt};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::catalog::Catalog;
use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{AddToCart, Cart, CartError, CloseCart, OpenCart};

/// Service for managing session carts.
///
/// Wraps a command handler together with the catalog every add is checked
/// against. Commands against one cart are serialized, so concurrent adds
/// never race on the cart's version.
pub struct CartService<S: EventStore> {
    handler: CommandHandler<S, Cart>,
    catalog: Arc<Catalog>,
    locks: Mutex<HashMap<AggregateId, Arc<Mutex<()>>>>,
}

impl<S: EventStore> CartService<S> {
    pub fn new(store: S, catalog: Arc<Catalog>) -> Self {
        Self {
            handler: CommandHandler::new(store),
            catalog,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Waits for exclusive access to one cart.
    async fn lock_cart(&self, cart_id: AggregateId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(cart_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub fn handler(&self) -> &CommandHandler<S, Cart> {
        &self.handler
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Opens a cart for a new session.
    #[tracing::instrument(skip(self))]
    pub async fn open_cart(&self, cmd: OpenCart) -> Result<CommandResult<Cart>, DomainError> {
        let cart_id = cmd.cart_id;
        let _guard = self.lock_cart(cart_id).await;
        let result = self
            .handler
            .execute(cart_id, |cart| cart.open(cart_id))
            .await?;

        tracing::info!(%cart_id, "cart opened");
        Ok(result)
    }

    /// Adds one unit of a catalog item to a cart.
    #[tracing::instrument(skip(self, cmd), fields(cart_id = %cmd.cart_id, item_id = %cmd.item_id))]
    pub async fn add_to_cart(&self, cmd: AddToCart) -> Result<CommandResult<Cart>, DomainError> {
        let item_id = cmd.item_id;
        let _guard = self.lock_cart(cmd.cart_id).await;

        let result = self
            .handler
            .execute(cmd.cart_id, |cart| cart.add(&self.catalog, item_id))
            .await;

        match &result {
            Ok(outcome) => {
                metrics::counter!("cart_items_added_total").increment(1);
                tracing::debug!(
                    total_quantity = outcome.aggregate.total_quantity(),
                    "item added"
                );
            }
            Err(DomainError::Cart(CartError::UnknownItem { .. })) => {
                metrics::counter!("cart_unknown_item_total").increment(1);
                tracing::warn!("add to cart rejected: unknown item");
            }
            Err(_) => {}
        }

        result
    }

    /// Loads a cart, returning None if it was never opened or was closed.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, cart_id: AggregateId) -> Result<Option<Cart>, DomainError> {
        self.handler.load_existing(cart_id).await
    }

    /// Returns the cart's total quantity.
    pub async fn total_quantity(&self, cart_id: AggregateId) -> Result<u64, DomainError> {
        let cart = self
            .get_cart(cart_id)
            .await?
            .ok_or_else(|| not_found(cart_id))?;
        Ok(cart.total_quantity())
    }

    /// Ends a session's cart by discarding its events.
    #[tracing::instrument(skip(self))]
    pub async fn close_cart(&self, cmd: CloseCart) -> Result<(), DomainError> {
        let cart_id = cmd.cart_id;
        let _guard = self.lock_cart(cart_id).await;
        if !self.handler.store().aggregate_exists(cart_id).await? {
            return Err(not_found(cart_id));
        }

        let removed = self.handler.discard(cart_id).await?;
        self.locks.lock().await.remove(&cart_id);
        tracing::info!(%cart_id, events = removed, "cart closed");
        Ok(())
    }
}

fn not_found(cart_id: AggregateId) -> DomainError {
    DomainError::AggregateNotFound {
        aggregate_type: "Cart",
        aggregate_id: cart_id.to_string(),
    }
}
