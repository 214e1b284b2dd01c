//! Cart aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod line;
mod service;

pub use aggregate::Cart;
pub use commands::*;
pub use events::{CartEvent, CartOpenedData, LineAddedData, LineQuantityIncrementedData};
pub use line::CartLine;
pub use service::CartService;

use common::CatalogItemId;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested item is not in the catalog.
    #[error("Unknown catalog item: {item_id}")]
    UnknownItem { item_id: CatalogItemId },

    /// The cart has not been opened for a session yet.
    #[error("Cart has not been opened")]
    NotOpened,

    /// The cart was already opened.
    #[error("Cart already opened")]
    AlreadyOpened,

    /// A line was given a quantity below one.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// Incrementing the line would overflow its quantity.
    #[error("Quantity limit reached for item {item_id}")]
    QuantityOverflow { item_id: CatalogItemId },
}
