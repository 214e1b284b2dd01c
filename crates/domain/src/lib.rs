//! Domain layer for the storefront cart system.
//!
//! This crate provides:
//! - Aggregate, DomainEvent and Command traits plus the CommandHandler
//! - The product catalog with its value objects
//! - The Cart aggregate, its commands, events and service
//! - Navigation menu state

pub mod aggregate;
pub mod cart;
pub mod catalog;
pub mod command;
pub mod error;
pub mod navigation;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{
    AddToCart, Cart, CartError, CartEvent, CartLine, CartService, CloseCart, OpenCart,
};
pub use catalog::{Catalog, CatalogError, CatalogItem, Money, Rating, StarBreakdown};
pub use command::{Command, CommandHandler, CommandResult};
pub use common::{AggregateId, CatalogItemId};
pub use error::DomainError;
pub use navigation::{NavigationCommand, NavigationState};
