//! Read models and projections for the storefront's query side.
//!
//! This crate provides the query side of the CQRS pattern:
//! - [`Projection`] trait for processing events into read models
//! - [`ReadModel`] trait for query access to denormalized data
//! - [`ProjectionProcessor`] for feeding events from the store to projections
//! - Three views: the cart badge, cart contents and add-to-cart button feedback

pub mod error;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use views::{
    ButtonFeedbackView, ButtonLabel, CartBadgeView, CartContents, CartContentsView,
    CartLineSummary, DEFAULT_REVERT_MS,
};
