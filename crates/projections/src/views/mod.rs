//! Read model views for the storefront.

pub mod button_feedback;
pub mod cart_badge;
pub mod cart_contents;

pub use button_feedback::{ButtonFeedbackView, ButtonLabel, DEFAULT_REVERT_MS};
pub use cart_badge::CartBadgeView;
pub use cart_contents::{CartContents, CartContentsView, CartLineSummary};
