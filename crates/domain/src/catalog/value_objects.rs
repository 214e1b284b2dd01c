//! Value objects for the storefront catalog.

use common::CatalogItemId;
use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Money amount represented in cents to avoid floating point issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.0.abs() % 100
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity, saturating at the numeric bounds.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(quantity)))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Customer rating of a product, from 0 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, CatalogError> {
        if stars > Self::MAX {
            return Err(CatalogError::RatingOutOfRange { rating: stars });
        }
        Ok(Self(stars))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Splits the rating into filled and empty stars out of [`Rating::MAX`].
    pub fn stars(&self) -> StarBreakdown {
        StarBreakdown {
            filled: self.0,
            empty: Self::MAX - self.0,
        }
    }
}

/// How a rating is drawn: `filled` solid stars followed by `empty` outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarBreakdown {
    pub filled: u8,
    pub empty: u8,
}

impl StarBreakdown {
    /// One flag per star position, `true` for filled.
    pub fn positions(&self) -> Vec<bool> {
        (0..Rating::MAX).map(|i| i < self.filled).collect()
    }
}

/// A purchasable product, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    id: CatalogItemId,
    name: String,
    unit_price: Money,
    image: String,
    rating: Rating,
}

impl CatalogItem {
    /// Creates a catalog item.
    ///
    /// Fails if the name is blank, the price is negative or the rating is
    /// above five stars.
    pub fn new(
        id: impl Into<CatalogItemId>,
        name: impl Into<String>,
        unit_price: Money,
        image: impl Into<String>,
        rating: u8,
    ) -> Result<Self, CatalogError> {
        let id = id.into();
        let name = name.into();

        if name.trim().is_empty() {
            return Err(CatalogError::EmptyName { item_id: id });
        }
        if unit_price.is_negative() {
            return Err(CatalogError::NegativePrice {
                item_id: id,
                price: unit_price.cents(),
            });
        }

        Ok(Self {
            id,
            name,
            unit_price,
            image: image.into(),
            rating: Rating::new(rating)?,
        })
    }

    pub fn id(&self) -> CatalogItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Image reference (URL) shown with the product.
    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }
}
