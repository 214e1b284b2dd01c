use common::CatalogItemId;
use serde::{Deserialize, Serialize};

use super::CartError;

/// One catalog item's quantity within a cart. The quantity is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    item_id: CatalogItemId,
    quantity: u32,
}

impl CartLine {
    pub fn new(item_id: CatalogItemId, quantity: u32) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        Ok(Self { item_id, quantity })
    }

    /// A freshly added line.
    pub(crate) fn first(item_id: CatalogItemId) -> Self {
        Self {
            item_id,
            quantity: 1,
        }
    }

    pub fn item_id(&self) -> CatalogItemId {
        self.item_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        debug_assert!(quantity >= 1);
        self.quantity = quantity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_quantity_rejected() {
        let result = CartLine::new(CatalogItemId::new(1), 0);
        assert!(matches!(
            result,
            Err(CartError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn test_first_line_has_quantity_one() {
        let line = CartLine::first(CatalogItemId::new(3));
        assert_eq!(line, CartLine::new(CatalogItemId::new(3), 1).unwrap());
    }
}
