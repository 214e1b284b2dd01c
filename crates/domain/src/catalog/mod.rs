//! The fixed set of products offered by the storefront.

mod value_objects;

use std::collections::HashMap;
use std::path::Path;

use common::CatalogItemId;
use serde::Deserialize;
use thiserror::Error;

pub use value_objects::{CatalogItem, Money, Rating, StarBreakdown};

/// Errors raised while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Item {item_id} has a negative price: {price} cents")]
    NegativePrice { item_id: CatalogItemId, price: i64 },

    #[error("Invalid rating: {rating} (must be between 0 and 5)")]
    RatingOutOfRange { rating: u8 },

    #[error("Item {item_id} has an empty name")]
    EmptyName { item_id: CatalogItemId },

    #[error("Duplicate catalog item id: {item_id}")]
    DuplicateItem { item_id: CatalogItemId },

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One record of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    id: u32,
    name: String,
    price_cents: i64,
    image: String,
    rating: u8,
}

/// Immutable product catalog.
///
/// Items keep the order in which they were declared; lookups by id go
/// through an index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<CatalogItemId, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate identifiers.
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id(), position).is_some() {
                return Err(CatalogError::DuplicateItem { item_id: item.id() });
            }
        }
        Ok(Self { items, index })
    }

    /// The six products the storefront ships with.
    ///
    /// # Panics
    ///
    /// Panics if a built-in product fails validation; see
    /// [`try_storefront`](Self::try_storefront).
    pub fn storefront() -> Self {
        Self::try_storefront().expect("built-in storefront products are valid")
    }

    /// Builds the storefront catalog, surfacing any invalid built-in product.
    pub fn try_storefront() -> Result<Self, CatalogError> {
        const PRODUCTS: [(u32, &str, i64, &str, u8); 6] = [
            (
                1,
                "Wireless Headphones",
                5999,
                "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=60",
                4,
            ),
            (
                2,
                "Smart Watch",
                12999,
                "https://images.unsplash.com/photo-1523275335684-37898b6baf30?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=60",
                5,
            ),
            (
                3,
                "Bluetooth Speaker",
                3999,
                "https://images.unsplash.com/photo-1572569511254-d8f925fe2cbb?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=60",
                4,
            ),
            (
                4,
                "Phone Case",
                1999,
                "https://images.unsplash.com/photo-1601784551446-20c9e07cdbdb?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=60",
                3,
            ),
            (
                5,
                "Laptop Backpack",
                4999,
                "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=60",
                5,
            ),
            (
                6,
                "Wireless Charger",
                2999,
                "https://images.unsplash.com/photo-1583394838336-acd977736f90?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=60",
                4,
            ),
        ];

        let items = PRODUCTS
            .iter()
            .map(|&(id, name, cents, image, rating)| {
                CatalogItem::new(id, name, Money::from_cents(cents), image, rating)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(items)
    }

    /// Parses a JSON array of `{id, name, price_cents, image, rating}`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<CatalogRecord> = serde_json::from_str(json)?;
        let items = records
            .into_iter()
            .map(|r| {
                CatalogItem::new(
                    r.id,
                    r.name,
                    Money::from_cents(r.price_cents),
                    r.image,
                    r.rating,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(items)
    }

    /// Loads a catalog file in the format accepted by [`Catalog::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, id: CatalogItemId) -> Option<&CatalogItem> {
        self.index.get(&id).map(|&position| &self.items[position])
    }

    pub fn contains(&self, id: CatalogItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Items in declaration order.
    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn item(id: u32, name: &str, cents: i64) -> CatalogItem {
        CatalogItem::new(id, name, Money::from_cents(cents), "img.png", 4).unwrap()
    }

    #[test]
    fn test_storefront_products_all_validate() {
        let catalog = Catalog::try_storefront().unwrap();
        assert_eq!(catalog.len(), 6);
        for id in 1..=6 {
            assert!(catalog.contains(CatalogItemId::new(id)), "missing item {id}");
        }
    }

    #[test]
    fn test_storefront_catalog_contents() {
        let catalog = Catalog::storefront();
        assert_eq!(catalog.len(), 6);

        let names: Vec<_> = catalog.items().map(|i| i.name()).collect();
        assert_eq!(
            names,
            vec![
                "Wireless Headphones",
                "Smart Watch",
                "Bluetooth Speaker",
                "Phone Case",
                "Laptop Backpack",
                "Wireless Charger",
            ]
        );

        let watch = catalog.get(CatalogItemId::new(2)).unwrap();
        assert_eq!(watch.unit_price().to_string(), "$129.99");
        assert_eq!(watch.rating().value(), 5);

        let case = catalog.get(CatalogItemId::new(4)).unwrap();
        assert_eq!(case.rating().value(), 3);
    }

    #[test]
    fn test_lookup_unknown_id() {
        let catalog = Catalog::storefront();
        assert!(catalog.get(CatalogItemId::new(999)).is_none());
        assert!(!catalog.contains(CatalogItemId::new(999)));
        assert!(catalog.contains(CatalogItemId::new(6)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::new(vec![item(1, "A", 100), item(1, "B", 200)]);
        assert!(matches!(
            result,
            Err(CatalogError::DuplicateItem { item_id }) if item_id == CatalogItemId::new(1)
        ));
    }

    #[test]
    fn test_new_preserves_declaration_order() {
        let catalog = Catalog::new(vec![item(9, "Nine", 900), item(3, "Three", 300)]).unwrap();
        let ids: Vec<_> = catalog.items().map(|i| i.id().as_u32()).collect();
        assert_eq!(ids, vec![9, 3]);
        assert_eq!(catalog.get(CatalogItemId::new(3)).unwrap().name(), "Three");
    }

    #[test]
    fn test_from_json_str() {
        let catalog = Catalog::from_json_str(
            r#"[
                {"id": 1, "name": "Wireless Headphones", "price_cents": 5999, "image": "a.jpg", "rating": 4},
                {"id": 2, "name": "Smart Watch", "price_cents": 12999, "image": "b.jpg", "rating": 5}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(CatalogItemId::new(1)).unwrap().unit_price(),
            Money::from_cents(5999)
        );
    }

    #[test]
    fn test_from_json_str_validates_records() {
        let result = Catalog::from_json_str(
            r#"[{"id": 1, "name": "Broken", "price_cents": -5, "image": "a.jpg", "rating": 4}]"#,
        );
        assert!(matches!(result, Err(CatalogError::NegativePrice { .. })));

        let result = Catalog::from_json_str("{not json");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 10, "name": "Desk Lamp", "price_cents": 2500, "image": "lamp.jpg", "rating": 2}}]"#
        )
        .unwrap();

        let catalog = Catalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(CatalogItemId::new(10)).unwrap().name(),
            "Desk Lamp"
        );

        let missing = Catalog::from_json_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(CatalogError::Io(_))));
    }
}
