//! Read-only catalog of pizza bases, cheese types and toppings.
//!
//! Reference data is immutable for the lifetime of the process: the catalog
//! is built once at boot from the canonical seed set and handed to the HTTP
//! layer and the pricing calculator as a shared snapshot. Lookups are by id;
//! listings are id-ordered (`BTreeMap` iteration order).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CatalogItem
// ---------------------------------------------------------------------------

/// One catalog row — a base, a cheese type or a topping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    /// Integer cents; always ≥ 0.
    pub price_cents: i64,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable lookup of all reference data.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    bases: BTreeMap<i64, CatalogItem>,
    cheeses: BTreeMap<i64, CatalogItem>,
    toppings: BTreeMap<i64, CatalogItem>,
}

impl Catalog {
    /// Build the canonical seed catalog.
    pub fn seeded() -> Self {
        let item = |id: i64, name: &str, price_cents: i64| CatalogItem {
            id,
            name: name.to_string(),
            price_cents,
        };

        let bases = [
            item(1, "Thin-crust", 500),
            item(2, "Normal", 600),
            item(3, "Cheese-burst", 700),
        ];
        let cheeses = [
            item(1, "Mozzarella", 100),
            item(2, "Cheddar", 150),
            item(3, "Parmesan", 200),
            item(4, "Vegan", 250),
        ];
        let toppings = [
            item(1, "Pepperoni", 100),
            item(2, "Mushrooms", 50),
            item(3, "Olives", 50),
            item(4, "Onions", 50),
            item(5, "Pineapple", 100),
            item(6, "Bacon", 150),
            item(7, "Jalapenos", 50),
        ];

        Self {
            bases: bases.into_iter().map(|i| (i.id, i)).collect(),
            cheeses: cheeses.into_iter().map(|i| (i.id, i)).collect(),
            toppings: toppings.into_iter().map(|i| (i.id, i)).collect(),
        }
    }

    pub fn base(&self, id: i64) -> Option<&CatalogItem> {
        self.bases.get(&id)
    }

    pub fn cheese(&self, id: i64) -> Option<&CatalogItem> {
        self.cheeses.get(&id)
    }

    pub fn topping(&self, id: i64) -> Option<&CatalogItem> {
        self.toppings.get(&id)
    }

    pub fn bases(&self) -> impl Iterator<Item = &CatalogItem> {
        self.bases.values()
    }

    pub fn cheeses(&self) -> impl Iterator<Item = &CatalogItem> {
        self.cheeses.values()
    }

    pub fn toppings(&self) -> impl Iterator<Item = &CatalogItem> {
        self.toppings.values()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_expected_counts() {
        let c = Catalog::seeded();
        assert_eq!(c.bases().count(), 3);
        assert_eq!(c.cheeses().count(), 4);
        assert_eq!(c.toppings().count(), 7);
    }

    #[test]
    fn lookups_resolve_seed_rows() {
        let c = Catalog::seeded();
        let base = c.base(1).unwrap();
        assert_eq!(base.name, "Thin-crust");
        assert_eq!(base.price_cents, 500);

        let cheese = c.cheese(4).unwrap();
        assert_eq!(cheese.name, "Vegan");
        assert_eq!(cheese.price_cents, 250);

        assert!(c.topping(7).is_some());
        assert!(c.topping(8).is_none());
        assert!(c.base(0).is_none());
    }

    #[test]
    fn listings_are_id_ordered() {
        let c = Catalog::seeded();
        let ids: Vec<i64> = c.toppings().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
