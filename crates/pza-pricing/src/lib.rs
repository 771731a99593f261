//! Pure pricing calculator.
//!
//! Prices are always derived, never stored: a pizza's price is its base plus
//! its cheese plus the sum of its toppings; an order's price is the sum of
//! pizza price × quantity over its line items. All arithmetic is in integer
//! cents over an immutable catalog snapshot — no state, no caching, no side
//! effects.

use pza_catalog::Catalog;
use pza_schemas::PizzaRecord;

// ---------------------------------------------------------------------------
// PricingError
// ---------------------------------------------------------------------------

/// Returned when a composition references a catalog id that does not
/// resolve, or when a computed price exceeds `i64` range.
///
/// The catalog is immutable, so the unknown-id variants only fire when a
/// pizza was composed against a different catalog than the one pricing it —
/// always indicative of a wiring error rather than user input. `Overflow`
/// can be reached from user input (quantities are client-controlled), so
/// totals are computed with checked arithmetic rather than trusted to fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    UnknownBase(i64),
    UnknownCheese(i64),
    UnknownTopping(i64),
    Overflow,
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::UnknownBase(id) => write!(f, "unknown pizza base id {id}"),
            PricingError::UnknownCheese(id) => write!(f, "unknown cheese type id {id}"),
            PricingError::UnknownTopping(id) => write!(f, "unknown topping id {id}"),
            PricingError::Overflow => write!(f, "price computation overflowed"),
        }
    }
}

impl std::error::Error for PricingError {}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

/// Price of one pizza in cents: base + cheese + Σ toppings.
///
/// Independent of topping ordering.
pub fn pizza_price_cents(catalog: &Catalog, pizza: &PizzaRecord) -> Result<i64, PricingError> {
    let base = catalog
        .base(pizza.base_id)
        .ok_or(PricingError::UnknownBase(pizza.base_id))?;
    let cheese = catalog
        .cheese(pizza.cheese_id)
        .ok_or(PricingError::UnknownCheese(pizza.cheese_id))?;

    let mut total = base
        .price_cents
        .checked_add(cheese.price_cents)
        .ok_or(PricingError::Overflow)?;
    for &tid in &pizza.topping_ids {
        let topping = catalog.topping(tid).ok_or(PricingError::UnknownTopping(tid))?;
        total = total
            .checked_add(topping.price_cents)
            .ok_or(PricingError::Overflow)?;
    }
    Ok(total)
}

/// Price of an order in cents: Σ pizza price × quantity over its line items.
///
/// Quantities come straight from the client, so the multiply and the running
/// sum are checked; an order whose total does not fit in `i64` cents prices
/// as `Overflow` instead of wrapping.
pub fn order_price_cents(
    catalog: &Catalog,
    lines: &[(PizzaRecord, i64)],
) -> Result<i64, PricingError> {
    let mut total = 0i64;
    for (pizza, quantity) in lines {
        let line = pizza_price_cents(catalog, pizza)?
            .checked_mul(*quantity)
            .ok_or(PricingError::Overflow)?;
        total = total.checked_add(line).ok_or(PricingError::Overflow)?;
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
