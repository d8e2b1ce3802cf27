//! Sales aggregation over order exports.
//!
//! Every function here is a pure iterator pipeline over a slice of orders.
//! Orders are de-duplicated by identity first, so a re-exported order is
//! counted once.

use crate::domain::{Currency, DomainError, Money, Order, OrderStatus, ProductSnapshot};
use indexmap::IndexMap;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

/// First occurrence of each order, in input order.
pub fn deduplicate_orders(orders: &[Order]) -> Vec<&Order> {
    let mut seen = HashSet::new();
    orders.iter().filter(|o| seen.insert(o.id())).collect()
}

/// Count distinct orders with the given status.
pub fn count_orders_by_status(orders: &[Order], status: OrderStatus) -> usize {
    deduplicate_orders(orders)
        .into_iter()
        .filter(|o| o.status() == status)
        .count()
}

/// Gross revenue of all distinct, non-empty orders.
///
/// Returns `Ok(None)` when no order contributes, and a currency mismatch
/// error when orders are priced in different currencies.
pub fn calculate_total_revenue(orders: &[Order]) -> Result<Option<Money>, DomainError> {
    deduplicate_orders(orders)
        .into_iter()
        .filter(|o| !o.is_empty())
        .map(Order::total_before_discount)
        .filter_map(Result::transpose)
        .try_fold(None, |sum: Option<Money>, total| {
            let total = total?;
            Ok(Some(match sum {
                Some(sum) => sum.add(&total)?,
                None => total,
            }))
        })
}

/// Distinct products across all order lines, in order of first appearance.
pub fn distinct_products_sold(orders: &[Order]) -> Vec<ProductSnapshot> {
    let mut seen = HashSet::new();
    orders
        .iter()
        .flat_map(|o| o.lines())
        .map(|line| line.key().product())
        .filter(|product| seen.insert(*product))
        .cloned()
        .collect()
}

/// Gross revenue of distinct, non-empty orders, split by currency.
pub fn revenue_by_currency(orders: &[Order]) -> Result<BTreeMap<Currency, Money>, DomainError> {
    let mut revenue: BTreeMap<Currency, Money> = BTreeMap::new();

    for order in deduplicate_orders(orders) {
        let Some(total) = order.total_before_discount()? else {
            continue;
        };

        match revenue.entry(total.currency()) {
            Entry::Occupied(mut entry) => {
                let sum = entry.get().add(&total)?;
                entry.insert(sum);
            }
            Entry::Vacant(entry) => {
                entry.insert(total);
            }
        }
    }

    Ok(revenue)
}

/// Distinct-order counts for every status, including zero counts.
pub fn status_breakdown(orders: &[Order]) -> BTreeMap<OrderStatus, usize> {
    let mut breakdown: BTreeMap<OrderStatus, usize> =
        OrderStatus::ALL.iter().map(|status| (*status, 0)).collect();

    for order in deduplicate_orders(orders) {
        *breakdown.entry(order.status()).or_default() += 1;
    }

    breakdown
}

/// Units sold per product over distinct orders, highest first.
///
/// Ties keep the order in which products were first seen.
pub fn units_sold_by_product(orders: &[Order]) -> Vec<(ProductSnapshot, u64)> {
    let mut units: IndexMap<&ProductSnapshot, u64> = IndexMap::new();

    for line in deduplicate_orders(orders).into_iter().flat_map(|o| o.lines()) {
        *units.entry(line.key().product()).or_default() += u64::from(line.quantity());
    }

    let mut sorted: Vec<(ProductSnapshot, u64)> = units
        .into_iter()
        .map(|(product, count)| (product.clone(), count))
        .collect();
    sorted.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    sorted
}

/// The `n` best-selling products by units.
pub fn top_products(orders: &[Order], n: usize) -> Vec<(ProductSnapshot, u64)> {
    let mut products = units_sold_by_product(orders);
    products.truncate(n);
    products
}

/// Orders that carry no lines at all, counted once each.
pub fn empty_order_count(orders: &[Order]) -> usize {
    deduplicate_orders(orders)
        .into_iter()
        .filter(|o| o.is_empty())
        .count()
}
