//! The `Order` aggregate and its lifecycle status.

use super::{Currency, DiscountId, DomainError, LineId, LineKey, Money, OrderId, OrderLine, ProductSnapshot};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Paid,
    Shipped,
    Received,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::New,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Received,
    ];
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "New"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Received => write!(f, "Received"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(OrderStatus::New),
            "paid" => Ok(OrderStatus::Paid),
            "shipped" => Ok(OrderStatus::Shipped),
            "received" => Ok(OrderStatus::Received),
            _ => Err(DomainError::UnknownStatus(s.to_string())),
        }
    }
}

/// An order aggregate.
///
/// Lines are kept in insertion order. Each distinct [`LineKey`] has one
/// primary line, and adding the same product and discount again raises that
/// line's quantity instead of adding a second line. All lines share one
/// currency.
///
/// Equality and hashing use the [`OrderId`] only: two snapshots of the same
/// order are the same order.
#[derive(Clone, Debug)]
pub struct Order {
    id: OrderId,
    primary_line_for_key: IndexMap<LineKey, LineId>,
    lines: IndexMap<LineId, OrderLine>,
    status: OrderStatus,
    version: u64,
}

impl Order {
    /// Creates an empty order at version 0.
    pub fn new(id: OrderId, status: OrderStatus) -> Self {
        Self {
            id,
            primary_line_for_key: IndexMap::new(),
            lines: IndexMap::new(),
            status,
            version: 0,
        }
    }

    /// Rebuilds an order from stored parts, checking they agree with each other.
    pub fn from_parts(
        id: OrderId,
        primary_line_for_key: IndexMap<LineKey, LineId>,
        lines: IndexMap<LineId, OrderLine>,
        status: OrderStatus,
        version: u64,
    ) -> Result<Self, DomainError> {
        let mut currency: Option<Currency> = None;

        for (line_id, line) in &lines {
            if *line_id != line.id() {
                return Err(DomainError::InconsistentOrder(format!(
                    "line {} stored under id {}",
                    line.id(),
                    line_id
                )));
            }

            let line_currency = line.key().product().unit_price().currency();
            match currency {
                None => currency = Some(line_currency),
                Some(expected) if expected != line_currency => {
                    return Err(DomainError::InconsistentOrder(format!(
                        "line {line_id} is priced in {line_currency}, expected {expected}"
                    )));
                }
                Some(_) => {}
            }

            if !primary_line_for_key.contains_key(line.key()) {
                return Err(DomainError::InconsistentOrder(format!(
                    "line {line_id} has no primary entry for its key"
                )));
            }
        }

        for (key, line_id) in &primary_line_for_key {
            match lines.get(line_id) {
                Some(line) if line.key() == key => {}
                Some(_) => {
                    return Err(DomainError::InconsistentOrder(format!(
                        "primary line {line_id} does not carry its key"
                    )));
                }
                None => {
                    return Err(DomainError::InconsistentOrder(format!(
                        "primary line {line_id} is missing"
                    )));
                }
            }
        }

        Ok(Self {
            id,
            primary_line_for_key,
            lines,
            status,
            version,
        })
    }

    /// Overrides the version, e.g. when loading a stored snapshot.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &OrderLine> + '_ {
        self.lines.values()
    }

    pub fn line(&self, id: LineId) -> Option<&OrderLine> {
        self.lines.get(&id)
    }

    /// Primary line for a key, if any line carries it.
    pub fn line_for_key(&self, key: &LineKey) -> Option<&OrderLine> {
        self.primary_line_for_key
            .get(key)
            .and_then(|id| self.lines.get(id))
    }

    /// Currency shared by all lines; `None` for an empty order.
    pub fn currency(&self) -> Option<Currency> {
        self.lines
            .values()
            .next()
            .map(|line| line.key().product().unit_price().currency())
    }

    pub fn creation_instant(&self) -> DateTime<Utc> {
        self.id.creation_instant()
    }

    /// Adds `quantity` of a product, merging into the line that already has the same key.
    pub fn add_line(
        &mut self,
        product: ProductSnapshot,
        discount: Option<DiscountId>,
        quantity: u32,
    ) -> Result<LineId, DomainError> {
        let line = OrderLine::new(LineId::new_random(), LineKey::new(product, discount), quantity)?;
        self.insert_line(line)
    }

    /// Inserts a prepared line. A line whose key already exists is merged into
    /// the primary line for that key and the primary id is returned.
    pub fn insert_line(&mut self, line: OrderLine) -> Result<LineId, DomainError> {
        let line_currency = line.key().product().unit_price().currency();
        if let Some(currency) = self.currency() {
            if currency != line_currency {
                return Err(DomainError::CurrencyMismatch {
                    left: currency,
                    right: line_currency,
                });
            }
        }

        if let Some(primary_id) = self.primary_line_for_key.get(line.key()).copied() {
            let primary = self.lines.get(&primary_id).ok_or_else(|| {
                DomainError::InconsistentOrder(format!("primary line {primary_id} is missing"))
            })?;
            let merged = primary.increase_by(line.quantity())?;
            self.lines.insert(primary_id, merged);
            self.version += 1;
            return Ok(primary_id);
        }

        let line_id = line.id();
        if self.lines.contains_key(&line_id) {
            return Err(DomainError::InconsistentOrder(format!(
                "duplicate line id {line_id}"
            )));
        }

        self.primary_line_for_key.insert(line.key().clone(), line_id);
        self.lines.insert(line_id, line);
        self.version += 1;
        Ok(line_id)
    }

    /// Gross order amount before discounts; `None` for an empty order.
    pub fn total_before_discount(&self) -> Result<Option<Money>, DomainError> {
        let mut totals = self.lines.values().map(OrderLine::total_before_discount);
        let Some(first) = totals.next() else {
            return Ok(None);
        };
        totals
            .try_fold(first?, |sum, total| sum.add(&total?))
            .map(Some)
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

impl Hash for Order {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sku;

    fn product(sku: &str, price: &str, currency: &str) -> ProductSnapshot {
        let currency = Currency::new(currency).unwrap();
        ProductSnapshot::new(Sku::new(sku).unwrap(), Money::parse(price, currency).unwrap())
            .unwrap()
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("SHIPPED".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" paid ".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert!(matches!(
            "lost".parse::<OrderStatus>(),
            Err(DomainError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Received).unwrap();
        assert_eq!(json, "\"received\"");
    }

    #[test]
    fn test_add_line_merges_same_key() {
        let mut order = Order::new(OrderId::new_random(), OrderStatus::New);
        let first = order.add_line(product("p-1", "10.00", "USD"), None, 1).unwrap();
        let again = order.add_line(product("p-1", "10.00", "USD"), None, 2).unwrap();

        assert_eq!(first, again);
        assert_eq!(order.line_count(), 1);
        assert_eq!(order.line(first).unwrap().quantity(), 3);
        assert_eq!(order.version(), 2);
    }

    #[test]
    fn test_add_line_separates_discounted_key() {
        let mut order = Order::new(OrderId::new_random(), OrderStatus::New);
        let discount = DiscountId::new(uuid::Uuid::now_v7());
        order.add_line(product("p-1", "10.00", "USD"), None, 1).unwrap();
        order
            .add_line(product("p-1", "10.00", "USD"), Some(discount), 1)
            .unwrap();

        assert_eq!(order.line_count(), 2);
    }

    #[test]
    fn test_add_line_rejects_other_currency() {
        let mut order = Order::new(OrderId::new_random(), OrderStatus::Paid);
        order.add_line(product("p-1", "10.00", "USD"), None, 1).unwrap();

        let result = order.add_line(product("p-2", "5.00", "EUR"), None, 1);
        assert!(matches!(result, Err(DomainError::CurrencyMismatch { .. })));
        assert_eq!(order.line_count(), 1);
        assert_eq!(order.version(), 1);
    }

    #[test]
    fn test_total_before_discount() {
        let mut order = Order::new(OrderId::new_random(), OrderStatus::Received);
        assert_eq!(order.total_before_discount().unwrap(), None);

        order.add_line(product("p-2", "20.00", "USD"), None, 1).unwrap();
        order.add_line(product("p-3", "7.50", "USD"), None, 2).unwrap();

        let total = order.total_before_discount().unwrap().unwrap();
        assert_eq!(total.to_string(), "35.00");
        assert_eq!(order.currency().unwrap().as_str(), "USD");
    }

    #[test]
    fn test_equality_is_by_id() {
        let id = OrderId::new_random();
        let mut left = Order::new(id, OrderStatus::New);
        left.add_line(product("p-1", "10.00", "USD"), None, 1).unwrap();
        let right = Order::new(id, OrderStatus::Shipped);

        assert_eq!(left, right);
        assert_ne!(left, Order::new(OrderId::new_random(), OrderStatus::New));
    }

    #[test]
    fn test_from_parts_accepts_consistent_maps() {
        let line = OrderLine::new(
            LineId::new_random(),
            LineKey::new(product("p-1", "10.00", "USD"), None),
            2,
        )
        .unwrap();

        let mut primary = IndexMap::new();
        primary.insert(line.key().clone(), line.id());
        let mut lines = IndexMap::new();
        lines.insert(line.id(), line.clone());

        let order =
            Order::from_parts(OrderId::new_random(), primary, lines, OrderStatus::New, 4).unwrap();
        assert_eq!(order.version(), 4);
        assert_eq!(order.line_for_key(line.key()), Some(&line));
    }

    #[test]
    fn test_from_parts_rejects_dangling_primary() {
        let line = OrderLine::new(
            LineId::new_random(),
            LineKey::new(product("p-1", "10.00", "USD"), None),
            1,
        )
        .unwrap();

        let mut primary = IndexMap::new();
        primary.insert(line.key().clone(), LineId::new_random());

        let result = Order::from_parts(
            OrderId::new_random(),
            primary,
            IndexMap::new(),
            OrderStatus::New,
            0,
        );
        assert!(matches!(result, Err(DomainError::InconsistentOrder(_))));
    }

    #[test]
    fn test_from_parts_rejects_line_without_primary() {
        let line = OrderLine::new(
            LineId::new_random(),
            LineKey::new(product("p-1", "10.00", "USD"), None),
            1,
        )
        .unwrap();
        let mut lines = IndexMap::new();
        lines.insert(line.id(), line);

        let result = Order::from_parts(
            OrderId::new_random(),
            IndexMap::new(),
            lines,
            OrderStatus::New,
            0,
        );
        assert!(matches!(result, Err(DomainError::InconsistentOrder(_))));
    }

    #[test]
    fn test_from_parts_then_add_line_merges() {
        let line = OrderLine::new(
            LineId::new_random(),
            LineKey::new(product("p-1", "10.00", "USD"), None),
            1,
        )
        .unwrap();
        let mut primary = IndexMap::new();
        primary.insert(line.key().clone(), line.id());
        let mut lines = IndexMap::new();
        lines.insert(line.id(), line.clone());

        let mut order =
            Order::from_parts(OrderId::new_random(), primary, lines, OrderStatus::New, 0).unwrap();
        let merged = order.add_line(product("p-1", "10.00", "USD"), None, 2).unwrap();

        assert_eq!(merged, line.id());
        assert_eq!(order.line_count(), 1);
        assert_eq!(order.line(merged).unwrap().quantity(), 3);
    }

    #[test]
    fn test_from_parts_rejects_mixed_currency() {
        let usd = OrderLine::new(
            LineId::new_random(),
            LineKey::new(product("p-1", "10.00", "USD"), None),
            1,
        )
        .unwrap();
        let eur = OrderLine::new(
            LineId::new_random(),
            LineKey::new(product("p-2", "10.00", "EUR"), None),
            1,
        )
        .unwrap();

        let primary: IndexMap<_, _> = [
            (usd.key().clone(), usd.id()),
            (eur.key().clone(), eur.id()),
        ]
        .into_iter()
        .collect();
        let lines: IndexMap<_, _> = [(usd.id(), usd), (eur.id(), eur)].into_iter().collect();
        let result = Order::from_parts(OrderId::new_random(), primary, lines, OrderStatus::New, 0);
        assert!(matches!(result, Err(DomainError::InconsistentOrder(_))));
    }
}
