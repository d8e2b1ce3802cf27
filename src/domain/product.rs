//! Products as captured on order lines.

use super::{DiscountId, DomainError, LineId, Money};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::LazyLock;

static SKU_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9_-]{1,63}$").expect("valid SKU pattern"));

/// Stock keeping unit code, upper-cased and validated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    /// Trims and upper-cases `value`, then checks the SKU format.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, DomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_uppercase();
        if !SKU_PATTERN.is_match(&normalized) {
            return Err(DomainError::InvalidSku(raw));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Sku {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Sku {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sku> for String {
    fn from(value: Sku) -> Self {
        value.0
    }
}

/// Product data frozen at the moment a line was written.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Hash)]
pub struct ProductSnapshot {
    sku: Sku,
    unit_price: Money,
}

impl ProductSnapshot {
    pub fn new(sku: Sku, unit_price: Money) -> Result<Self, DomainError> {
        let unit_price = unit_price.require_non_negative("Unit price cannot be negative")?;
        Ok(Self { sku, unit_price })
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn unit_price(&self) -> &Money {
        &self.unit_price
    }
}

/// Lines with the same product and discount share a key. `None` means no discount.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineKey {
    product: ProductSnapshot,
    discount: Option<DiscountId>,
}

impl LineKey {
    pub fn new(product: ProductSnapshot, discount: Option<DiscountId>) -> Self {
        Self { product, discount }
    }

    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    pub fn discount(&self) -> Option<&DiscountId> {
        self.discount.as_ref()
    }
}

/// One line of an order. Quantity is always positive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderLine {
    id: LineId,
    key: LineKey,
    quantity: u32,
}

impl OrderLine {
    pub fn new(id: LineId, key: LineKey, quantity: u32) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::NonPositiveQuantity("quantity"));
        }
        Ok(Self { id, key, quantity })
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn key(&self) -> &LineKey {
        &self.key
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns a copy with quantity raised by `delta`.
    pub fn increase_by(&self, delta: u32) -> Result<Self, DomainError> {
        if delta == 0 {
            return Err(DomainError::NonPositiveQuantity("delta"));
        }
        let quantity = self
            .quantity
            .checked_add(delta)
            .ok_or(DomainError::AmountOverflow)?;
        Self::new(self.id, self.key.clone(), quantity)
    }

    /// Returns a copy with an absolute quantity.
    pub fn with_quantity(&self, quantity: u32) -> Result<Self, DomainError> {
        Self::new(self.id, self.key.clone(), quantity)
    }

    /// Gross line amount before any discount rules.
    pub fn total_before_discount(&self) -> Result<Money, DomainError> {
        self.key
            .product
            .unit_price
            .multiply(u64::from(self.quantity))
    }
}
