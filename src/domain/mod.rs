//! Order domain: value objects and the `Order` aggregate.
//!
//! Every constructor validates its invariants and returns a [`DomainError`]
//! instead of panicking, so a value that reaches the analysis layer can be
//! trusted as-is.

pub mod ids;
pub mod money;
pub mod order;
pub mod product;

pub use ids::{DiscountId, LineId, OrderId};
pub use money::{Currency, Money};
pub use order::{Order, OrderStatus};
pub use product::{LineKey, OrderLine, ProductSnapshot, Sku};

use thiserror::Error;

/// Errors produced when a domain invariant would be broken.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Currency code is not three ASCII letters.
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),
    /// Amount text is not a plain decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Amount was negative where only non-negative values are allowed.
    #[error("{0}")]
    NegativeAmount(String),
    /// Arithmetic between two different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },
    /// Arithmetic left the representable range.
    #[error("amount overflow")]
    AmountOverflow,
    /// SKU did not match the accepted format.
    #[error("invalid SKU format: {0}")]
    InvalidSku(String),
    /// Identifier text is not a UUID.
    #[error("invalid uuid: {0}")]
    InvalidUuid(String),
    /// Identifier is a UUID of the wrong version.
    #[error("{kind} must be a UUIDv7")]
    NotUuidV7 { kind: &'static str },
    /// Quantity or quantity delta was zero.
    #[error("{0} must be positive")]
    NonPositiveQuantity(&'static str),
    /// Status text did not name a known status.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
    /// Order internals do not agree with each other.
    #[error("inconsistent order: {0}")]
    InconsistentOrder(String),
}
