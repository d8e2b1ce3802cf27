//! Currency codes and exact money amounts.
//!
//! Amounts are stored as an integer count of minor units (cents for USD),
//! already normalised to the currency's default scale.

use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO-4217 style currency code, three upper-case ASCII letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// Trims, upper-cases and validates a currency code.
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let normalized = code.trim().to_ascii_uppercase();
        let bytes = <[u8; 3]>::try_from(normalized.as_bytes())
            .map_err(|_| DomainError::InvalidCurrency(code.to_string()))?;

        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(DomainError::InvalidCurrency(code.to_string()));
        }

        Ok(Self(bytes))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Default number of fraction digits for this currency.
    pub fn minor_units(&self) -> u32 {
        match self.as_str() {
            "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "UGX" | "XAF" | "XOF" => 0,
            "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

/// An exact amount in a single currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr", into = "MoneyRepr")]
pub struct Money {
    units: i64,
    currency: Currency,
}

/// Wire shape of [`Money`]: the amount travels as decimal text.
#[derive(Serialize, Deserialize)]
struct MoneyRepr {
    amount: String,
    currency: Currency,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = DomainError;

    fn try_from(value: MoneyRepr) -> Result<Self, Self::Error> {
        Money::parse(&value.amount, value.currency)
    }
}

impl From<Money> for MoneyRepr {
    fn from(value: Money) -> Self {
        Self {
            amount: value.to_string(),
            currency: value.currency,
        }
    }
}

impl Money {
    /// Parses decimal text of any scale, rounding HALF_UP to the currency scale.
    pub fn parse(amount: &str, currency: Currency) -> Result<Self, DomainError> {
        let units = parse_minor_units(amount, currency.minor_units())?;
        Ok(Self { units, currency })
    }

    /// Builds money from an already-scaled count of minor units.
    pub const fn from_minor(units: i64, currency: Currency) -> Self {
        Self { units, currency }
    }

    pub const fn zero(currency: Currency) -> Self {
        Self::from_minor(0, currency)
    }

    /// Amount in minor units.
    pub const fn amount_minor(&self) -> i64 {
        self.units
    }

    pub const fn currency(&self) -> Currency {
        self.currency
    }

    pub const fn is_negative(&self) -> bool {
        self.units < 0
    }

    /// Returns `self` when non-negative, otherwise fails with `message`.
    pub fn require_non_negative(self, message: &str) -> Result<Self, DomainError> {
        if self.is_negative() {
            return Err(DomainError::NegativeAmount(message.to_string()));
        }
        Ok(self)
    }

    /// Adds another amount in the same currency.
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        self.require_same_currency(other)?;
        let units = self
            .units
            .checked_add(other.units)
            .ok_or(DomainError::AmountOverflow)?;
        Ok(Self::from_minor(units, self.currency))
    }

    /// Multiplies by a non-negative integer factor.
    pub fn multiply(&self, factor: u64) -> Result<Money, DomainError> {
        let factor = i64::try_from(factor).map_err(|_| DomainError::AmountOverflow)?;
        let units = self
            .units
            .checked_mul(factor)
            .ok_or(DomainError::AmountOverflow)?;
        Ok(Self::from_minor(units, self.currency))
    }

    fn require_same_currency(&self, other: &Money) -> Result<(), DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = self.currency.minor_units();
        let sign = if self.units < 0 { "-" } else { "" };
        let magnitude = self.units.unsigned_abs();

        if scale == 0 {
            return write!(f, "{sign}{magnitude}");
        }

        let divisor = 10u64.pow(scale);
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / divisor,
            magnitude % divisor,
            width = scale as usize
        )
    }
}

/// Converts decimal text to minor units at `scale`, rounding half away from zero.
fn parse_minor_units(text: &str, scale: u32) -> Result<i64, DomainError> {
    let invalid = || DomainError::InvalidAmount(text.to_string());
    let trimmed = text.trim();

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let push_digit = |units: i64, digit: u8| {
        units
            .checked_mul(10)
            .and_then(|u| u.checked_add(i64::from(digit - b'0')))
            .ok_or(DomainError::AmountOverflow)
    };

    let mut units = int_part.bytes().try_fold(0i64, push_digit)?;

    let mut fraction = frac_part.bytes();
    for _ in 0..scale {
        units = push_digit(units, fraction.next().unwrap_or(b'0'))?;
    }

    // HALF_UP: only the first dropped digit decides.
    if fraction.next().is_some_and(|b| b >= b'5') {
        units = units.checked_add(1).ok_or(DomainError::AmountOverflow)?;
    }

    Ok(if negative { -units } else { units })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    #[test]
    fn test_currency_normalization() {
        assert_eq!(Currency::new(" usd ").unwrap().as_str(), "USD");
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("US1").is_err());
        assert!(Currency::new("").is_err());
    }

    #[test]
    fn test_currency_minor_units() {
        assert_eq!(usd().minor_units(), 2);
        assert_eq!(Currency::new("JPY").unwrap().minor_units(), 0);
        assert_eq!(Currency::new("KWD").unwrap().minor_units(), 3);
    }

    #[test]
    fn test_parse_normalizes_scale() {
        assert_eq!(Money::parse("10", usd()).unwrap().to_string(), "10.00");
        assert_eq!(Money::parse("7.5", usd()).unwrap().amount_minor(), 750);
        assert_eq!(Money::parse("0.1", usd()).unwrap().to_string(), "0.10");
        assert_eq!(Money::parse(".5", usd()).unwrap().to_string(), "0.50");
    }

    #[test]
    fn test_parse_rounds_half_up() {
        assert_eq!(Money::parse("1.005", usd()).unwrap().to_string(), "1.01");
        assert_eq!(Money::parse("1.004", usd()).unwrap().to_string(), "1.00");
        assert_eq!(Money::parse("-1.005", usd()).unwrap().to_string(), "-1.01");

        let jpy = Currency::new("JPY").unwrap();
        assert_eq!(Money::parse("1200.5", jpy).unwrap().to_string(), "1201");

        let kwd = Currency::new("KWD").unwrap();
        assert_eq!(Money::parse("1.2345", kwd).unwrap().to_string(), "1.235");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", ".", "abc", "1.2.3", "1e5", "--1", "1,00"] {
            assert!(
                matches!(Money::parse(text, usd()), Err(DomainError::InvalidAmount(_))),
                "{text:?} should be rejected"
            );
        }
        assert_eq!(
            Money::parse("99999999999999999999", usd()),
            Err(DomainError::AmountOverflow)
        );
    }

    #[test]
    fn test_equal_amounts_at_different_scales() {
        assert_eq!(
            Money::parse("10", usd()).unwrap(),
            Money::parse("10.000", usd()).unwrap()
        );
    }

    #[test]
    fn test_add_requires_same_currency() {
        let ten = Money::parse("10.00", usd()).unwrap();
        let eur = Money::parse("1.00", Currency::new("EUR").unwrap()).unwrap();

        assert_eq!(ten.add(&ten).unwrap().to_string(), "20.00");
        assert!(matches!(
            ten.add(&eur),
            Err(DomainError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_multiply() {
        let price = Money::parse("7.50", usd()).unwrap();
        assert_eq!(price.multiply(2).unwrap().to_string(), "15.00");
        assert_eq!(price.multiply(0).unwrap(), Money::zero(usd()));
        assert_eq!(price.multiply(u64::MAX), Err(DomainError::AmountOverflow));
    }

    #[test]
    fn test_require_non_negative() {
        let negative = Money::parse("-0.01", usd()).unwrap();
        assert_eq!(
            negative.require_non_negative("no refunds"),
            Err(DomainError::NegativeAmount("no refunds".to_string()))
        );
        assert!(Money::zero(usd()).require_non_negative("no refunds").is_ok());
    }

    #[test]
    fn test_serde_shape() {
        let money = Money::parse("12.5", usd()).unwrap();
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, r#"{"amount":"12.50","currency":"USD"}"#);

        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }
}
