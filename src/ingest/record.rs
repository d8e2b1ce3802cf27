//! Order export records and their conversion into domain orders.

use crate::domain::{
    Currency, DiscountId, DomainError, LineId, LineKey, Money, Order, OrderId, OrderLine,
    OrderStatus, ProductSnapshot, Sku,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning export text into orders.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Export text is not valid JSON or does not have the order shape.
    #[error("malformed order export: {0}")]
    Json(#[from] serde_json::Error),
    /// One order in the export does not have the order shape.
    #[error("order #{index}: malformed order: {source}")]
    Shape {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    /// An order-level field broke a domain rule.
    #[error("order #{index}: {source}")]
    Order {
        index: usize,
        #[source]
        source: DomainError,
    },
    /// A line-level field broke a domain rule.
    #[error("order #{index}, line #{line}: {source}")]
    Line {
        index: usize,
        line: usize,
        #[source]
        source: DomainError,
    },
}

/// Unit price as it appears in exports: decimal text or a JSON number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Text(String),
    Number(serde_json::Number),
}

impl PriceValue {
    fn as_text(&self) -> String {
        match self {
            PriceValue::Text(text) => text.clone(),
            PriceValue::Number(number) => number.to_string(),
        }
    }
}

/// One line of an exported order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRecord {
    /// Line id; a fresh one is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub sku: String,
    pub unit_price: PriceValue,
    pub currency: String,
    pub quantity: u32,
    #[serde(default)]
    pub discount_id: Option<String>,
}

/// One exported order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
}

impl LineRecord {
    fn to_line(&self) -> Result<OrderLine, DomainError> {
        let id = match &self.id {
            Some(text) => LineId::parse(text)?,
            None => LineId::new_random(),
        };
        let currency = Currency::new(&self.currency)?;
        let price = Money::parse(&self.unit_price.as_text(), currency)?;
        let product = ProductSnapshot::new(Sku::new(self.sku.as_str())?, price)?;
        let discount = self
            .discount_id
            .as_deref()
            .map(DiscountId::parse)
            .transpose()?;

        OrderLine::new(id, LineKey::new(product, discount), self.quantity)
    }
}

impl OrderRecord {
    /// Builds the order; `index` is the position in the export, used in errors.
    pub fn into_order(self, index: usize) -> Result<Order, IngestError> {
        let order_error = |source| IngestError::Order { index, source };

        let id = OrderId::parse(&self.id).map_err(order_error)?;
        let status: OrderStatus = self.status.parse().map_err(order_error)?;

        let mut order = Order::new(id, status);
        for (line_index, record) in self.lines.iter().enumerate() {
            let line_error = |source| IngestError::Line {
                index,
                line: line_index,
                source,
            };
            let line = record.to_line().map_err(line_error)?;
            order.insert_line(line).map_err(line_error)?;
        }

        Ok(order.with_version(self.version))
    }
}

/// Parses export text holding a single order object or an array of them.
pub fn parse_orders(content: &str) -> Result<Vec<Order>, IngestError> {
    let values = match serde_json::from_str::<serde_json::Value>(content)? {
        serde_json::Value::Array(values) => values,
        value => vec![value],
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let record: OrderRecord = serde_json::from_value(value)
                .map_err(|source| IngestError::Shape { index, source })?;
            record.into_order(index)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_ID: &str = "0190f3a0-7c7d-7b8e-9c3a-6e1f2a3b4c5d";

    #[test]
    fn test_parse_single_order() {
        let json = format!(
            r#"{{
                "id": "{ORDER_ID}",
                "status": "shipped",
                "version": 3,
                "lines": [
                    {{ "sku": "p-1", "unit_price": "10.00", "currency": "usd", "quantity": 2 }},
                    {{ "sku": "p-3", "unit_price": 7.5, "currency": "USD", "quantity": 1 }}
                ]
            }}"#
        );

        let orders = parse_orders(&json).unwrap();
        assert_eq!(orders.len(), 1);

        let order = &orders[0];
        assert_eq!(order.id().to_string(), ORDER_ID);
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.version(), 3);
        assert_eq!(order.line_count(), 2);
        assert_eq!(
            order.total_before_discount().unwrap().unwrap().to_string(),
            "27.50"
        );
    }

    #[test]
    fn test_parse_array_and_merge_repeated_keys() {
        let json = format!(
            r#"[{{
                "id": "{ORDER_ID}",
                "status": "NEW",
                "lines": [
                    {{ "sku": "p-1", "unit_price": "10.00", "currency": "USD", "quantity": 1 }},
                    {{ "sku": "P-1", "unit_price": "10", "currency": "USD", "quantity": 4 }}
                ]
            }}]"#
        );

        let orders = parse_orders(&json).unwrap();
        assert_eq!(orders[0].line_count(), 1);
        assert_eq!(orders[0].lines().next().unwrap().quantity(), 5);
    }

    #[test]
    fn test_rejects_non_v7_order_id() {
        let json = r#"{ "id": "8c2d6a0e-3f5b-4c1a-9f0e-2b7d4e6a1c3f", "status": "new" }"#;

        let err = parse_orders(json).unwrap_err();
        assert!(matches!(err, IngestError::Order { index: 0, .. }));
        assert!(err.to_string().contains("UUIDv7"));
    }

    #[test]
    fn test_reports_line_position() {
        let json = format!(
            r#"[
                {{ "id": "{ORDER_ID}", "status": "paid", "lines": [] }},
                {{ "id": "{ORDER_ID}", "status": "paid", "lines": [
                    {{ "sku": "p-1", "unit_price": "1.00", "currency": "USD", "quantity": 1 }},
                    {{ "sku": "p-2", "unit_price": "-1.00", "currency": "USD", "quantity": 1 }}
                ] }}
            ]"#
        );

        let err = parse_orders(&json).unwrap_err();
        assert!(matches!(err, IngestError::Line { index: 1, line: 1, .. }));
    }

    #[test]
    fn test_reports_position_of_malformed_order() {
        let json = format!(
            r#"[
                {{ "id": "{ORDER_ID}", "status": "paid", "lines": [] }},
                {{ "id": "{ORDER_ID}", "status": "paid", "lines": [
                    {{ "sku": "p-1", "unit_price": "1.00", "currency": "USD", "quantity": -1 }}
                ] }}
            ]"#
        );

        let err = parse_orders(&json).unwrap_err();
        assert!(matches!(err, IngestError::Shape { index: 1, .. }));
        assert!(err.to_string().starts_with("order #1: malformed order"));
    }

    #[test]
    fn test_reports_position_of_missing_field() {
        let json = format!(r#"{{ "id": "{ORDER_ID}", "lines": [] }}"#);

        let err = parse_orders(&json).unwrap_err();
        assert!(matches!(err, IngestError::Shape { index: 0, .. }));
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_rejects_unknown_status_and_bad_json() {
        let json = format!(r#"{{ "id": "{ORDER_ID}", "status": "lost" }}"#);
        assert!(matches!(
            parse_orders(&json),
            Err(IngestError::Order { .. })
        ));
        assert!(matches!(parse_orders("{ not json"), Err(IngestError::Json(_))));
    }
}
