//! Data models for the sales report.
//!
//! This module contains the structures that describe loaded inputs, summary
//! statistics and the complete report.

use crate::analysis;
use crate::domain::{Currency, DomainError, Money, Order, OrderStatus, ProductSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One input that was read, successfully or not.
#[derive(Debug, Clone, Serialize)]
pub struct InputFile {
    /// Path relative to the input root, or the URL.
    pub path: String,
    /// Number of orders parsed from this input.
    pub order_count: usize,
    /// Error message if loading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InputFile {
    pub fn loaded(path: String, order_count: usize) -> Self {
        Self {
            path,
            order_count,
            error: None,
        }
    }

    pub fn failed(path: String, error: String) -> Self {
        Self {
            path,
            order_count: 0,
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Units and gross revenue of a single product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSales {
    pub product: ProductSnapshot,
    pub units: u64,
    pub revenue: Money,
}

impl ProductSales {
    pub fn new(product: ProductSnapshot, units: u64) -> Result<Self, DomainError> {
        let revenue = product.unit_price().multiply(units)?;
        Ok(Self {
            product,
            units,
            revenue,
        })
    }
}

/// Summary statistics over all loaded orders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalesSummary {
    /// Orders read, including re-exports of the same order.
    pub orders_read: usize,
    /// Orders after de-duplication by id.
    pub distinct_orders: usize,
    /// Re-exported orders that were dropped.
    pub duplicates_dropped: usize,
    /// Distinct orders without lines.
    pub empty_orders: usize,
    /// Distinct orders per status.
    pub by_status: BTreeMap<OrderStatus, usize>,
    /// Gross revenue per currency.
    pub revenue: BTreeMap<Currency, Money>,
    /// Number of distinct products sold.
    pub distinct_products: usize,
}

impl SalesSummary {
    /// Creates a summary from a list of orders.
    pub fn from_orders(orders: &[Order]) -> Result<Self, DomainError> {
        let distinct_orders = analysis::deduplicate_orders(orders).len();

        Ok(Self {
            orders_read: orders.len(),
            distinct_orders,
            duplicates_dropped: orders.len() - distinct_orders,
            empty_orders: analysis::empty_order_count(orders),
            by_status: analysis::status_breakdown(orders),
            revenue: analysis::revenue_by_currency(orders)?,
            distinct_products: analysis::distinct_products_sold(orders).len(),
        })
    }
}

/// Metadata about the report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Input directory, file or URL.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Inputs loaded without error.
    pub files_loaded: usize,
    /// Inputs that failed to load.
    pub files_failed: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete sales report.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub metadata: ReportMetadata,
    pub summary: SalesSummary,
    /// Distinct products in order of first appearance.
    pub products: Vec<ProductSnapshot>,
    /// Best-selling products by units.
    pub top_products: Vec<ProductSales>,
    /// Every input that was read.
    pub inputs: Vec<InputFile>,
}

impl SalesReport {
    /// Builds the report body for `orders`; the caller supplies metadata.
    pub fn build(
        metadata: ReportMetadata,
        orders: &[Order],
        inputs: Vec<InputFile>,
        top_n: usize,
    ) -> Result<Self, DomainError> {
        let top_products = analysis::top_products(orders, top_n)
            .into_iter()
            .map(|(product, units)| ProductSales::new(product, units))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            metadata,
            summary: SalesSummary::from_orders(orders)?,
            products: analysis::distinct_products_sold(orders),
            top_products,
            inputs,
        })
    }

    /// Inputs that failed to load.
    pub fn failed_inputs(&self) -> impl Iterator<Item = &InputFile> + '_ {
        self.inputs.iter().filter(|input| input.is_failed())
    }
}
