//! Markdown report generation.
//!
//! This module generates Markdown and JSON sales reports from the
//! aggregated results.

use crate::domain::ProductSnapshot;
use crate::models::{InputFile, ProductSales, ReportMetadata, SalesReport, SalesSummary};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SalesReport) -> String {
    let mut output = String::new();

    output.push_str("# Sales Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_status_section(&report.summary));
    output.push_str(&generate_revenue_section(&report.summary));
    output.push_str(&generate_top_products_section(&report.top_products));
    output.push_str(&generate_products_section(&report.products));
    output.push_str(&generate_failures_section(&report.inputs));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Inputs Loaded:** {}\n", metadata.files_loaded));
    if metadata.files_failed > 0 {
        section.push_str(&format!("- **Inputs Failed:** {}\n", metadata.files_failed));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &SalesSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Orders Read | Distinct Orders | Duplicates Dropped | Empty Orders | Distinct Products |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        summary.orders_read,
        summary.distinct_orders,
        summary.duplicates_dropped,
        summary.empty_orders,
        summary.distinct_products
    ));

    section
}

/// Generate the per-status section.
fn generate_status_section(summary: &SalesSummary) -> String {
    let mut section = String::new();

    section.push_str("## Orders by Status\n\n");
    section.push_str("| Status | Orders |\n");
    section.push_str("|:---|:---:|\n");
    for (status, count) in &summary.by_status {
        section.push_str(&format!("| {} | {} |\n", status, count));
    }
    section.push('\n');

    section
}

/// Generate the revenue section.
fn generate_revenue_section(summary: &SalesSummary) -> String {
    let mut section = String::new();

    section.push_str("## Revenue\n\n");

    if summary.revenue.is_empty() {
        section.push_str("No revenue: every order was empty.\n\n");
        return section;
    }

    section.push_str("Gross revenue before discounts.\n\n");
    section.push_str("| Currency | Revenue |\n");
    section.push_str("|:---|---:|\n");
    for (currency, amount) in &summary.revenue {
        section.push_str(&format!("| {} | {} |\n", currency, amount));
    }
    section.push('\n');

    section
}

/// Generate the top products section.
fn generate_top_products_section(top: &[ProductSales]) -> String {
    if top.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Products\n\n");
    section.push_str("| # | SKU | Unit Price | Units | Revenue |\n");
    section.push_str("|:---:|:---|---:|---:|---:|\n");

    for (i, sales) in top.iter().enumerate() {
        let price = sales.product.unit_price();
        section.push_str(&format!(
            "| {} | `{}` | {} {} | {} | {} {} |\n",
            i + 1,
            sales.product.sku(),
            price,
            price.currency(),
            sales.units,
            sales.revenue,
            sales.revenue.currency()
        ));
    }
    section.push('\n');

    section
}

/// Generate the distinct products section.
fn generate_products_section(products: &[ProductSnapshot]) -> String {
    if products.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Products Sold\n\n");
    section.push_str("| SKU | Unit Price |\n");
    section.push_str("|:---|---:|\n");
    for product in products {
        section.push_str(&format!(
            "| `{}` | {} {} |\n",
            product.sku(),
            product.unit_price(),
            product.unit_price().currency()
        ));
    }
    section.push('\n');

    section
}

/// Generate the failed inputs section.
fn generate_failures_section(inputs: &[InputFile]) -> String {
    let failed: Vec<_> = inputs.iter().filter(|i| i.is_failed()).collect();
    if failed.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Failed Inputs\n\n");
    for input in failed {
        section.push_str(&format!(
            "- `{}`: {}\n",
            input.path,
            input.error.as_deref().unwrap_or("unknown error")
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by sales-aggregator*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SalesReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
