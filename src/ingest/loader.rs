//! Concurrent loading of order export files.

use super::record::parse_orders;
use crate::domain::Order;
use crate::models::InputFile;
use crate::scanner::ScannedFile;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tracing::{debug, warn};

/// Orders read from one input, together with its report entry.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub file: InputFile,
    pub orders: Vec<Order>,
}

impl LoadedInput {
    /// Parses `content` read from `path`. Failures are recorded, not returned.
    pub fn from_content(path: String, content: &str) -> Self {
        match parse_orders(content) {
            Ok(orders) => {
                debug!("Parsed {} orders from {}", orders.len(), path);
                Self {
                    file: InputFile::loaded(path, orders.len()),
                    orders,
                }
            }
            Err(e) => {
                warn!("Skipping {}: {}", path, e);
                Self::failed(path, e.to_string())
            }
        }
    }

    pub fn failed(path: String, error: String) -> Self {
        Self {
            file: InputFile::failed(path, error),
            orders: Vec::new(),
        }
    }
}

/// Read and parse files with up to `concurrency` in flight.
///
/// Results come back sorted by path regardless of completion order.
pub async fn load_files(
    files: Vec<ScannedFile>,
    concurrency: usize,
    progress: Option<ProgressBar>,
) -> Vec<LoadedInput> {
    let mut loaded: Vec<LoadedInput> = stream::iter(files)
        .map(|file| {
            let progress = progress.clone();
            async move {
                let input = match tokio::fs::read_to_string(&file.absolute_path).await {
                    Ok(content) => LoadedInput::from_content(file.path, &content),
                    Err(e) => {
                        warn!("Failed to read {}: {}", file.path, e);
                        LoadedInput::failed(file.path, e.to_string())
                    }
                };
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                input
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    loaded.sort_by(|a, b| a.file.path.cmp(&b.file.path));

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    loaded
}

/// All orders across loaded inputs, in input order.
pub fn collect_orders(inputs: &[LoadedInput]) -> Vec<Order> {
    inputs
        .iter()
        .flat_map(|input| input.orders.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ORDER: &str = r#"{
        "id": "0190f3a0-7c7d-7b8e-9c3a-6e1f2a3b4c5d",
        "status": "paid",
        "lines": [{ "sku": "p-1", "unit_price": "2.50", "currency": "USD", "quantity": 2 }]
    }"#;

    fn scanned(dir: &TempDir, name: &str) -> ScannedFile {
        let absolute_path = dir.path().join(name);
        ScannedFile {
            size: fs::metadata(&absolute_path).map(|m| m.len()).unwrap_or(0),
            path: name.to_string(),
            absolute_path,
        }
    }

    #[test]
    fn test_load_files_sorted_with_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), ORDER).unwrap();
        fs::write(dir.path().join("a.json"), "[]").unwrap();
        fs::write(dir.path().join("c.json"), "not json").unwrap();

        let files = vec![
            scanned(&dir, "c.json"),
            scanned(&dir, "b.json"),
            scanned(&dir, "a.json"),
            scanned(&dir, "missing.json"),
        ];

        let loaded = tokio_test::block_on(load_files(files, 2, None));
        let paths: Vec<_> = loaded.iter().map(|l| l.file.path.as_str()).collect();
        assert_eq!(paths, vec!["a.json", "b.json", "c.json", "missing.json"]);

        assert!(loaded[0].file.error.is_none());
        assert_eq!(loaded[0].file.order_count, 0);
        assert_eq!(loaded[1].orders.len(), 1);
        assert!(loaded[2].file.error.is_some());
        assert!(loaded[3].file.error.is_some());

        assert_eq!(collect_orders(&loaded).len(), 1);
    }

    #[test]
    fn test_from_content_records_failure() {
        let input = LoadedInput::from_content("x.json".to_string(), "{}");
        assert!(input.orders.is_empty());
        assert!(input.file.error.unwrap().contains("malformed"));
    }
}
