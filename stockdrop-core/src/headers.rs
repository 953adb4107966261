//! CSV header renaming for exported product feeds.
//!
//! Only the first line is touched. Each header is trimmed, loses a leading
//! and a trailing double quote, and is replaced by its mapped name when one
//! exists. Remaining lines are passed through byte for byte.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::HeaderError;

/// Mapping from exported column names to the names the storefront expects.
pub fn default_header_mapping() -> BTreeMap<String, String> {
    [
        ("Title", "Title"),
        ("Option1 Value", "Colour"),
        ("Option2 Value", "Size"),
        ("Variant SKU", "Variant SKU"),
        ("Variant Inventory Qty", "Local Stock"),
        (
            "Variant Metafield: custom._7_10_day_dispatch_stock [number_integer]",
            "7-10 Day Stock",
        ),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// Rewrite one header line.
pub fn rewrite_header_line(line: &str, mapping: &BTreeMap<String, String>) -> String {
    line.split(',')
        .map(|header| {
            let trimmed = header.trim();
            let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
            let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
            mapping
                .get(trimmed)
                .map(String::as_str)
                .unwrap_or(trimmed)
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Rewrite the header row of `content`.
pub fn rewrite_csv(
    content: &str,
    mapping: &BTreeMap<String, String>,
) -> Result<String, HeaderError> {
    if content.is_empty() {
        return Err(HeaderError::Empty);
    }
    match content.split_once('\n') {
        Some((header, rest)) => Ok(format!("{}\n{rest}", rewrite_header_line(header, mapping))),
        None => Ok(rewrite_header_line(content, mapping)),
    }
}

/// `stock.csv` → `stock_processed.csv`. The `.csv` match is case-insensitive.
pub fn processed_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let processed = match name.len().checked_sub(4) {
        Some(split) if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(".csv") => {
            format!("{}_processed.csv", &name[..split])
        }
        _ => format!("{name}_processed"),
    };
    input.with_file_name(processed)
}

/// Rewrite `input` into its `_processed` sibling and return that path.
pub fn rewrite_file(
    input: &Path,
    mapping: &BTreeMap<String, String>,
) -> Result<PathBuf, HeaderError> {
    let content = std::fs::read_to_string(input).map_err(|source| HeaderError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let processed = rewrite_csv(&content, mapping)?;
    let output = processed_path(input);
    std::fs::write(&output, processed).map_err(|source| HeaderError::Io {
        path: output.clone(),
        source,
    })?;
    Ok(output)
}
