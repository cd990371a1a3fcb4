use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::Value;

use crate::bulk::{BulkValidator, ValidationSummary};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn handle(file: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let candidates = load_candidates(file)?;
    let validator = BulkValidator::from(&AppConfig::from_env().bulk);
    let summary = validator.summarize(&candidates)?;

    let report = BatchReport::from(&summary);
    output_format.emit(&report, |r| {
        println!("Validation complete. {} valid products found.", r.valid_products);
        for error in r.validation_errors {
            eprintln!("  {}", error);
        }
    })?;
    if summary.has_errors() {
        bail!("{} of {} products are invalid", summary.errors.len(), summary.total);
    }
    Ok(())
}

/// Read a batch from JSON or YAML. Accepts a bare list or a
/// `{products: [...]}` document.
pub fn load_candidates(file: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;

    let is_yaml = matches!(
        file.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let document: Value = if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("invalid YAML in {}", file.display()))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", file.display()))?
    };

    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => Ok(items),
            _ => bail!("Products array is required"),
        },
        _ => bail!("Products array is required"),
    }
}

/// Same counts the upload validation endpoint reports
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchReport<'a> {
    total_products: usize,
    valid_products: usize,
    invalid_products: usize,
    validation_errors: &'a [String],
}

impl<'a> From<&'a ValidationSummary> for BatchReport<'a> {
    fn from(summary: &'a ValidationSummary) -> Self {
        Self {
            total_products: summary.total,
            valid_products: summary.valid.len(),
            invalid_products: summary.errors.len(),
            validation_errors: &summary.errors,
        }
    }
}
