use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::config::BulkConfig;
use crate::error::CatalogError;
use crate::types::{is_truthy, CreateProduct};

/// First rule a bulk candidate failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    MissingRequiredFields,
    InvalidPrice,
    InvalidStock,
    InvalidName,
    InvalidCategory,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ValidationIssue::MissingRequiredFields => "missing required fields",
            ValidationIssue::InvalidPrice => "invalid price",
            ValidationIssue::InvalidStock => "invalid stock",
            ValidationIssue::InvalidName => "invalid name",
            ValidationIssue::InvalidCategory => "invalid category",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted(CreateProduct),
    /// `index` is the zero-based position in the submitted batch
    Rejected { index: usize, issue: ValidationIssue },
}

impl ValidationOutcome {
    /// `Row {n}: {reason}` with a one-based row number
    pub fn error_message(&self) -> Option<String> {
        match self {
            ValidationOutcome::Accepted(_) => None,
            ValidationOutcome::Rejected { index, issue } => Some(format!("Row {}: {}", index + 1, issue)),
        }
    }
}

/// Outcomes partitioned for reporting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: Vec<CreateProduct>,
    pub errors: Vec<String>,
}

impl ValidationSummary {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl From<Vec<ValidationOutcome>> for ValidationSummary {
    fn from(outcomes: Vec<ValidationOutcome>) -> Self {
        let mut summary = ValidationSummary { total: outcomes.len(), ..Default::default() };
        for outcome in outcomes {
            match outcome {
                ValidationOutcome::Accepted(product) => summary.valid.push(product),
                rejected => summary.errors.extend(rejected.error_message()),
            }
        }
        summary
    }
}

/// Screens raw bulk candidates. Pure: the same batch always yields the same
/// outcomes.
#[derive(Debug, Clone)]
pub struct BulkValidator {
    zero_is_missing: bool,
    max_batch_size: Option<usize>,
}

impl Default for BulkValidator {
    fn default() -> Self {
        Self { zero_is_missing: true, max_batch_size: None }
    }
}

impl From<&BulkConfig> for BulkValidator {
    fn from(config: &BulkConfig) -> Self {
        Self {
            zero_is_missing: config.zero_is_missing,
            max_batch_size: config.max_batch_size,
        }
    }
}

impl BulkValidator {
    pub fn new(zero_is_missing: bool, max_batch_size: Option<usize>) -> Self {
        Self { zero_is_missing, max_batch_size }
    }

    pub fn validate(&self, candidates: &[Value]) -> Result<Vec<ValidationOutcome>, CatalogError> {
        if candidates.is_empty() {
            return Err(CatalogError::invalid("Products array cannot be empty"));
        }
        if let Some(limit) = self.max_batch_size.filter(|limit| candidates.len() > *limit) {
            return Err(CatalogError::invalid(format!(
                "Too many products: {} exceeds the limit of {}",
                candidates.len(),
                limit
            )));
        }

        Ok(candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| match self.check(candidate) {
                Ok(product) => ValidationOutcome::Accepted(product),
                Err(issue) => ValidationOutcome::Rejected { index, issue },
            })
            .collect())
    }

    pub fn summarize(&self, candidates: &[Value]) -> Result<ValidationSummary, CatalogError> {
        Ok(self.validate(candidates)?.into())
    }

    fn check(&self, candidate: &Value) -> Result<CreateProduct, ValidationIssue> {
        let field = |name: &str| candidate.get(name).unwrap_or(&Value::Null);
        let (name, price, stock, category) = (field("name"), field("price"), field("stock"), field("category"));

        if ![name, price, stock, category].into_iter().all(|v| self.present(v)) {
            return Err(ValidationIssue::MissingRequiredFields);
        }

        let price = price
            .as_f64()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or(ValidationIssue::InvalidPrice)?;
        let stock = stock
            .as_i64()
            .or_else(|| stock.as_f64().filter(|s| s.fract() == 0.0 && s.abs() < i64::MAX as f64).map(|s| s as i64))
            .filter(|s| *s >= 0)
            .ok_or(ValidationIssue::InvalidStock)?;
        let name = name
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationIssue::InvalidName)?;
        let category = category
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationIssue::InvalidCategory)?;

        Ok(CreateProduct {
            id: candidate
                .get("_id")
                .or_else(|| candidate.get("id"))
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
            name: name.to_string(),
            price,
            stock,
            category: category.to_string(),
            stock_visible: Some(candidate.get("stockVisible").and_then(Value::as_bool).unwrap_or(true)),
        })
    }

    fn present(&self, value: &Value) -> bool {
        if self.zero_is_missing {
            is_truthy(value)
        } else {
            !matches!(value, Value::Null) && value != &Value::Bool(false) && value.as_str() != Some("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reasons(outcomes: &[ValidationOutcome]) -> Vec<Option<String>> {
        outcomes.iter().map(ValidationOutcome::error_message).collect()
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = BulkValidator::default().validate(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Products array cannot be empty");
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let validator = BulkValidator::new(true, Some(2));
        let batch = vec![json!({}); 3];
        assert!(matches!(validator.validate(&batch), Err(CatalogError::InvalidArgument { .. })));
    }

    #[test]
    fn large_batch_is_accepted_without_a_cap() {
        let batch = vec![json!({"name": "A", "price": 1, "stock": 1, "category": "X"}); 5000];
        let outcomes = BulkValidator::default().validate(&batch).unwrap();
        assert_eq!(outcomes.len(), 5000);
        assert!(outcomes.iter().all(|o| matches!(o, ValidationOutcome::Accepted(_))));
    }

    #[test]
    fn well_formed_candidate_is_normalized() {
        let outcomes = BulkValidator::default()
            .validate(&[json!({"name": "  Widget ", "price": 9.99, "stock": 3, "category": "Tools "})])
            .unwrap();
        assert_eq!(
            outcomes,
            vec![ValidationOutcome::Accepted(CreateProduct {
                id: None,
                name: "Widget".into(),
                price: 9.99,
                stock: 3,
                category: "Tools".into(),
                stock_visible: Some(true),
            })]
        );
    }

    #[test]
    fn zero_price_counts_as_missing() {
        let outcomes = BulkValidator::default()
            .validate(&[json!({"name": "A", "price": 0, "stock": 5, "category": "X"})])
            .unwrap();
        assert_eq!(reasons(&outcomes), vec![Some("Row 1: missing required fields".to_string())]);
    }

    #[test]
    fn zero_values_accepted_when_quirk_disabled() {
        let outcomes = BulkValidator::new(false, None)
            .validate(&[json!({"name": "A", "price": 0, "stock": 0, "category": "X"})])
            .unwrap();
        assert!(matches!(outcomes[0], ValidationOutcome::Accepted(_)));
    }

    #[test]
    fn first_failing_rule_wins() {
        let batch = [
            json!({"name": "A", "price": -1, "stock": -1, "category": "X"}),
            json!({"name": "A", "price": "9", "stock": 1, "category": "X"}),
            json!({"name": "A", "price": 1, "stock": -4, "category": "X"}),
            json!({"name": "A", "price": 1, "stock": 2.5, "category": "X"}),
            json!({"name": "   ", "price": 1, "stock": 1, "category": "X"}),
            json!({"name": 7, "price": 1, "stock": 1, "category": "X"}),
            json!({"name": "A", "price": 1, "stock": 1, "category": " "}),
            json!({"name": "A", "price": 1, "category": "X"}),
        ];
        let outcomes = BulkValidator::default().validate(&batch).unwrap();
        assert_eq!(
            reasons(&outcomes),
            vec![
                Some("Row 1: invalid price".to_string()),
                Some("Row 2: invalid price".to_string()),
                Some("Row 3: invalid stock".to_string()),
                Some("Row 4: invalid stock".to_string()),
                Some("Row 5: invalid name".to_string()),
                Some("Row 6: invalid name".to_string()),
                Some("Row 7: invalid category".to_string()),
                Some("Row 8: missing required fields".to_string()),
            ]
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let validator = BulkValidator::default();
        let batch = [
            json!({"name": "A", "price": 1, "stock": 1, "category": "X", "stockVisible": false}),
            json!("not an object"),
        ];
        assert_eq!(validator.validate(&batch).unwrap(), validator.validate(&batch).unwrap());
    }

    #[test]
    fn summary_partitions_outcomes() {
        let summary = BulkValidator::default()
            .summarize(&[
                json!({"name": "A", "price": 1, "stock": 1, "category": "X"}),
                json!({"name": "B", "price": 1, "stock": -1, "category": "X"}),
                json!({"name": "C", "price": 2, "stock": 7, "category": "Y"}),
            ])
            .unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.valid.len(), 2);
        assert_eq!(summary.errors, vec!["Row 2: invalid stock".to_string()]);
        assert!(summary.has_errors());
    }

    #[test]
    fn client_id_is_carried_through() {
        let id = uuid::Uuid::new_v4();
        let outcomes = BulkValidator::default()
            .validate(&[json!({"_id": id.to_string(), "name": "A", "price": 1, "stock": 1, "category": "X"})])
            .unwrap();
        match &outcomes[0] {
            ValidationOutcome::Accepted(product) => assert_eq!(product.id, Some(id)),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
