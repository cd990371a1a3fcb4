use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::Product;
use crate::types::{is_truthy, ProductField};

/// Inclusive numeric bounds. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }
}

/// Declarative listing request as submitted by clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    #[serde(deserialize_with = "lenient_range")]
    pub price_range: Option<NumericRange>,
    #[serde(deserialize_with = "lenient_range")]
    pub stock_range: Option<NumericRange>,
    #[serde(deserialize_with = "lenient_strings")]
    pub categories: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_flag")]
    pub show_low_stock: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub show_out_of_stock: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub sort_by: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sort_order: Option<String>,
    #[serde(deserialize_with = "lenient_integer")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub page_size: Option<i64>,
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Anything but an object is no range; unusable bounds are dropped
fn lenient_range<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NumericRange>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(bounds) => Some(NumericRange {
            min: lenient_number(bounds.get("min")),
            max: lenient_number(bounds.get("max")),
        }),
        _ => None,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,
    #[serde(rename = "$in")] In,
}

impl FilterOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: ProductField,
    pub operator: FilterOp,
    pub data: Value,
}

impl FilterWhereInfo {
    pub fn matches(&self, product: &Product) -> bool {
        let actual = field_value(product, self.column);
        if let (FilterOp::In, Value::Array(options)) = (self.operator, &self.data) {
            return options.iter().any(|o| compare(&actual, o) == Some(Ordering::Equal));
        }
        let Some(ord) = compare(&actual, &self.data) else { return false };
        match self.operator {
            FilterOp::Eq | FilterOp::In => ord == Ordering::Equal,
            FilterOp::Gt => ord == Ordering::Greater,
            FilterOp::Gte => ord != Ordering::Less,
            FilterOp::Lt => ord == Ordering::Less,
            FilterOp::Lte => ord != Ordering::Greater,
        }
    }
}

/// Store-agnostic boolean condition over products. Ownership is not a
/// condition that can be replaced or removed: every predicate carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    owner: Uuid,
    conditions: Vec<FilterWhereInfo>,
}

impl Predicate {
    pub fn owned_by(owner: Uuid) -> Self {
        Self { owner, conditions: vec![] }
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn conditions_for(&self, column: ProductField) -> impl Iterator<Item = &FilterWhereInfo> {
        self.conditions.iter().filter(move |c| c.column == column)
    }

    pub fn is_ownership_only(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Add a condition alongside any existing ones on the same column
    pub fn and(mut self, column: ProductField, operator: FilterOp, data: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo { column, operator, data: data.into() });
        self
    }

    /// Drop every existing condition on `column` and install `conditions`
    /// in their place.
    pub fn replace(&mut self, column: ProductField, conditions: Vec<(FilterOp, Value)>) -> &mut Self {
        self.conditions.retain(|c| c.column != column);
        self.conditions.extend(
            conditions
                .into_iter()
                .map(|(operator, data)| FilterWhereInfo { column, operator, data }),
        );
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        product.user_id == self.owner && self.conditions.iter().all(|c| c.matches(product))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: ProductField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Newest first
    fn default() -> Self {
        Self { field: ProductField::CreatedAt, direction: SortDirection::Desc }
    }
}

impl SortSpec {
    /// Ordering used by the in-memory store. Ties fall back to ascending id
    /// so that pages never overlap.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self.field {
            ProductField::Id => a.id.cmp(&b.id),
            ProductField::Name => a.name.cmp(&b.name),
            ProductField::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
            ProductField::Stock => a.stock.cmp(&b.stock),
            ProductField::Category => a.category.cmp(&b.category),
            ProductField::StockVisible => a.stock_visible.cmp(&b.stock_visible),
            ProductField::UserId => a.user_id.cmp(&b.user_id),
            ProductField::CreatedAt => a.created_at.cmp(&b.created_at),
            ProductField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub skip: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub predicate: Predicate,
    pub sort: SortSpec,
    pub pagination: Pagination,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

fn field_value(product: &Product, field: ProductField) -> Value {
    match field {
        ProductField::Id => Value::String(product.id.to_string()),
        ProductField::Name => Value::String(product.name.clone()),
        ProductField::Price => Value::from(product.price),
        ProductField::Stock => Value::from(product.stock),
        ProductField::Category => Value::String(product.category.clone()),
        ProductField::StockVisible => Value::Bool(product.stock_visible),
        ProductField::UserId => Value::String(product.user_id.to_string()),
        ProductField::CreatedAt => Value::String(product.created_at.to_rfc3339()),
        ProductField::UpdatedAt => Value::String(product.updated_at.to_rfc3339()),
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
