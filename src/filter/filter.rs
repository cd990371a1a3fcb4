use serde_json::Value;
use uuid::Uuid;

use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{
    CompiledFilter, FilterOp, FilterSpec, NumericRange, Pagination, Predicate, SortDirection, SortSpec, SqlResult,
};
use crate::config::FilterConfig;
use crate::types::{ProductField, LOW_STOCK_THRESHOLD};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub default_page_size: i64,
    /// Optional cap on the page size. Unset means unbounded.
    pub max_page_size: Option<i64>,
    pub debug_logging: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
            debug_logging: false,
        }
    }
}

impl From<&FilterConfig> for FilterOptions {
    fn from(config: &FilterConfig) -> Self {
        Self {
            default_page_size: if config.default_page_size > 0 { config.default_page_size } else { DEFAULT_PAGE_SIZE },
            max_page_size: config.max_page_size.filter(|max| *max > 0),
            debug_logging: config.debug_logging,
        }
    }
}

/// Compiles a [`FilterSpec`] into a predicate, sort and page. Never fails:
/// anything unusable falls back to its default.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    options: FilterOptions,
}

/// Compile with default options
pub fn compile(owner: Uuid, spec: &FilterSpec) -> CompiledFilter {
    Filter::default().compile(owner, spec)
}

impl Filter {
    pub fn new(options: FilterOptions) -> Self {
        Self { options }
    }

    pub fn compile(&self, owner: Uuid, spec: &FilterSpec) -> CompiledFilter {
        let compiled = CompiledFilter {
            predicate: Self::predicate(owner, spec),
            sort: Self::sort(spec),
            pagination: self.pagination(spec),
        };
        if self.options.debug_logging {
            tracing::debug!(?compiled, "compiled product filter");
        }
        compiled
    }

    fn predicate(owner: Uuid, spec: &FilterSpec) -> Predicate {
        let mut predicate = Predicate::owned_by(owner);

        if let Some(range) = &spec.price_range {
            predicate.replace(ProductField::Price, Self::range_conditions(range));
        }
        if let Some(range) = &spec.stock_range {
            predicate.replace(ProductField::Stock, Self::range_conditions(range));
        }
        if let Some(categories) = spec.categories.as_ref().filter(|c| !c.is_empty()) {
            let values = categories.iter().cloned().map(Value::String).collect();
            predicate.replace(ProductField::Category, vec![(FilterOp::In, Value::Array(values))]);
        }

        // The stock field is last-writer-wins: range, then low stock, then out of stock
        if spec.show_low_stock {
            predicate.replace(
                ProductField::Stock,
                vec![
                    (FilterOp::Gt, Value::from(0)),
                    (FilterOp::Lte, Value::from(LOW_STOCK_THRESHOLD)),
                ],
            );
        }
        if spec.show_out_of_stock {
            predicate.replace(ProductField::Stock, vec![(FilterOp::Eq, Value::from(0))]);
        }

        predicate
    }

    fn range_conditions(range: &NumericRange) -> Vec<(FilterOp, Value)> {
        let mut conditions = vec![];
        if let Some(min) = range.min { conditions.push((FilterOp::Gte, Value::from(min))); }
        if let Some(max) = range.max { conditions.push((FilterOp::Lte, Value::from(max))); }
        conditions
    }

    fn sort(spec: &FilterSpec) -> SortSpec {
        let Some(sort_by) = spec.sort_by.as_deref() else { return SortSpec::default() };
        match ProductField::sortable(sort_by) {
            Some(field) => {
                let direction = match spec.sort_order.as_deref() {
                    Some("desc") => SortDirection::Desc,
                    _ => SortDirection::Asc,
                };
                SortSpec { field, direction }
            }
            None => {
                tracing::debug!(sort_by, "unknown sort field, using default order");
                SortSpec::default()
            }
        }
    }

    fn pagination(&self, spec: &FilterSpec) -> Pagination {
        let page = spec.page.filter(|p| *p > 0).unwrap_or(1);
        let mut page_size = spec.page_size.filter(|s| *s > 0).unwrap_or(self.options.default_page_size);

        if let Some(max) = self.options.max_page_size {
            if page_size > max {
                tracing::warn!("Page size {} exceeds max {}, capping to max", page_size, max);
                page_size = max;
            }
        }

        Pagination {
            page,
            page_size,
            skip: (page - 1).saturating_mul(page_size),
        }
    }

    pub fn to_where_sql(predicate: &Predicate) -> SqlResult {
        let (query, params) = FilterWhere::generate(predicate, 0);
        SqlResult { query, params }
    }

    pub fn to_sql(table_name: &str, predicate: &Predicate, sort: &SortSpec, skip: i64, limit: i64) -> SqlResult {
        let where_result = Self::to_where_sql(predicate);
        let query = [
            format!("SELECT * FROM \"{}\"", table_name),
            format!("WHERE {}", where_result.query),
            FilterOrder::generate(sort),
            format!("LIMIT {} OFFSET {}", limit.max(0), skip.max(0)),
        ]
        .join(" ");
        SqlResult { query, params: where_result.params }
    }

    pub fn to_count_sql(table_name: &str, predicate: &Predicate) -> SqlResult {
        let where_result = Self::to_where_sql(predicate);
        let query = format!("SELECT COUNT(*) as count FROM \"{}\" WHERE {}", table_name, where_result.query);
        SqlResult { query, params: where_result.params }
    }
}
