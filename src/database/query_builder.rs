use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, Predicate, SortSpec, SqlResult};

/// Executes compiled filters against a single table
pub struct QueryBuilder<T> {
    table_name: String,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = table_name.into();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DatabaseError::QueryError(format!("Invalid table name '{}'", name)));
        }
        Ok(Self {
            table_name: name,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub async fn select_page(
        &self,
        pool: &PgPool,
        predicate: &Predicate,
        sort: &SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<T>, DatabaseError> {
        let sql_result = Filter::to_sql(&self.table_name, predicate, sort, skip, limit);
        fetch_all(pool, &sql_result).await
    }

    pub async fn count(&self, pool: &PgPool, predicate: &Predicate) -> Result<i64, DatabaseError> {
        let sql_result = Filter::to_count_sql(&self.table_name, predicate);
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

pub async fn fetch_all<T>(pool: &PgPool, sql_result: &SqlResult) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_all(pool).await?)
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // IN lists are expanded to one placeholder per element before binding
        Value::Array(_) => q,
        Value::Object(_) => q.bind(v.clone()),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) => q,
        Value::Object(_) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Product;

    #[test]
    fn rejects_unsafe_table_names() {
        assert!(QueryBuilder::<Product>::new("products").is_ok());
        assert!(QueryBuilder::<Product>::new("products\"; --").is_err());
        assert!(QueryBuilder::<Product>::new("").is_err());
    }
}
