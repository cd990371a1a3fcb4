use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProduct, Product};
use crate::filter::{Predicate, SortSpec};
use crate::types::UpdateProduct;

/// Result of attempting one record of an unordered multi-insert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted { product: Product },
    Duplicate { id: Uuid },
    Failed { message: String },
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// Persistence seam for products. Every single-record operation is atomic;
/// `insert_many` is atomic per record only.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn count(&self, predicate: &Predicate) -> Result<i64, DatabaseError>;

    async fn find(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Product>, DatabaseError>;

    async fn find_one(&self, id: Uuid, owner: Uuid) -> Result<Option<Product>, DatabaseError>;

    /// Fails with [`DatabaseError::DuplicateKey`] when the id is taken
    async fn insert_one(&self, product: NewProduct) -> Result<Product, DatabaseError>;

    /// Unordered insert: every record is attempted and reported in input
    /// order, regardless of earlier failures.
    async fn insert_many(&self, products: Vec<NewProduct>) -> Result<Vec<InsertOutcome>, DatabaseError>;

    async fn update_by_id(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: &UpdateProduct,
    ) -> Result<Option<Product>, DatabaseError>;

    async fn delete_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Product>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
