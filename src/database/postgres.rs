use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewProduct, Product};
use crate::database::query_builder::QueryBuilder;
use crate::database::store::{InsertOutcome, ProductStore};
use crate::filter::{Predicate, SortSpec};
use crate::types::UpdateProduct;

pub const PRODUCTS_TABLE: &str = "products";

/// Postgres-backed product store
#[derive(Clone)]
pub struct PgProductStore {
    db: DatabaseManager,
}

impl PgProductStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    fn products(&self) -> Result<QueryBuilder<Product>, DatabaseError> {
        QueryBuilder::new(PRODUCTS_TABLE)
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn count(&self, predicate: &Predicate) -> Result<i64, DatabaseError> {
        self.products()?.count(self.db.pool(), predicate).await
    }

    async fn find(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Product>, DatabaseError> {
        self.products()?.select_page(self.db.pool(), predicate, sort, skip, limit).await
    }

    async fn find_one(&self, id: Uuid, owner: Uuid) -> Result<Option<Product>, DatabaseError> {
        let product = sqlx::query_as::<_, Product>(r#"SELECT * FROM "products" WHERE "id" = $1 AND "user_id" = $2"#)
            .bind(id)
            .bind(owner)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(product)
    }

    async fn insert_one(&self, product: NewProduct) -> Result<Product, DatabaseError> {
        let id = product.id;
        let inserted = sqlx::query_as::<_, Product>(
            r#"INSERT INTO "products" ("id", "name", "price", "stock", "category", "stock_visible", "user_id")
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT ("id") DO NOTHING
               RETURNING *"#,
        )
        .bind(product.id)
        .bind(product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category)
        .bind(product.stock_visible)
        .bind(product.user_id)
        .fetch_optional(self.db.pool())
        .await?;

        inserted.ok_or_else(|| DatabaseError::DuplicateKey(format!("product {} already exists", id)))
    }

    async fn insert_many(&self, products: Vec<NewProduct>) -> Result<Vec<InsertOutcome>, DatabaseError> {
        let mut outcomes = Vec::with_capacity(products.len());
        for product in products {
            let id = product.id;
            let outcome = match self.insert_one(product).await {
                Ok(product) => InsertOutcome::Inserted { product },
                Err(e) if e.is_duplicate_key() => {
                    debug!(%id, "skipping duplicate product");
                    InsertOutcome::Duplicate { id }
                }
                // A lost connection fails the whole batch
                Err(e @ DatabaseError::Sqlx(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)) => return Err(e),
                Err(e) => {
                    warn!(%id, "failed to insert product: {}", e);
                    InsertOutcome::Failed { message: e.to_string() }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: &UpdateProduct,
    ) -> Result<Option<Product>, DatabaseError> {
        let updated = sqlx::query_as::<_, Product>(
            r#"UPDATE "products" SET
                   "name" = COALESCE($3, "name"),
                   "price" = COALESCE($4, "price"),
                   "stock" = COALESCE($5, "stock"),
                   "category" = COALESCE($6, "category"),
                   "stock_visible" = COALESCE($7, "stock_visible"),
                   "updated_at" = now()
               WHERE "id" = $1 AND "user_id" = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.category.as_deref().map(str::trim))
        .bind(patch.stock_visible)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Product>, DatabaseError> {
        let deleted = sqlx::query_as::<_, Product>(
            r#"DELETE FROM "products" WHERE "id" = $1 AND "user_id" = $2 RETURNING *"#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }
}
