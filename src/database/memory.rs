use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProduct, Product};
use crate::database::store::{InsertOutcome, ProductStore};
use crate::filter::{Predicate, SortSpec};
use crate::types::UpdateProduct;

/// Process-local product store, used for development and tests
#[derive(Clone, Default)]
pub struct MemoryProductStore {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    fn insert_locked(map: &mut HashMap<Uuid, Product>, product: NewProduct) -> Result<Product, DatabaseError> {
        if map.contains_key(&product.id) {
            return Err(DatabaseError::DuplicateKey(format!("product {} already exists", product.id)));
        }
        let stored = product.into_product(Utc::now());
        map.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn count(&self, predicate: &Predicate) -> Result<i64, DatabaseError> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| predicate.matches(p)).count() as i64)
    }

    async fn find(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Product>, DatabaseError> {
        let products = self.products.read().await;
        let mut matching: Vec<Product> = products.values().filter(|p| predicate.matches(p)).cloned().collect();
        matching.sort_by(|a, b| sort.compare(a, b));
        Ok(matching
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_one(&self, id: Uuid, owner: Uuid) -> Result<Option<Product>, DatabaseError> {
        let products = self.products.read().await;
        Ok(products.get(&id).filter(|p| p.user_id == owner).cloned())
    }

    async fn insert_one(&self, product: NewProduct) -> Result<Product, DatabaseError> {
        let mut products = self.products.write().await;
        Self::insert_locked(&mut products, product)
    }

    async fn insert_many(&self, batch: Vec<NewProduct>) -> Result<Vec<InsertOutcome>, DatabaseError> {
        let mut outcomes = Vec::with_capacity(batch.len());
        for product in batch {
            let id = product.id;
            let mut products = self.products.write().await;
            outcomes.push(match Self::insert_locked(&mut products, product) {
                Ok(product) => InsertOutcome::Inserted { product },
                Err(e) if e.is_duplicate_key() => InsertOutcome::Duplicate { id },
                Err(e) => InsertOutcome::Failed { message: e.to_string() },
            });
        }
        Ok(outcomes)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: &UpdateProduct,
    ) -> Result<Option<Product>, DatabaseError> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(&id).filter(|p| p.user_id == owner).map(|product| {
            product.apply(patch, Utc::now());
            product.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid, owner: Uuid) -> Result<Option<Product>, DatabaseError> {
        let mut products = self.products.write().await;
        if products.get(&id).map(|p| p.user_id == owner).unwrap_or(false) {
            Ok(products.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
