use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::{NewProduct, Product};
use crate::database::ProductStore;
use crate::error::CatalogError;
use crate::filter::{Filter, FilterOp, FilterOptions, FilterSpec, Predicate};
use crate::services::validation::{validate_create, validate_update};
use crate::types::{CreateProduct, ProductField, ProductStats, UpdateProduct, LOW_STOCK_THRESHOLD};

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Owner-scoped product operations
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    filter: Filter,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>, options: FilterOptions) -> Self {
        Self {
            store,
            filter: Filter::new(options),
        }
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Count and fetch one page of the caller's products
    pub async fn list(&self, user_id: Uuid, spec: &FilterSpec) -> Result<ProductPage, CatalogError> {
        let compiled = self.filter.compile(user_id, spec);
        let pagination = compiled.pagination;

        let (total_count, items) = futures::try_join!(
            self.store.count(&compiled.predicate),
            self.store.find(&compiled.predicate, &compiled.sort, pagination.skip, pagination.page_size),
        )?;

        debug!(%user_id, total_count, returned = items.len(), "listed products");
        Ok(ProductPage {
            items,
            total_count,
            page: pagination.page,
            page_size: pagination.page_size,
        })
    }

    pub async fn get_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Product, CatalogError> {
        self.store
            .find_one(id, user_id)
            .await?
            .ok_or_else(CatalogError::product_not_found)
    }

    pub async fn create(&self, input: CreateProduct, user_id: Uuid) -> Result<Product, CatalogError> {
        let errors = validate_create(&input);
        if !errors.is_empty() {
            return Err(CatalogError::invalid_fields("Invalid product", errors));
        }

        match self.store.insert_one(NewProduct::stamp(input, user_id)).await {
            Ok(product) => {
                info!(id = %product.id, %user_id, "created product");
                Ok(product)
            }
            Err(e) if e.is_duplicate_key() => Err(CatalogError::conflict("Product already exists")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(&self, id: Uuid, patch: UpdateProduct, user_id: Uuid) -> Result<Product, CatalogError> {
        let errors = validate_update(&patch);
        if !errors.is_empty() {
            return Err(CatalogError::invalid_fields("Invalid product", errors));
        }

        if patch.is_empty() {
            return self.get_by_id(id, user_id).await;
        }

        self.store
            .update_by_id(id, user_id, &patch)
            .await?
            .ok_or_else(CatalogError::product_not_found)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<Product, CatalogError> {
        let deleted = self
            .store
            .delete_by_id(id, user_id)
            .await?
            .ok_or_else(CatalogError::product_not_found)?;
        info!(%id, %user_id, "deleted product");
        Ok(deleted)
    }

    /// Inventory counters. Low stock is a subset of in stock.
    pub async fn stats(&self, user_id: Uuid) -> Result<ProductStats, CatalogError> {
        let total = Predicate::owned_by(user_id);
        let in_stock = Predicate::owned_by(user_id).and(ProductField::Stock, FilterOp::Gt, 0);
        let low_stock = Predicate::owned_by(user_id)
            .and(ProductField::Stock, FilterOp::Gt, 0)
            .and(ProductField::Stock, FilterOp::Lte, LOW_STOCK_THRESHOLD);
        let out_of_stock = Predicate::owned_by(user_id).and(ProductField::Stock, FilterOp::Eq, 0);

        let (total_products, in_stock_count, low_stock_count, out_of_stock_count) = futures::try_join!(
            self.store.count(&total),
            self.store.count(&in_stock),
            self.store.count(&low_stock),
            self.store.count(&out_of_stock),
        )?;

        Ok(ProductStats {
            total_products,
            in_stock_count,
            low_stock_count,
            out_of_stock_count,
        })
    }
}
