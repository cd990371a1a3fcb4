use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::database::models::{NewProduct, Product};
use crate::database::{InsertOutcome, ProductStore};
use crate::error::CatalogError;
use crate::types::CreateProduct;

/// Per-record results of one ingestion, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub outcomes: Vec<InsertOutcome>,
}

impl IngestReport {
    pub fn inserted(&self) -> Vec<Product> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                InsertOutcome::Inserted { product } => Some(product.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn inserted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_inserted()).count()
    }

    pub fn has_duplicates(&self) -> bool {
        self.outcomes.iter().any(|o| matches!(o, InsertOutcome::Duplicate { .. }))
    }

    pub fn first_failure(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| match o {
            InsertOutcome::Failed { message } => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.inserted_count() == self.outcomes.len()
    }

    /// All-or-error view of the report. A `Conflict` does not mean nothing
    /// was written: the other records may have been inserted.
    pub fn into_strict(self) -> Result<Vec<Product>, CatalogError> {
        if self.has_duplicates() {
            return Err(CatalogError::conflict("Some products already exist"));
        }
        if let Some(message) = self.first_failure() {
            return Err(CatalogError::invalid(format!("Error creating products: {}", message)));
        }
        Ok(self.inserted())
    }
}

/// Commits validated products with unordered, per-record semantics
#[derive(Clone)]
pub struct BulkIngestionService {
    store: Arc<dyn ProductStore>,
}

impl BulkIngestionService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn ingest(&self, products: Vec<CreateProduct>, user_id: Uuid) -> Result<IngestReport, CatalogError> {
        let batch: Vec<NewProduct> = products.into_iter().map(|p| NewProduct::stamp(p, user_id)).collect();
        let attempted = batch.len();

        let outcomes = self.store.insert_many(batch).await.map_err(|e| {
            error!(%user_id, "bulk insert failed: {}", e);
            CatalogError::invalid(format!("Error creating products: {}", e))
        })?;

        let report = IngestReport { outcomes };
        info!(%user_id, attempted, inserted = report.inserted_count(), "ingested products");
        Ok(report)
    }
}
