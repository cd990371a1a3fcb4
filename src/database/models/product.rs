use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{CreateProduct, UpdateProduct};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub stock_visible: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Apply the fields present in `patch` and bump `updated_at`
    pub fn apply(&mut self, patch: &UpdateProduct, now: DateTime<Utc>) {
        if let Some(name) = &patch.name { self.name = name.trim().to_string(); }
        if let Some(price) = patch.price { self.price = price; }
        if let Some(stock) = patch.stock { self.stock = stock; }
        if let Some(category) = &patch.category { self.category = category.trim().to_string(); }
        if let Some(visible) = patch.stock_visible { self.stock_visible = visible; }
        self.updated_at = now;
    }
}

/// A product stamped with its owner, ready for insertion. Timestamps are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub stock_visible: bool,
    pub user_id: Uuid,
}

impl NewProduct {
    pub fn stamp(input: CreateProduct, user_id: Uuid) -> Self {
        Self {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            name: input.name.trim().to_string(),
            price: input.price,
            stock: input.stock,
            category: input.category.trim().to_string(),
            stock_visible: input.stock_visible.unwrap_or(true),
            user_id,
        }
    }

    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            price: self.price,
            stock: self.stock,
            category: self.category,
            stock_visible: self.stock_visible,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateProduct {
        CreateProduct {
            id: None,
            name: name.to_string(),
            price: 2.5,
            stock: 4,
            category: " Tools ".to_string(),
            stock_visible: None,
        }
    }

    #[test]
    fn stamp_defaults_visibility_and_trims() {
        let owner = Uuid::new_v4();
        let stamped = NewProduct::stamp(create("  Hammer "), owner);
        assert_eq!(stamped.name, "Hammer");
        assert_eq!(stamped.category, "Tools");
        assert!(stamped.stock_visible);
        assert_eq!(stamped.user_id, owner);
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let now = Utc::now();
        let mut product = NewProduct::stamp(create("Hammer"), Uuid::new_v4()).into_product(now);
        let patch = UpdateProduct { stock: Some(0), ..Default::default() };
        product.apply(&patch, now);
        assert_eq!(product.stock, 0);
        assert_eq!(product.name, "Hammer");
        assert_eq!(product.price, 2.5);
    }

    #[test]
    fn serializes_identifier_as_underscore_id() {
        let product = NewProduct::stamp(create("Hammer"), Uuid::new_v4()).into_product(Utc::now());
        let v = serde_json::to_value(&product).unwrap();
        assert!(v.get("_id").is_some());
        assert!(v.get("stockVisible").is_some());
        assert!(v.get("userId").is_some());
    }
}
