pub mod product_service;
pub mod validation;

pub use product_service::{ProductPage, ProductService};
