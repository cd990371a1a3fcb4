pub mod migrate;
pub mod token;
pub mod validate;
