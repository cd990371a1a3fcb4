pub mod ingest;
pub mod validator;

pub use ingest::{BulkIngestionService, IngestReport};
pub use validator::{BulkValidator, ValidationIssue, ValidationOutcome, ValidationSummary};
