//! Domain types for leaks and leak requests, the schema validator that
//! guards every write and read, and the database connection helper.

pub mod errors;
pub mod schema;
pub mod timestamp;
pub mod record;
pub mod leak;
pub mod request;
pub mod db;

pub use errors::{FlattenedErrors, Issue, ModelError, ValidationErrors};
pub use leak::{Leak, ProofBlob, PublishLeak};
pub use record::Record;
pub use request::{CreateLeakRequest, LeakRequest};
pub use schema::Schema;

#[cfg(test)]
mod tests;
