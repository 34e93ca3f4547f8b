//! Service layer: leak publication and leak requests on top of a pluggable
//! record store.
//! - Validation and domain types live in the `models` crate.
//! - Storage backends are interchangeable behind `storage::RecordStore`.

pub mod errors;
pub mod storage;
pub mod leak_service;
pub mod request_service;
pub mod runtime;
