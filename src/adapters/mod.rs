// Adapters layer: concrete implementations for external systems (database, http, filesystem).

pub mod http;
pub mod local_storage;
pub mod sqlite;
