//! LanceDB-backed persistence for embedded document chunks.

pub mod schema;
pub mod store;

pub use schema::EMBEDDING_DIM;
pub use store::{DocumentStore, Retriever};
