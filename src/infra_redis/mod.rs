mod document_store_redis;

pub use document_store_redis::*;
