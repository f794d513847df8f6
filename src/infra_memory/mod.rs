mod document_store_memory;
mod fault_injecting_store;

pub use document_store_memory::*;
pub use fault_injecting_store::*;
