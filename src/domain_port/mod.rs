// store

mod document_store;

pub use document_store::*;

// repo

mod library_store;
mod relationship_store;
mod user_directory;

pub use library_store::*;
pub use relationship_store::*;
pub use user_directory::*;

// identity

mod identity_provider;

pub use identity_provider::*;
