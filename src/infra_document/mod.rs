mod library_store_doc;
mod relationship_store_doc;
mod user_directory_doc;

pub use library_store_doc::*;
pub use relationship_store_doc::*;
pub use user_directory_doc::*;
