mod directory_service;
mod friendship_service;
mod library_service;
mod profile_service;

pub use directory_service::*;
pub use friendship_service::*;
pub use library_service::*;
pub use profile_service::*;
