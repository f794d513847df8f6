mod library;
mod profile;
mod relationship;
mod user;

pub use library::*;
pub use profile::*;
pub use relationship::*;
pub use user::*;
