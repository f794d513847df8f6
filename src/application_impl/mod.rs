mod directory_service_impl;
mod friend_action_dispatcher;
mod friendship_service_impl;
mod identity_provider_fake;
mod library_service_impl;
mod profile_service_impl;

pub use directory_service_impl::*;
pub use friend_action_dispatcher::*;
pub use friendship_service_impl::*;
pub use identity_provider_fake::*;
pub use library_service_impl::*;
pub use profile_service_impl::*;
