use super::error::*;
use super::handler;
use crate::domain_model::UserId;
use crate::domain_port::IdentityProvider;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let friends = warp::get()
        .and(warp::path("friends"))
        .and(warp::path::end())
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.directory_service.clone()))
        .and_then(handler::list_friends);

    let requests = warp::get()
        .and(warp::path!("friends" / "requests"))
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.directory_service.clone()))
        .and_then(handler::list_requests);

    let search = warp::get()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::query::<handler::SearchQuery>())
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.directory_service.clone()))
        .and_then(handler::search_users);

    let friend_action = warp::post()
        .and(warp::path!("friends" / String / String))
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.dispatcher.clone()))
        .and_then(handler::friend_action);

    let friend_status = warp::get()
        .and(warp::path!("friends" / String / "status"))
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.friendship_service.clone()))
        .and_then(handler::friend_status);

    let friend_library = warp::get()
        .and(warp::path!("friends" / String / "library"))
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.library_service.clone()))
        .and_then(handler::friend_library);

    let my_library = warp::get()
        .and(warp::path("library"))
        .and(warp::path::end())
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.library_service.clone()))
        .and_then(handler::my_library);

    let count_books = warp::get()
        .and(warp::path!("library" / "count"))
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.library_service.clone()))
        .and_then(handler::count_books);

    let save_book = warp::put()
        .and(warp::path!("library" / String))
        .and(warp::body::json())
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.library_service.clone()))
        .and_then(handler::save_book);

    let delete_book = warp::delete()
        .and(warp::path!("library" / String))
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.library_service.clone()))
        .and_then(handler::delete_book);

    let get_profile = warp::get()
        .and(warp::path!("profile" / String))
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.profile_service.clone()))
        .and_then(handler::get_profile);

    let create_profile = warp::post()
        .and(warp::path("profile"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.profile_service.clone()))
        .and_then(handler::create_profile);

    let update_profile = warp::put()
        .and(warp::path("profile"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_session(server.identity_provider.clone()))
        .and(with(server.profile_service.clone()))
        .and_then(handler::update_profile);

    friends
        .or(requests)
        .or(search)
        .or(friend_action)
        .or(friend_status)
        .or(friend_library)
        .or(my_library)
        .or(count_books)
        .or(save_book)
        .or(delete_book)
        .or(get_profile)
        .or(create_profile)
        .or(update_profile)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Resolves the bearer token to the signed-in user. A missing header is treated as signed out.
fn with_session(
    identity_provider: Arc<dyn IdentityProvider>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        move |token: Option<String>| {
            let identity_provider = identity_provider.clone();
            async move {
                let Some(token) = token.as_deref().and_then(|t| t.strip_prefix("Bearer ")) else {
                    return Err(reject::custom(ApiErrorCode::InvalidToken));
                };
                let session = identity_provider
                    .resolve_session(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok(session.uid)
            }
        },
    )
}
