use crate::api::v1::error::{ApiError, ApiErrorCode};
use crate::application_impl::FriendActionDispatcher;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::reject;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action: Option<FriendAction>,
    pub target: UserId,
    pub message: StatusMessage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub target: UserId,
    pub status: FriendStatus,
    pub actions: Vec<FriendAction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryResponse {
    pub count: usize,
    pub books: Vec<Book>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub info_link: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub nickname: String,
    pub email: Option<String>,
}

impl From<ProfileRequest> for ProfileInput {
    fn from(req: ProfileRequest) -> Self {
        ProfileInput {
            nickname: req.nickname,
            email: req.email,
        }
    }
}

fn parse_uid(raw: &str) -> Result<UserId, warp::Rejection> {
    raw.parse::<UserId>()
        .map_err(|_| reject::custom(ApiErrorCode::InvalidRequest))
}

pub async fn list_friends(
    me: UserId,
    directory: Arc<dyn DirectoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let friends = directory
        .list_friends(&me)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(friends)))
}

pub async fn list_requests(
    me: UserId,
    directory: Arc<dyn DirectoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let requests = directory
        .list_incoming_requests(&me)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(requests)))
}

pub async fn search_users(
    query: SearchQuery,
    me: UserId,
    directory: Arc<dyn DirectoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let users = directory
        .search_users(&me, &query.q)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(users)))
}

/// Failures still answer with the outcome's message text so the caller can show it verbatim.
pub async fn friend_action(
    target: String,
    action: String,
    me: UserId,
    dispatcher: Arc<FriendActionDispatcher>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let target = parse_uid(&target)?;
    let outcome = dispatcher.dispatch_id(&me, &action, &target).await;

    let (status, body) = match &outcome.error {
        None => (
            warp::http::StatusCode::OK,
            ApiResponse::ok(ActionResponse {
                action: outcome.action,
                target: outcome.target.clone(),
                message: outcome.message.clone(),
            }),
        ),
        Some(error) => {
            let code = ApiErrorCode::from(error);
            (code.status(), ApiResponse::err(code, outcome.message.text.clone()))
        }
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

pub async fn friend_status(
    target: String,
    me: UserId,
    friendships: Arc<dyn FriendshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let target = parse_uid(&target)?;
    let status = friendships
        .derive_status(&me, &target)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(StatusResponse {
        target,
        status,
        actions: FriendAction::available_for(status).to_vec(),
    })))
}

pub async fn friend_library(
    target: String,
    me: UserId,
    library: Arc<dyn LibraryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let target = parse_uid(&target)?;
    let books = library
        .view_friend_library(&me, &target)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(LibraryResponse {
        count: books.len(),
        books,
    })))
}

pub async fn my_library(
    me: UserId,
    library: Arc<dyn LibraryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let books = library
        .list_books(&me)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(LibraryResponse {
        count: books.len(),
        books,
    })))
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

pub async fn count_books(
    me: UserId,
    library: Arc<dyn LibraryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let count = library
        .count_books(&me)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(CountResponse { count })))
}

pub async fn save_book(
    book_id: String,
    req: SaveBookRequest,
    me: UserId,
    library: Arc<dyn LibraryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let book = Book {
        id: BookId(book_id),
        title: req.title,
        authors: req.authors,
        thumbnail: req.thumbnail,
        info_link: req.info_link,
        saved_at: None,
    };
    let saved = library
        .save_book(&me, book)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(saved)))
}

pub async fn delete_book(
    book_id: String,
    me: UserId,
    library: Arc<dyn LibraryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    library
        .remove_book(&me, &BookId(book_id))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(())))
}

pub async fn get_profile(
    uid: String,
    me: UserId,
    profiles: Arc<dyn ProfileService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let uid = parse_uid(&uid)?;
    let profile = profiles
        .get_profile(&me, &uid)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

pub async fn create_profile(
    req: ProfileRequest,
    me: UserId,
    profiles: Arc<dyn ProfileService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profile = profiles
        .create_profile(&me, req.into())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

pub async fn update_profile(
    req: ProfileRequest,
    me: UserId,
    profiles: Arc<dyn ProfileService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profile = profiles
        .update_profile(&me, req.into())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}
