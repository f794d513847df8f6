use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::domain_port::IdentityError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.clone(), err.to_string()));
        Ok(warp::reply::with_status(json, err.status()))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::NotFound,
            "No such route",
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InvalidRequest,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Not found")]
    NotFound,
    #[error("Permission denied. Verify the deployed access rules.")]
    PermissionDenied,
    #[error("Already friends")]
    AlreadyFriends,
    #[error("This user already sent you a request")]
    RequestAlreadyReceived,
    #[error("No pending request")]
    NoPendingRequest,
    #[error("Not friends")]
    NotFriends,
    #[error("Nickname is already taken")]
    NicknameTaken,
    #[error("Profile already exists")]
    ProfileExists,
    #[error("Operation only partly applied, try again")]
    PartialWriteFailure,
    #[error("Service unavailable, try again")]
    StoreUnavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::PermissionDenied | ApiErrorCode::NotFriends => StatusCode::FORBIDDEN,
            ApiErrorCode::AlreadyFriends
            | ApiErrorCode::RequestAlreadyReceived
            | ApiErrorCode::NoPendingRequest
            | ApiErrorCode::NicknameTaken
            | ApiErrorCode::ProfileExists => StatusCode::CONFLICT,
            ApiErrorCode::PartialWriteFailure | ApiErrorCode::StoreUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<IdentityError> for ApiErrorCode {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::Unauthenticated | IdentityError::TokenInvalid => {
                ApiErrorCode::InvalidToken
            }
            IdentityError::Unavailable(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<&FriendshipError> for ApiErrorCode {
    fn from(error: &FriendshipError) -> Self {
        match error {
            FriendshipError::Validation(_) => ApiErrorCode::InvalidRequest,
            FriendshipError::StoreUnavailable(_) => ApiErrorCode::StoreUnavailable,
            FriendshipError::PermissionDenied(_) => ApiErrorCode::PermissionDenied,
            FriendshipError::CorruptRecord(e) => ApiErrorCode::internal(e),
            FriendshipError::PartialWriteFailure { .. } => ApiErrorCode::PartialWriteFailure,
            FriendshipError::AlreadyFriends => ApiErrorCode::AlreadyFriends,
            FriendshipError::RequestAlreadyReceived => ApiErrorCode::RequestAlreadyReceived,
            FriendshipError::NoPendingRequest => ApiErrorCode::NoPendingRequest,
        }
    }
}

impl From<FriendshipError> for ApiErrorCode {
    fn from(error: FriendshipError) -> Self {
        ApiErrorCode::from(&error)
    }
}

impl From<DirectoryError> for ApiErrorCode {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::PermissionDenied(_) => ApiErrorCode::PermissionDenied,
            DirectoryError::StoreUnavailable(_) => ApiErrorCode::StoreUnavailable,
        }
    }
}

impl From<LibraryError> for ApiErrorCode {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Validation(_) => ApiErrorCode::InvalidRequest,
            LibraryError::NotFriends(_) => ApiErrorCode::NotFriends,
            LibraryError::PermissionDenied(_) => ApiErrorCode::PermissionDenied,
            LibraryError::StoreUnavailable(_) => ApiErrorCode::StoreUnavailable,
        }
    }
}

impl From<ProfileError> for ApiErrorCode {
    fn from(error: ProfileError) -> Self {
        match error {
            ProfileError::Validation(_) => ApiErrorCode::InvalidRequest,
            ProfileError::NicknameTaken => ApiErrorCode::NicknameTaken,
            ProfileError::ProfileExists => ApiErrorCode::ProfileExists,
            ProfileError::NotFound => ApiErrorCode::NotFound,
            ProfileError::PermissionDenied(_) => ApiErrorCode::PermissionDenied,
            ProfileError::StoreUnavailable(_) => ApiErrorCode::StoreUnavailable,
        }
    }
}
