//! User endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use relations_core::{User, Username};
use serde::{Deserialize, Serialize};

use crate::db::UserRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Create user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// User response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
        }
    }
}

/// POST /users/ - create a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let username = Username::new(&req.username)?;
    let user = UserRepo::new(&state.pool).create(&username).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/{username} - the name is normalised as on create
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let username = Username::new(&username)?;
    let user = UserRepo::new(&state.pool)
        .get_by_username(username.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "user",
            id: username.as_str().to_owned(),
        })?;
    Ok(Json(UserResponse::from(user)))
}

/// User routes. `/users` and `/users/` both accept the create call.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/", post(create_user))
        .route("/users", post(create_user))
        .route("/users/{username}", get(get_user))
}
