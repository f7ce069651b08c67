use axum::{
    extract::Request,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use thumbtier_db as db;
use tower_cookies::Cookies;
use tracing::{event, Level};

use crate::{shared_state::State, Error};

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    Extension(ref state): Extension<State>,
    cookies: Cookies,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, Error> {
    let LoginRequest { username, password } = body;

    let user = match state.store.get_user_by_username(&username).await {
        Ok(user) => Some(user),
        Err(db::Error::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    let hash = user.as_ref().map(|u| u.user.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match hash {
        Some(hash) => thumbtier_auth::password::verify_password(&password, &hash),
        None => Err(thumbtier_auth::password::verify_nothing(&password)),
    })
    .await?;

    let user = match (user, verified) {
        (Some(user), Ok(())) => user.user,
        (_, Err(thumbtier_auth::Error::InvalidPassword)) => {
            event!(Level::INFO, %username, "Rejected login");
            return Err(Error::LoginFailed("User not found"));
        }
        (_, Err(e)) => return Err(e.into()),
        (None, Ok(())) => return Err(Error::LoginFailed("User not found")),
    };

    if !user.is_active {
        return Err(Error::LoginFailed("User not active"));
    }

    let token = state.sessions.login(&cookies, user.user_id).await?;
    event!(Level::INFO, user_id = %user.user_id, "User logged in");

    Ok(Json(json!({
        "success": "User logged in",
        "token": token,
    })))
}

async fn logout(
    Extension(ref state): Extension<State>,
    cookies: Cookies,
    req: Request,
) -> Result<Response, Error> {
    let session_id = match state.sessions.session_id(&req) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match session_id {
        Some(id) => state.sessions.logout(&cookies, &id).await?,
        None => state.sessions.cookies.clear(&cookies),
    }

    Ok(Json(json!({ "success": "User logged out" })).into_response())
}

pub fn configure() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}
