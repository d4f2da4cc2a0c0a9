//! Sessions are created and read only; there is no update or delete route.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use super::{Payload, created};
use crate::{
    AppState,
    entities::session,
    error::{AppError, AppResult},
    models::{CreateSession, ReadSession},
};

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<CreateSession>,
) -> AppResult<Response> {
    let session = state.store.insert_session(session::Model::try_from(payload)?).await?;
    let location = format!("/Sessao/{}/{}", session.movie_id, session.theater_id);
    Ok(created(location, ReadSession::from(session)))
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<ReadSession>>> {
    let sessions = state.store.list_sessions().await?;
    Ok(Json(sessions.into_iter().map(ReadSession::from).collect()))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((movie_id, theater_id)): Path<(i32, i32)>,
) -> AppResult<Json<ReadSession>> {
    let session = state
        .store
        .find_session(movie_id, theater_id)
        .await?
        .ok_or(AppError::NotFound("session"))?;
    Ok(Json(session.into()))
}
