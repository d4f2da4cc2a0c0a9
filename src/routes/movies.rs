use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use super::{Payload, QueryParams, created};
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{MovieFields, MoviePayload, ReadMovie, group_sessions},
    patch::{self, PatchOperation},
};

#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    skip: u64,
    #[serde(default = "default_take")]
    take: u64,
}

fn default_take() -> u64 {
    50
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<MoviePayload>,
) -> AppResult<Response> {
    let fields = MovieFields::try_from(payload)?;
    let movie = state.store.insert_movie(fields.into_active_model()).await?;
    Ok(created(format!("/Filme/{}", movie.id), ReadMovie::new(movie, Vec::new())))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    QueryParams(page): QueryParams<Page>,
) -> AppResult<Json<Vec<ReadMovie>>> {
    let movies = state.store.list_movies(page.skip, page.take).await?;

    let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
    let mut sessions =
        group_sessions(state.store.sessions_for_movies(&ids).await?, |s| s.movie_id);

    let movies = movies
        .into_iter()
        .map(|m| {
            let sessions = sessions.remove(&m.id).unwrap_or_default();
            ReadMovie::new(m, sessions)
        })
        .collect();
    Ok(Json(movies))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReadMovie>> {
    let movie = state.store.find_movie(id).await?.ok_or(AppError::NotFound("movie"))?;
    let sessions = state.store.sessions_for_movies(&[id]).await?;
    Ok(Json(ReadMovie::new(movie, sessions)))
}

pub async fn replace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Payload(payload): Payload<MoviePayload>,
) -> AppResult<StatusCode> {
    let fields = MovieFields::try_from(payload)?;
    let movie = state.store.find_movie(id).await?.ok_or(AppError::NotFound("movie"))?;
    state.store.update_movie(fields.apply_to(movie)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Applies a JSON Patch document to the movie's updatable fields. The result
/// must pass the same rules as a create before anything is written.
pub async fn patch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Payload(ops): Payload<Vec<PatchOperation>>,
) -> AppResult<StatusCode> {
    let movie = state.store.find_movie(id).await?.ok_or(AppError::NotFound("movie"))?;

    let working = patch::apply(&MoviePayload::from(&movie), &ops)?;
    let fields = MovieFields::try_from(working)
        .map_err(|e| AppError::invalid(StatusCode::UNPROCESSABLE_ENTITY, &e))?;

    state.store.update_movie(fields.apply_to(movie)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if !state.store.delete_movie(id).await? {
        return Err(AppError::NotFound("movie"));
    }
    Ok(StatusCode::NO_CONTENT)
}
