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
    models::{CreateTheater, ReadTheater, UpdateTheater, group_sessions},
};

#[derive(Debug, Deserialize)]
pub struct Filter {
    #[serde(rename = "enderecoId")]
    address_id: Option<i32>,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<CreateTheater>,
) -> AppResult<Response> {
    let theater = state.store.insert_theater(payload.into_active_model()?).await?;
    Ok(created(format!("/Cinema/{}", theater.id), ReadTheater::new(theater, Vec::new())))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    QueryParams(filter): QueryParams<Filter>,
) -> AppResult<Json<Vec<ReadTheater>>> {
    let theaters = state.store.list_theaters(filter.address_id).await?;

    let ids: Vec<i32> = theaters.iter().map(|t| t.id).collect();
    let mut sessions =
        group_sessions(state.store.sessions_for_theaters(&ids).await?, |s| s.theater_id);

    let theaters = theaters
        .into_iter()
        .map(|t| {
            let sessions = sessions.remove(&t.id).unwrap_or_default();
            ReadTheater::new(t, sessions)
        })
        .collect();
    Ok(Json(theaters))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReadTheater>> {
    let theater = state.store.find_theater(id).await?.ok_or(AppError::NotFound("theater"))?;
    let sessions = state.store.sessions_for_theaters(&[id]).await?;
    Ok(Json(ReadTheater::new(theater, sessions)))
}

pub async fn replace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Payload(payload): Payload<UpdateTheater>,
) -> AppResult<StatusCode> {
    let theater = state.store.find_theater(id).await?.ok_or(AppError::NotFound("theater"))?;
    state.store.update_theater(payload.apply_to(theater)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if !state.store.delete_theater(id).await? {
        return Err(AppError::NotFound("theater"));
    }
    Ok(StatusCode::NO_CONTENT)
}
