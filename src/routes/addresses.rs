use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use super::{Payload, created};
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{AddressPayload, ReadAddress},
};

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<AddressPayload>,
) -> AppResult<Response> {
    let address = state.store.insert_address(payload.into_active_model()?).await?;
    Ok(created(format!("/Endereco/{}", address.id), ReadAddress::from(address)))
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<ReadAddress>>> {
    let addresses = state.store.list_addresses().await?;
    Ok(Json(addresses.into_iter().map(ReadAddress::from).collect()))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReadAddress>> {
    let address = state.store.find_address(id).await?.ok_or(AppError::NotFound("address"))?;
    Ok(Json(address.into()))
}

pub async fn replace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Payload(payload): Payload<AddressPayload>,
) -> AppResult<StatusCode> {
    let address = state.store.find_address(id).await?.ok_or(AppError::NotFound("address"))?;
    state.store.update_address(payload.apply_to(address)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if !state.store.delete_address(id).await? {
        return Err(AppError::NotFound("address"));
    }
    Ok(StatusCode::NO_CONTENT)
}
