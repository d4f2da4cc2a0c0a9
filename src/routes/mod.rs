use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{AppState, error::AppError};

pub mod addresses;
pub mod movies;
pub mod sessions;
pub mod theaters;

/// JSON body whose rejection is reported as an [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Payload<T>(pub T);

/// Query string whose rejection is reported as an [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// 201 with the created record and where to fetch it again.
pub fn created<T: Serialize>(location: String, body: T) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(body)).into_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/Filme", get(movies::list).post(movies::create))
        .route(
            "/Filme/{id}",
            get(movies::get).put(movies::replace).patch(movies::patch).delete(movies::delete),
        )
        .route("/Cinema", get(theaters::list).post(theaters::create))
        .route(
            "/Cinema/{id}",
            get(theaters::get).put(theaters::replace).delete(theaters::delete),
        )
        .route("/Endereco", get(addresses::list).post(addresses::create))
        .route(
            "/Endereco/{id}",
            get(addresses::get).put(addresses::replace).delete(addresses::delete),
        )
        .route("/Sessao", get(sessions::list).post(sessions::create))
        .route("/Sessao/{movie_id}/{theater_id}", get(sessions::get))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
}
