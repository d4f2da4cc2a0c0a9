pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod patch;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::Router;

use crate::{config::Config, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

/// Connects to the database named in `config` and builds the full router.
pub async fn app(config: &Config) -> anyhow::Result<Router> {
    let db = db::connect(config).await?;
    let state = Arc::new(AppState { store: Store::new(db) });
    Ok(routes::router(state))
}
