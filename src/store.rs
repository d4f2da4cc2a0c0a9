use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::{debug, info};

use crate::{
    entities::{address, movie, session, theater},
    error::AppResult,
};

const MAX_BIND: u64 = i64::MAX as u64;

/// Every read and write against the relational store goes through here.
/// Nothing is cached; each call hits the database.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// `skip` and `take` are capped at `i64::MAX`, the largest value SQLite
    /// binds.
    pub async fn list_movies(&self, skip: u64, take: u64) -> AppResult<Vec<movie::Model>> {
        let (skip, take) = (skip.min(MAX_BIND), take.min(MAX_BIND));
        debug!(skip, take, "listing movies");
        let movies = movie::Entity::find()
            .order_by_asc(movie::Column::Id)
            .offset(skip)
            .limit(take)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    pub async fn find_movie(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn insert_movie(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        let movie = model.insert(&self.db).await?;
        info!(id = movie.id, title = %movie.title, "movie created");
        Ok(movie)
    }

    pub async fn update_movie(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        let movie = model.update(&self.db).await?;
        info!(id = movie.id, "movie updated");
        Ok(movie)
    }

    /// Returns false when no movie had that id.
    pub async fn delete_movie(&self, id: i32) -> AppResult<bool> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected > 0 {
            info!(id, "movie deleted");
        }
        Ok(res.rows_affected > 0)
    }

    pub async fn list_theaters(&self, address_id: Option<i32>) -> AppResult<Vec<theater::Model>> {
        debug!(?address_id, "listing theaters");
        let mut query = theater::Entity::find().order_by_asc(theater::Column::Id);
        if let Some(address_id) = address_id {
            query = query.filter(theater::Column::AddressId.eq(address_id));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn find_theater(&self, id: i32) -> AppResult<Option<theater::Model>> {
        Ok(theater::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn insert_theater(&self, model: theater::ActiveModel) -> AppResult<theater::Model> {
        let theater = model.insert(&self.db).await?;
        info!(id = theater.id, address_id = theater.address_id, "theater created");
        Ok(theater)
    }

    pub async fn update_theater(&self, model: theater::ActiveModel) -> AppResult<theater::Model> {
        let theater = model.update(&self.db).await?;
        info!(id = theater.id, "theater updated");
        Ok(theater)
    }

    pub async fn delete_theater(&self, id: i32) -> AppResult<bool> {
        let res = theater::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected > 0 {
            info!(id, "theater deleted");
        }
        Ok(res.rows_affected > 0)
    }

    pub async fn list_addresses(&self) -> AppResult<Vec<address::Model>> {
        debug!("listing addresses");
        Ok(address::Entity::find().order_by_asc(address::Column::Id).all(&self.db).await?)
    }

    pub async fn find_address(&self, id: i32) -> AppResult<Option<address::Model>> {
        Ok(address::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn insert_address(&self, model: address::ActiveModel) -> AppResult<address::Model> {
        let address = model.insert(&self.db).await?;
        info!(id = address.id, "address created");
        Ok(address)
    }

    pub async fn update_address(&self, model: address::ActiveModel) -> AppResult<address::Model> {
        let address = model.update(&self.db).await?;
        info!(id = address.id, "address updated");
        Ok(address)
    }

    pub async fn delete_address(&self, id: i32) -> AppResult<bool> {
        let res = address::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected > 0 {
            info!(id, "address deleted");
        }
        Ok(res.rows_affected > 0)
    }

    pub async fn list_sessions(&self) -> AppResult<Vec<session::Model>> {
        debug!("listing sessions");
        let sessions = session::Entity::find()
            .order_by_asc(session::Column::MovieId)
            .order_by_asc(session::Column::TheaterId)
            .all(&self.db)
            .await?;
        Ok(sessions)
    }

    pub async fn find_session(
        &self,
        movie_id: i32,
        theater_id: i32,
    ) -> AppResult<Option<session::Model>> {
        Ok(session::Entity::find_by_id((movie_id, theater_id)).one(&self.db).await?)
    }

    /// Fails with a conflict when the pair already exists or either side is
    /// missing.
    pub async fn insert_session(&self, model: session::Model) -> AppResult<session::Model> {
        let active = session::ActiveModel {
            movie_id: Set(model.movie_id),
            theater_id: Set(model.theater_id),
        };
        session::Entity::insert(active).exec_without_returning(&self.db).await?;
        info!(movie_id = model.movie_id, theater_id = model.theater_id, "session created");
        Ok(model)
    }

    pub async fn sessions_for_movies(&self, movie_ids: &[i32]) -> AppResult<Vec<session::Model>> {
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sessions = session::Entity::find()
            .filter(session::Column::MovieId.is_in(movie_ids.iter().copied()))
            .order_by_asc(session::Column::TheaterId)
            .all(&self.db)
            .await?;
        Ok(sessions)
    }

    pub async fn sessions_for_theaters(
        &self,
        theater_ids: &[i32],
    ) -> AppResult<Vec<session::Model>> {
        if theater_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sessions = session::Entity::find()
            .filter(session::Column::TheaterId.is_in(theater_ids.iter().copied()))
            .order_by_asc(session::Column::MovieId)
            .all(&self.db)
            .await?;
        Ok(sessions)
    }
}
