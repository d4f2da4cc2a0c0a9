use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::{config::Config, error::AppResult};

const SCHEMA: &str = include_str!("../sql/schema.sql");

/// Lifetime given to the only connection of an in-memory database. The pool
/// must never recycle it: closing it drops the data.
const IN_MEMORY_KEEPALIVE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 10);

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    // every connection to an in-memory database sees a different database
    if config.is_in_memory() {
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(IN_MEMORY_KEEPALIVE)
            .max_lifetime(IN_MEMORY_KEEPALIVE);
    } else {
        opt.max_connections(config.db_max_connections.max(1));
    }

    let db = Database::connect(opt).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await?;

    run_sql(&db, SCHEMA).await?;

    info!(url = %config.database_url, "database connected and schema applied");
    Ok(db)
}

async fn run_sql(db: &DatabaseConnection, sql: &str) -> AppResult<()> {
    for stmt in sql.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        db.execute(Statement::from_string(db.get_database_backend(), stmt.to_string())).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{EntityTrait, PaginatorTrait};

    use super::*;
    use crate::entities::movie;

    #[tokio::test]
    async fn in_memory_pool_keeps_its_database() {
        let db = connect(&Config::in_memory()).await.unwrap();

        let options = db.get_sqlite_connection_pool().options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_idle_timeout(), Some(IN_MEMORY_KEEPALIVE));
        assert_eq!(options.get_max_lifetime(), Some(IN_MEMORY_KEEPALIVE));

        db.execute(Statement::from_string(
            db.get_database_backend(),
            "INSERT INTO movies (title, genre, duration) VALUES ('Cinderela', 'Drama', 90)"
                .to_string(),
        ))
        .await
        .unwrap();
        for _ in 0..3 {
            assert_eq!(movie::Entity::find().count(&db).await.unwrap(), 1);
        }
    }
}
