pub mod csv_io;
pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use queries::categories::Category;
pub use queries::questions::Question;

use sqlx::Error;

/// Opens a pool on `url`. An in-memory database lives only as long as a
/// connection to it, so such URLs get a single connection that is never
/// recycled, whatever `max_connections` says.
pub async fn establish_connection(url: &str, max_connections: u32) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let mut pool = SqlitePoolOptions::new().max_connections(max_connections);
    if is_in_memory(url) {
        tracing::warn!("In-memory database: using a single connection, data is lost on exit");
        pool = pool
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    pool.connect_with(options).await
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::categories::get_all_categories;

    #[test]
    fn recognises_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://:memory:"));
        assert!(is_in_memory("sqlite://?mode=memory&cache=private"));
        assert!(!is_in_memory("sqlite://trivia.db"));
    }

    #[tokio::test]
    async fn in_memory_pool_keeps_migrated_schema() {
        for url in ["sqlite::memory:", "sqlite://:memory:"] {
            let pool = establish_connection(url, 5).await.unwrap();
            assert_eq!(pool.options().get_max_connections(), 1);
            run_migrations(&pool).await.unwrap();

            let (first, second, third) = tokio::join!(
                get_all_categories(&pool),
                get_all_categories(&pool),
                get_all_categories(&pool),
            );
            for categories in [first, second, third] {
                assert_eq!(categories.unwrap().len(), 6);
            }
        }
    }
}
