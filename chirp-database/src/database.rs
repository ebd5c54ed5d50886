use sqlx::{PgPool, migrate::Migrator};

use crate::cache::CacheService;

/// Compile-time discovered SQLx migrations for the `chirp-database` crate.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Shared database handle passed across crates.
///
/// Cloning is cheap: the pool and every cache backend are reference counted.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    cache: CacheService,
}

impl Database {
    /// Create a handle with the default in-process cache.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: CacheService::memory("chirp"),
        }
    }

    pub fn with_cache(pool: PgPool, cache: CacheService) -> Self {
        Self { pool, cache }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
