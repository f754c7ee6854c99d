use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::store::{MemoryStore, PgStore, TodoStore, UserStore};

/// Shared application state, registered once with `web::Data`.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub keys: TokenKeys,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
        keys: TokenKeys,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            todos,
            keys,
            bcrypt_cost,
        }
    }

    pub fn in_memory(keys: TokenKeys, bcrypt_cost: u32) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, keys, bcrypt_cost)
    }

    pub fn postgres(pool: PgPool, keys: TokenKeys, bcrypt_cost: u32) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store, keys, bcrypt_cost)
    }

    /// Picks the storage backend from `config`; a pool is passed only when
    /// `DATABASE_URL` was set.
    pub fn from_config(config: &Config, pool: Option<PgPool>) -> Self {
        let keys = TokenKeys::from_secret(&config.jwt_secret);
        match pool {
            Some(pool) => Self::postgres(pool, keys, config.bcrypt_cost),
            None => Self::in_memory(keys, config.bcrypt_cost),
        }
    }
}
