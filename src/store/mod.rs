//! Persistence for user and todo documents.
//!
//! Handlers and the token layer only see the `UserStore` and `TodoStore` traits.
//! Each call is atomic on its own; nothing here spans a transaction across calls.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::{NewUser, Todo, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by a store implementation.
#[derive(Debug)]
pub enum StoreError {
    /// No document matched the lookup.
    NotFound,
    /// A user with the same email already exists.
    EmailTaken,
    /// The backend failed (connection, query, or write conflict).
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::EmailTaken => write!(f, "email already registered"),
            StoreError::Backend(msg) => write!(f, "storage backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user, failing with `EmailTaken` if the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Overwrites the stored document with `user`, token list included.
    async fn save_user(&self, user: &User) -> Result<(), StoreError>;

    /// Removes the user. Deleting an unknown id is `NotFound`.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;

    /// Drops `token` from the user's token list. Removing an absent token is not an error.
    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create_todo(&self, todo: Todo) -> Result<Todo, StoreError>;

    /// Lists the creator's todos in insertion order.
    async fn list_todos(&self, creator: Uuid) -> Result<Vec<Todo>, StoreError>;

    /// Todos owned by another user are reported as `NotFound`.
    async fn find_todo(&self, id: Uuid, creator: Uuid) -> Result<Todo, StoreError>;

    async fn update_todo(&self, todo: &Todo) -> Result<Todo, StoreError>;

    /// Removes the todo and returns the removed document.
    async fn delete_todo(&self, id: Uuid, creator: Uuid) -> Result<Todo, StoreError>;
}
