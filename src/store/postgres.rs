use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{StoreError, TodoStore, UserStore};
use crate::models::{AuthToken, NewUser, Todo, User};

/// Postgres-backed store. The user's token list lives in a `tokens JSONB` column,
/// so a user row is read and written as a single document.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    tokens: Json<Vec<AuthToken>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            tokens: row.tokens.0,
        }
    }
}

/// `RowNotFound` becomes `NotFound`; everything else is a backend fault.
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

fn map_user_write_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &error {
        if db_err.is_unique_violation() {
            return StoreError::EmailTaken;
        }
    }
    error.into()
}

const TODO_COLUMNS: &str = "id, text, completed, completed_at, creator";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: NewUser) -> Result<User, StoreError> {
        let user = User::new(input);
        sqlx::query("INSERT INTO users (id, email, password_hash, tokens) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(Json(user.tokens.clone()))
            .execute(&self.pool)
            .await
            .map_err(map_user_write_error)?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, tokens FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::from).ok_or(StoreError::NotFound)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, tokens FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::from).ok_or(StoreError::NotFound)
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, password_hash = $3, tokens = $4 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Json(user.tokens.clone()))
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), StoreError> {
        // Rebuilds the array without the token, keeping issue order.
        let result = sqlx::query(
            "UPDATE users SET tokens = COALESCE(
                 (SELECT jsonb_agg(e.t ORDER BY e.i)
                  FROM jsonb_array_elements(tokens) WITH ORDINALITY AS e(t, i)
                  WHERE e.t->>'token' <> $2),
                 '[]'::jsonb)
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn create_todo(&self, todo: Todo) -> Result<Todo, StoreError> {
        let sql = format!(
            "INSERT INTO todos (id, text, completed, completed_at, creator)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TODO_COLUMNS
        );
        let created = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.id)
            .bind(&todo.text)
            .bind(todo.completed)
            .bind(todo.completed_at)
            .bind(todo.creator)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_todos(&self, creator: Uuid) -> Result<Vec<Todo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE creator = $1 ORDER BY created_at, id",
            TODO_COLUMNS
        );
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(creator)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn find_todo(&self, id: Uuid, creator: Uuid) -> Result<Todo, StoreError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND creator = $2",
            TODO_COLUMNS
        );
        sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(creator)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update_todo(&self, todo: &Todo) -> Result<Todo, StoreError> {
        let sql = format!(
            "UPDATE todos SET text = $1, completed = $2, completed_at = $3
             WHERE id = $4 AND creator = $5
             RETURNING {}",
            TODO_COLUMNS
        );
        sqlx::query_as::<_, Todo>(&sql)
            .bind(&todo.text)
            .bind(todo.completed)
            .bind(todo.completed_at)
            .bind(todo.id)
            .bind(todo.creator)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_todo(&self, id: Uuid, creator: Uuid) -> Result<Todo, StoreError> {
        let sql = format!(
            "DELETE FROM todos WHERE id = $1 AND creator = $2 RETURNING {}",
            TODO_COLUMNS
        );
        sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(creator)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
