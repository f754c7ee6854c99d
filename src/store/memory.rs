use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TodoStore, UserStore};
use crate::models::{NewUser, Todo, User};

/// Process-local store used when no database is configured, and by the tests.
///
/// Every trait call takes one lock for its whole duration, which gives the same
/// per-document atomicity the database provides and nothing more.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == input.email) {
            return Err(StoreError::EmailTaken);
        }
        let user = User::new(input);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::EmailTaken);
        }
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.tokens.retain(|t| t.token != token);
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create_todo(&self, todo: Todo) -> Result<Todo, StoreError> {
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self, creator: Uuid) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .todos
            .read()
            .await
            .iter()
            .filter(|t| t.creator == creator)
            .cloned()
            .collect())
    }

    async fn find_todo(&self, id: Uuid, creator: Uuid) -> Result<Todo, StoreError> {
        self.todos
            .read()
            .await
            .iter()
            .find(|t| t.id == id && t.creator == creator)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_todo(&self, todo: &Todo) -> Result<Todo, StoreError> {
        let mut todos = self.todos.write().await;
        let stored = todos
            .iter_mut()
            .find(|t| t.id == todo.id && t.creator == todo.creator)
            .ok_or(StoreError::NotFound)?;
        *stored = todo.clone();
        Ok(todo.clone())
    }

    async fn delete_todo(&self, id: Uuid, creator: Uuid) -> Result<Todo, StoreError> {
        let mut todos = self.todos.write().await;
        let index = todos
            .iter()
            .position(|t| t.id == id && t.creator == creator)
            .ok_or(StoreError::NotFound)?;
        Ok(todos.remove(index))
    }
}
