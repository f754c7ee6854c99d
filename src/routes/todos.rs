use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Todo, TodoEnvelope, TodoInput, TodoList, TodoPatch},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Creates a todo owned by the authenticated user.
///
/// ## Request Body:
/// - `text`: required, must not be blank after trimming.
///
/// ## Responses:
/// - `200 OK`: the created todo.
/// - `400 Bad Request`: missing or blank `text`.
/// - `401 Unauthorized`: missing or invalid `x-auth` token.
#[post("")]
pub async fn create_todo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    let input = payload.into_inner().normalized();
    input.validate()?;

    let todo = state
        .todos
        .create_todo(Todo::new(input, auth.user.id))
        .await?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Lists the authenticated user's todos as `{ "todos": [...] }`.
#[get("")]
pub async fn get_todos(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let todos = state.todos.list_todos(auth.user.id).await?;
    Ok(HttpResponse::Ok().json(TodoList { todos }))
}

/// Fetches one todo as `{ "todo": ... }`.
///
/// Todos owned by someone else, and ids that are not UUIDs, answer `404`.
#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = state
        .todos
        .find_todo(todo_id.into_inner(), auth.user.id)
        .await?;
    Ok(HttpResponse::Ok().json(TodoEnvelope { todo }))
}

/// Updates `text` and/or `completed`.
///
/// Completing a todo stamps `completedAt` (milliseconds since the epoch);
/// un-completing it clears the stamp.
#[patch("/{id}")]
pub async fn update_todo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
    payload: web::Json<TodoPatch>,
) -> Result<impl Responder, AppError> {
    let patch = payload.into_inner().normalized();
    patch.validate()?;

    let mut todo = state
        .todos
        .find_todo(todo_id.into_inner(), auth.user.id)
        .await?;
    todo.apply(patch);
    let todo = state.todos.update_todo(&todo).await?;

    Ok(HttpResponse::Ok().json(TodoEnvelope { todo }))
}

/// Deletes a todo and returns the removed document as `{ "todo": ... }`.
#[delete("/{id}")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = state
        .todos
        .delete_todo(todo_id.into_inner(), auth.user.id)
        .await?;
    Ok(HttpResponse::Ok().json(TodoEnvelope { todo }))
}
