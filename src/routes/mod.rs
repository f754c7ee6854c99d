pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Malformed JSON and undeserializable payloads answer `400 { "error" }`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// A path segment that does not parse as a UUID cannot name any record.
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::NotFound("Record not found".into()).into())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::health)
        .service(
            web::scope("/users")
                .service(
                    web::scope("/me")
                        .wrap(AuthMiddleware)
                        .service(users::me)
                        .service(users::logout),
                )
                .service(users::create_user)
                .service(users::login),
        )
        .service(
            web::scope("/todos")
                .wrap(AuthMiddleware)
                .service(todos::get_todos)
                .service(todos::create_todo)
                .service(todos::get_todo)
                .service(todos::update_todo)
                .service(todos::delete_todo),
        );
}
