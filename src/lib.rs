#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Domain models, token authentication, storage backends, routing configuration and"]
#![doc = "error handling for the todo API. The binary (`main.rs`) wires them into an"]
#![doc = "actix-web server; the integration tests build the same `App` in-process."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
