pub mod todo;
pub mod user;

pub use todo::{Todo, TodoEnvelope, TodoInput, TodoList, TodoPatch};
pub use user::{AccessTag, AuthToken, NewUser, User, UserResponse};
